//! SMIL timing attribute values: clock values, begin/end timings and durations.

use std::fmt;

/// Event kinds a timing or a multiplexer registration can refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTrigger {
    Unknown,
    OnSlideBegin,
    OnSlideEnd,
    BeginEvent,
    EndEvent,
    OnClick,
    OnDblClick,
    OnMouseEnter,
    OnMouseLeave,
    OnNext,
    OnPrev,
    Repeat,
}

impl EventTrigger {
    /// Map the event part of a timing value (`begin`, `end`, `click`, `next`, `prev`).
    pub fn from_timing_name(name: &str) -> Self {
        match name {
            "begin" => Self::BeginEvent,
            "end" => Self::EndEvent,
            "next" => Self::OnNext,
            "prev" => Self::OnPrev,
            "click" => Self::OnClick,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingType {
    Unknown,
    Offset,
    WallClock,
    Indefinite,
    Event,
    Syncbase,
    Media,
}

/// A parsed `begin`/`end` attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Timing {
    pub timing_type: TimingType,
    pub offset: f64,
    pub event_base_element: Option<String>,
    pub event_type: EventTrigger,
}

impl Timing {
    pub fn offset(seconds: f64) -> Self {
        Self {
            timing_type: TimingType::Offset,
            offset: seconds,
            event_base_element: None,
            event_type: EventTrigger::Unknown,
        }
    }

    pub fn parse(description: &str) -> Self {
        let mut timing = Self {
            timing_type: TimingType::Unknown,
            offset: 0.0,
            event_base_element: None,
            event_type: EventTrigger::Unknown,
        };

        let desc = description.trim();
        if desc.is_empty() {
            timing.timing_type = TimingType::Offset;
            return timing;
        }
        if desc == "indefinite" {
            timing.timing_type = TimingType::Indefinite;
            return timing;
        }

        let first = desc.as_bytes()[0];
        if first == b'+' || first == b'-' || first.is_ascii_digit() {
            let clock = if first == b'+' || first == b'-' {
                &desc[1..]
            } else {
                desc
            };
            if let Some(seconds) = parse_clock_value(clock) {
                timing.timing_type = TimingType::Offset;
                timing.offset = if first == b'-' { -seconds } else { seconds };
            }
            return timing;
        }

        let (event_part, offset_part, positive) = if let Some((a, b)) = desc.split_once('+') {
            (a, Some(b), true)
        } else if let Some((a, b)) = desc.split_once('-') {
            (a, Some(b), false)
        } else {
            (desc, None, true)
        };

        match event_part.split_once('.') {
            Some((element, event)) => {
                timing.event_base_element = Some(element.to_owned());
                timing.event_type = EventTrigger::from_timing_name(event);
            }
            None => timing.event_type = EventTrigger::from_timing_name(event_part),
        }

        if timing.event_type == EventTrigger::Unknown {
            return timing;
        }

        timing.timing_type = match timing.event_type {
            EventTrigger::BeginEvent | EventTrigger::EndEvent => TimingType::Syncbase,
            _ => TimingType::Event,
        };

        if let Some(clock) = offset_part.filter(|s| !s.is_empty()) {
            match parse_clock_value(clock) {
                Some(seconds) => timing.offset = if positive { seconds } else { -seconds },
                None => timing.timing_type = TimingType::Unknown,
            }
        }

        timing
    }

    pub fn is_offset(&self) -> bool {
        self.timing_type == TimingType::Offset
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timing_type {
            TimingType::Offset => write!(f, "{}s", self.offset),
            TimingType::Indefinite => f.write_str("indefinite"),
            TimingType::Event | TimingType::Syncbase => {
                if let Some(id) = &self.event_base_element {
                    write!(f, "{id}.")?;
                }
                write!(f, "{:?}{:+}", self.event_type, self.offset)
            }
            other => write!(f, "{other:?}"),
        }
    }
}

/// A parsed `dur` attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Duration {
    Unset,
    Indefinite,
    Media,
    Value(f64),
    /// Present but not a valid clock value.
    Invalid,
}

impl Duration {
    pub fn parse(attr: Option<&str>) -> Self {
        let Some(attr) = attr.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Unset;
        };
        match attr {
            "indefinite" => Self::Indefinite,
            "media" => Self::Media,
            other => match parse_clock_value(other) {
                Some(v) if v <= 0.0 => Self::Value(0.001),
                Some(v) => Self::Value(v),
                None => Self::Invalid,
            },
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, Self::Indefinite)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parse a SMIL clock value into seconds, rounded to milliseconds.
///
/// Accepts `h:mm:ss(.f)`, `mm:ss(.f)` and `N(.f)(h|min|s|ms)`; the empty string is zero.
pub fn parse_clock_value(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }

    let seconds = if value.contains(':') {
        parse_clock_parts(value)?
    } else {
        parse_timecount(value)?
    };
    Some((seconds * 1000.0).round() / 1000.0)
}

fn parse_clock_parts(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => {
            if h.is_empty() || !h.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (h.parse::<f64>().ok()?, *m, *s)
        }
        [m, s] => (0.0, *m, *s),
        _ => return None,
    };
    let minutes = two_digit_sexagesimal(minutes)?;
    let (whole, frac) = match seconds.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (seconds, None),
    };
    let mut secs = two_digit_sexagesimal(whole)?;
    if let Some(frac) = frac {
        secs += parse_fraction(frac)?;
    }
    Some((hours * 60.0 + minutes) * 60.0 + secs)
}

fn two_digit_sexagesimal(s: &str) -> Option<f64> {
    let b = s.as_bytes();
    if b.len() != 2 || !(b'0'..=b'5').contains(&b[0]) || !b[1].is_ascii_digit() {
        return None;
    }
    s.parse().ok()
}

fn parse_fraction(digits: &str) -> Option<f64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    format!("0.{digits}").parse().ok()
}

fn parse_timecount(value: &str) -> Option<f64> {
    let (number, scale) = if let Some(n) = value.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = value.strip_suffix("min") {
        (n, 60.0)
    } else if let Some(n) = value.strip_suffix('h') {
        (n, 3600.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1.0)
    } else {
        (value, 1.0)
    };

    let (whole, frac) = match number.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (number, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut count: f64 = whole.parse().ok()?;
    if let Some(frac) = frac {
        count += parse_fraction(frac)?;
    }
    Some(count * scale)
}

#[cfg(test)]
#[path = "../../tests/unit/timing/smil.rs"]
mod tests;
