use std::fmt;

use crate::expression::{ExprEnv, evaluate};

/// RGB color with components in `[0, 1]`. Intermediate results of `add`/`scale` may leave the
/// range; consumers clamp when converting to bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSL color: hue in degrees `[0, 360)`, saturation and luminance in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// A color value as carried through an animation, in the space it is interpolated in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimColor {
    Rgb(RgbColor),
    Hsl(HslColor),
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn interpolate(from: Self, to: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            s * from.r + t * to.r,
            s * from.g + t * to.g,
            s * from.b + t * to.b,
        )
    }

    pub fn to_hsl(self) -> HslColor {
        let (r, g, b) = (self.r, self.g, self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;

        if delta.abs() < f64::EPSILON {
            return HslColor::new(0.0, 0.0, l);
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };

        let h = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        HslColor::new(h * 60.0, s, l)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_bytes();
        write!(f, "rgb({r},{g},{b})")
    }
}

impl HslColor {
    /// Builds a color with the hue wrapped into `[0, 360)`.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: normalize_hue(h),
            s,
            l,
        }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.h + other.h, self.s + other.s, self.l + other.l)
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.h * k, self.s * k, self.l * k)
    }

    /// Interpolate in HSL space. A clockwise sweep crosses 360 degrees when `from.h <= to.h`; a
    /// counter-clockwise sweep crosses it when `from.h > to.h`.
    pub fn interpolate(from: Self, to: Self, t: f64, counter_clockwise: bool) -> Self {
        let s = 1.0 - t;
        let h = if from.h <= to.h && !counter_clockwise {
            s * (from.h + 360.0) + t * to.h
        } else if from.h > to.h && counter_clockwise {
            s * from.h + t * (to.h + 360.0)
        } else {
            s * from.h + t * to.h
        };
        Self::new(h, s * from.s + t * to.s, s * from.l + t * to.l)
    }

    pub fn to_rgb(self) -> RgbColor {
        if self.s.abs() < f64::EPSILON {
            return RgbColor::new(self.l, self.l, self.l);
        }

        fn hue_to_rgb(p: f64, q: f64, h: f64) -> f64 {
            let h = normalize_hue(h);
            if h < 60.0 {
                return p + (q - p) * h / 60.0;
            }
            if h < 180.0 {
                return q;
            }
            if h < 240.0 {
                return p + (q - p) * (240.0 - h) / 60.0;
            }
            p
        }

        let q = if self.l <= 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;

        RgbColor::new(
            hue_to_rgb(p, q, self.h + 120.0),
            hue_to_rgb(p, q, self.h),
            hue_to_rgb(p, q, self.h - 120.0),
        )
    }
}

fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

impl AnimColor {
    pub fn to_rgb(self) -> RgbColor {
        match self {
            Self::Rgb(c) => c,
            Self::Hsl(c) => c.to_rgb(),
        }
    }

    pub fn to_hsl(self) -> HslColor {
        match self {
            Self::Rgb(c) => c.to_hsl(),
            Self::Hsl(c) => c,
        }
    }

    /// Component-wise sum in the space of `self`.
    pub fn add(self, other: Self) -> Self {
        match self {
            Self::Rgb(c) => Self::Rgb(c.add(other.to_rgb())),
            Self::Hsl(c) => Self::Hsl(c.add(other.to_hsl())),
        }
    }

    pub fn scale(self, k: f64) -> Self {
        match self {
            Self::Rgb(c) => Self::Rgb(c.scale(k)),
            Self::Hsl(c) => Self::Hsl(c.scale(k)),
        }
    }
}

impl From<RgbColor> for AnimColor {
    fn from(c: RgbColor) -> Self {
        Self::Rgb(c)
    }
}

/// Parse a CSS-style color: `#rgb`, `#rrggbb`, `rgb(r,g,b)`, `rgb(r%,g%,b%)`, `hsl(h,s%,l%)` or a
/// basic color name. Channel values may be expressions.
pub fn parse_color(s: &str) -> Option<RgbColor> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgb") {
        let [r, g, b] = three(&args)?;
        return Some(match (percent(r), percent(g), percent(b)) {
            (Some(r), Some(g), Some(b)) => RgbColor::new(r / 100.0, g / 100.0, b / 100.0),
            _ => RgbColor::new(number(r)? / 255.0, number(g)? / 255.0, number(b)? / 255.0),
        });
    }
    if let Some(args) = function_args(&lower, "hsl") {
        let [h, s, l] = three(&args)?;
        let hsl = HslColor::new(number(h)?, percent(s)? / 100.0, percent(l)? / 100.0);
        return Some(hsl.to_rgb());
    }

    named_color(&lower)
}

fn parse_hex(hex: &str) -> Option<RgbColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize, n: usize| u8::from_str_radix(&hex[i..i + n], 16).ok();
    match hex.len() {
        3 => {
            let (r, g, b) = (byte(0, 1)?, byte(1, 1)?, byte(2, 1)?);
            Some(RgbColor::from_bytes(r * 17, g * 17, b * 17))
        }
        6 => Some(RgbColor::from_bytes(byte(0, 2)?, byte(2, 2)?, byte(4, 2)?)),
        _ => None,
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(str::trim).collect())
}

fn three<'a>(args: &[&'a str]) -> Option<[&'a str; 3]> {
    match args {
        [a, b, c] => Some([a, b, c]),
        _ => None,
    }
}

fn number(s: &str) -> Option<f64> {
    evaluate(s, &ExprEnv::default()).ok()
}

fn percent(s: &str) -> Option<f64> {
    number(s.strip_suffix('%')?)
}

fn named_color(name: &str) -> Option<RgbColor> {
    let [r, g, b] = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" | "aqua" => [0, 255, 255],
        "magenta" | "fuchsia" => [255, 0, 255],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "navy" => [0, 0, 128],
        "purple" => [128, 0, 128],
        "teal" => [0, 128, 128],
        "orange" => [255, 165, 0],
        _ => return None,
    };
    Some(RgbColor::from_bytes(r, g, b))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/color.rs"]
mod tests;
