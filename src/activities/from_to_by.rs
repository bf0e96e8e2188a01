use crate::activities::{AnimationHooks, Formula, apply_formula};
use crate::animation::animations::Animation;
use crate::animation::element::ElementRef;
use crate::animation::value::{AnimValue, Interpolator};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromToByValues {
    pub from: Option<AnimValue>,
    pub to: Option<AnimValue>,
    pub by: Option<AnimValue>,
}

/// `from`/`to`/`by` animation.
///
/// `to` takes precedence over `by`. A plain `to` animation interpolates from the running
/// underlying value, so a lower priority animation on the same attribute is blended in.
#[derive(Debug)]
pub struct FromToByHooks {
    values: FromToByValues,
    animation: Box<dyn Animation>,
    interpolator: Option<Interpolator>,
    formula: Option<Formula>,
    cumulative: bool,
    start: Option<AnimValue>,
    end: Option<AnimValue>,
    previous: Option<AnimValue>,
    start_interpolation: Option<AnimValue>,
    dynamic_start: bool,
    iteration: u32,
}

impl FromToByHooks {
    pub fn new(
        values: FromToByValues,
        animation: Box<dyn Animation>,
        interpolator: Option<Interpolator>,
        formula: Option<Formula>,
        cumulative: bool,
    ) -> Self {
        Self {
            values,
            animation,
            interpolator,
            formula,
            cumulative,
            start: None,
            end: None,
            previous: None,
            start_interpolation: None,
            dynamic_start: false,
            iteration: 0,
        }
    }

    pub fn start_value(&self) -> Option<&AnimValue> {
        self.start.as_ref()
    }

    pub fn end_value(&self) -> Option<&AnimValue> {
        self.end.as_ref()
    }

    fn perform(&mut self, value: AnimValue) {
        let value = apply_formula(self.formula.as_ref(), value);
        self.animation.perform(&value);
    }

    fn interpolate(&self, from: &AnimValue, to: &AnimValue, t: f64) -> AnimValue {
        match self.interpolator {
            Some(interpolator) => interpolator.interpolate(from, to, t),
            None if t < 1.0 => from.clone(),
            None => to.clone(),
        }
    }
}

impl AnimationHooks for FromToByHooks {
    fn init_animated_element(&mut self) {
        if let Some(from) = self.values.from.clone() {
            self.perform(from);
        }
    }

    fn start_animation(&mut self, target: Option<&ElementRef>) {
        self.animation.start(target);
        let underlying = self.animation.underlying_value();
        let FromToByValues { from, to, by } = self.values.clone();
        self.dynamic_start = false;
        self.iteration = 0;

        match from {
            Some(from) => {
                self.start = Some(from.clone());
                self.end = match (to, by) {
                    (Some(to), _) => Some(to),
                    (None, Some(by)) => Some(from.add(&by)),
                    (None, None) => None,
                };
                self.start_interpolation = self.start.clone();
            }
            None => {
                self.start = underlying;
                self.start_interpolation = self.start.clone();
                match (to, by) {
                    (Some(to), _) => {
                        self.dynamic_start = true;
                        self.previous = self.start.clone();
                        self.end = Some(to);
                    }
                    (None, Some(by)) => {
                        self.end = self.start.as_ref().map(|s| s.add(&by));
                    }
                    (None, None) => self.end = None,
                }
            }
        }
        tracing::debug!(start = ?self.start, end = ?self.end, "from-to-by animation started");
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }

    fn perform_end(&mut self, auto_reverse: bool) {
        let value = if auto_reverse {
            self.start.clone()
        } else {
            self.end.clone()
        };
        if let Some(value) = value {
            self.perform(value);
        }
    }

    fn perform_continuous(&mut self, t: f64, repeat: u32) {
        if self.dynamic_start {
            if self.iteration != repeat {
                self.iteration = repeat;
                self.start_interpolation = self.start.clone();
            } else {
                let actual = self.animation.underlying_value();
                if actual != self.previous {
                    self.start_interpolation = actual;
                }
            }
        }

        let (Some(from), Some(to)) = (&self.start_interpolation, &self.end) else {
            tracing::warn!("from-to-by animation without start or end value");
            return;
        };
        let mut value = self.interpolate(from, to, t);
        if self.cumulative && !self.dynamic_start {
            value = to.scale(f64::from(repeat)).add(&value);
        }
        self.perform(value);

        if self.dynamic_start {
            self.previous = self.animation.underlying_value();
        }
    }

    /// The first frame shows the start value, every later frame the end value.
    fn perform_discrete(&mut self, frame: usize, _repeat: u32) {
        let value = if frame == 0 {
            self.start.clone()
        } else {
            self.end.clone()
        };
        if let Some(value) = value {
            self.perform(value);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activities/from_to_by.rs"]
mod tests;
