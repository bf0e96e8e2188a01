use crate::activities::{AnimationHooks, Formula, apply_formula};
use crate::animation::animations::Animation;
use crate::animation::element::ElementRef;
use crate::animation::value::{AnimValue, Interpolator};

/// `values` animation: interpolates between consecutive list entries, or steps through them in
/// discrete mode.
#[derive(Debug)]
pub struct ValueListHooks {
    values: Vec<AnimValue>,
    animation: Box<dyn Animation>,
    interpolator: Option<Interpolator>,
    formula: Option<Formula>,
    cumulative: bool,
}

impl ValueListHooks {
    pub fn new(
        values: Vec<AnimValue>,
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
        }
    }

    pub fn values(&self) -> &[AnimValue] {
        &self.values
    }

    fn accumulate(&self, value: AnimValue, repeat: u32) -> AnimValue {
        match self.values.last() {
            Some(last) if self.cumulative => value.add(&last.scale(f64::from(repeat))),
            _ => value,
        }
    }

    fn perform(&mut self, value: AnimValue) {
        let value = apply_formula(self.formula.as_ref(), value);
        self.animation.perform(&value);
    }
}

impl AnimationHooks for ValueListHooks {
    fn init_animated_element(&mut self) {
        if let Some(first) = self.values.first().cloned() {
            self.perform(first);
        }
    }

    fn start_animation(&mut self, target: Option<&ElementRef>) {
        self.animation.start(target);
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }

    fn perform_end(&mut self, auto_reverse: bool) {
        let value = if auto_reverse {
            self.values.first()
        } else {
            self.values.last()
        };
        if let Some(value) = value.cloned() {
            self.perform(value);
        }
    }

    fn perform_key_frame(&mut self, index: usize, lerp: f64, repeat: u32) {
        let Some(from) = self.values.get(index) else {
            tracing::warn!(index, len = self.values.len(), "key frame out of range");
            return;
        };
        let to = self.values.get(index + 1).unwrap_or(from);
        let value = match self.interpolator {
            Some(interpolator) => interpolator.interpolate(from, to, lerp),
            None if lerp < 1.0 => from.clone(),
            None => to.clone(),
        };
        let value = self.accumulate(value, repeat);
        self.perform(value);
    }

    fn perform_discrete(&mut self, frame: usize, repeat: u32) {
        let Some(value) = self.values.get(frame).cloned() else {
            tracing::warn!(frame, len = self.values.len(), "discrete frame out of range");
            return;
        };
        let value = self.accumulate(value, repeat);
        self.perform(value);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activities/value_list.rs"]
mod tests;
