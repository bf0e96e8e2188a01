use crate::activities::{ActivityParamSet, AnimationHooks, ContinuousActivity};
use crate::animation::animations::Animation;
use crate::animation::element::ElementRef;
use crate::animation::value::AnimValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Backward = 0,
    Forward = 1,
}

impl Direction {
    fn factor(self) -> f64 {
        f64::from(self as u8)
    }

    /// Progress seen by the animation: `t` forward, `1 - t` backward.
    pub fn apply(self, t: f64) -> f64 {
        let d = self.factor();
        1.0 - d + t * (2.0 * d - 1.0)
    }
}

/// Feeds the raw progress to an animation, as used by shape transitions.
#[derive(Debug)]
pub struct SimpleHooks {
    animation: Box<dyn Animation>,
    direction: Direction,
}

impl SimpleHooks {
    pub fn new(animation: Box<dyn Animation>, direction: Direction) -> Self {
        Self {
            animation,
            direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl AnimationHooks for SimpleHooks {
    fn start_animation(&mut self, target: Option<&ElementRef>) {
        self.animation.start(target);
    }

    fn end_animation(&mut self) {
        self.animation.end();
    }

    fn perform_end(&mut self, _auto_reverse: bool) {
        self.animation
            .perform(&AnimValue::Number(self.direction.factor()));
    }

    fn perform_continuous(&mut self, t: f64, _repeat: u32) {
        self.animation
            .perform(&AnimValue::Number(self.direction.apply(t)));
    }
}

pub fn simple_activity(
    params: &ActivityParamSet,
    animation: Box<dyn Animation>,
    direction: Direction,
) -> ContinuousActivity<SimpleHooks> {
    ContinuousActivity::new(params, SimpleHooks::new(animation, direction))
}
