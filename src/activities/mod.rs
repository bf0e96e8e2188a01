//! Activities: cooperative drivers stepped by the [`ActivityQueue`] that push computed values into
//! animations.

use std::fmt;
use std::rc::Rc;

use kurbo::{Rect, Vec2};

use crate::animation::element::ElementRef;
use crate::animation::value::AnimValue;
use crate::events::{EventRef, TimerEventQueue, WakeupEvent};
use crate::expression::{ExprEnv, Expression};
use crate::foundation::ids::ActivityId;
use crate::timing::ElapsedTime;

pub mod base;
pub mod from_to_by;
pub mod queue;
pub mod set;
pub mod simple;
pub mod value_list;

pub use base::{
    ActivityCore, AnimationHooks, ContinuousActivity, DiscreteActivity, KeyStopLerp,
    calc_accelerated_time,
};
pub use from_to_by::{FromToByHooks, FromToByValues};
pub use queue::ActivityQueue;
pub use set::SetActivity;
pub use simple::{Direction, SimpleHooks, simple_activity};
pub use value_list::ValueListHooks;

pub trait Activity: fmt::Debug {
    fn id(&self) -> ActivityId;

    /// Re-arm a finished activity with a fresh end event.
    fn activate(&mut self, end_event: EventRef);

    /// Advance one step. `true` asks to be performed again on the next round.
    fn perform(&mut self, events: &mut TimerEventQueue) -> bool;

    /// Seconds the shared timer should be moved back so the minimal frame count is honoured.
    fn calc_time_lag(&mut self) -> f64;

    fn is_active(&self) -> bool;

    /// Called once the queue has dropped the activity after a `perform` returned `false`.
    fn dequeued(&mut self);

    /// Jump to the final state and fire the end event.
    fn end(&mut self, events: &mut TimerEventQueue);

    fn dispose(&mut self);

    fn set_targets(&mut self, target: ElementRef);
}

/// `formula` attribute: an expression over `$` (the computed value) and the element geometry.
#[derive(Debug, Clone)]
pub struct Formula {
    expression: Expression,
    env: ExprEnv,
}

impl Formula {
    pub fn new(expression: Expression, env: ExprEnv) -> Self {
        Self { expression, env }
    }

    /// Geometry variables of an element: bbox centre and size divided by the slide size.
    pub fn env_for(bbox: Rect, slide_size: Vec2) -> ExprEnv {
        ExprEnv {
            x: bbox.center().x / slide_size.x,
            y: bbox.center().y / slide_size.y,
            width: bbox.width() / slide_size.x,
            height: bbox.height() / slide_size.y,
            param: None,
        }
    }

    pub fn source(&self) -> &str {
        self.expression.source()
    }

    /// Numbers go through the expression; other values pass unchanged.
    pub fn apply(&self, value: &AnimValue) -> AnimValue {
        let AnimValue::Number(v) = value else {
            return value.clone();
        };
        match self.expression.eval(&self.env.with_param(*v)) {
            Ok(out) => AnimValue::Number(out),
            Err(e) => {
                tracing::warn!(formula = self.source(), error = %e, "formula evaluation failed");
                value.clone()
            }
        }
    }
}

pub(crate) fn apply_formula(formula: Option<&Formula>, value: AnimValue) -> AnimValue {
    match formula {
        Some(f) => f.apply(&value),
        None => value,
    }
}

/// Everything an activity needs from its node besides the animation itself.
#[derive(Debug, Clone)]
pub struct ActivityParamSet {
    pub end_event: Option<EventRef>,
    pub wakeup_event: Option<Rc<WakeupEvent>>,
    /// Timer shared with the timer event queue.
    pub timer: ElapsedTime,
    pub min_duration: f64,
    pub min_frame_count: f64,
    pub auto_reverse: bool,
    /// `None` repeats indefinitely.
    pub repeat_count: Option<f64>,
    pub acceleration: f64,
    pub deceleration: f64,
    pub slide_size: Vec2,
    pub formula: Option<Formula>,
    pub discrete_times: Vec<f64>,
}

impl ActivityParamSet {
    pub fn new(timer: ElapsedTime, slide_size: Vec2) -> Self {
        Self {
            end_event: None,
            wakeup_event: None,
            timer,
            min_duration: 0.001,
            min_frame_count: 1.0,
            auto_reverse: false,
            repeat_count: Some(1.0),
            acceleration: 0.0,
            deceleration: 0.0,
            slide_size,
            formula: None,
            discrete_times: Vec::new(),
        }
    }
}
