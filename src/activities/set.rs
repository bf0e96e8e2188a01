use crate::activities::{Activity, ActivityCore, ActivityParamSet};
use crate::animation::animations::Animation;
use crate::animation::element::ElementRef;
use crate::animation::value::AnimValue;
use crate::events::{EventRef, TimerEventQueue};
use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::foundation::ids::ActivityId;

/// One-shot activity: writes its `to` value on the first step and ends.
#[derive(Debug)]
pub struct SetActivity {
    core: ActivityCore,
    animation: Option<Box<dyn Animation>>,
    to_value: AnimValue,
}

impl SetActivity {
    pub fn new(
        params: &ActivityParamSet,
        animation: Option<Box<dyn Animation>>,
        to_value: AnimValue,
    ) -> Self {
        Self {
            core: ActivityCore::new(params.end_event.clone()),
            animation,
            to_value,
        }
    }

    pub fn to_value(&self) -> &AnimValue {
        &self.to_value
    }

    /// Run the single step. `Ok(false)` when already spent.
    pub fn apply(&mut self, events: &mut TimerEventQueue) -> SlideShowResult<bool> {
        if !self.core.is_active() {
            return Ok(false);
        }
        let Some(animation) = self.animation.as_mut() else {
            self.core.end_activity(events);
            return Err(SlideShowError::invalid_state(format!(
                "set activity {} has no animation",
                self.core.id()
            )));
        };
        let Some(target) = self.core.target().cloned() else {
            self.core.end_activity(events);
            return Err(SlideShowError::invalid_state(format!(
                "set activity {} has no target element",
                self.core.id()
            )));
        };

        animation.start(Some(&target));
        animation.perform(&self.to_value);
        animation.end();
        self.core.end_activity(events);
        Ok(true)
    }
}

impl Activity for SetActivity {
    fn id(&self) -> ActivityId {
        self.core.id()
    }

    fn activate(&mut self, end_event: EventRef) {
        self.core.activate(end_event);
    }

    fn perform(&mut self, events: &mut TimerEventQueue) -> bool {
        if let Err(e) = self.apply(events) {
            tracing::error!(error = %e, "set activity failed");
        }
        false
    }

    fn calc_time_lag(&mut self) -> f64 {
        0.0
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }

    fn dequeued(&mut self) {}

    fn end(&mut self, events: &mut TimerEventQueue) {
        self.perform(events);
    }

    fn dispose(&mut self) {
        self.core.dispose();
    }

    fn set_targets(&mut self, target: ElementRef) {
        self.core.set_target(target);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activities/set.rs"]
mod tests;
