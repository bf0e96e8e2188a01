use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::ids::{ActivityId, EventId, NodeId};
use crate::timing::ElapsedTime;

/// Work a node container performs on one of its children or on itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeAction {
    Activate,
    Deactivate,
    /// Re-run the children of an indefinite container.
    Repeat,
    SkipEffect(NodeId),
    RewindCurrentEffect(NodeId),
    RewindLastEffect(NodeId),
}

/// What a fired event asks the handler to do.
///
/// Events never reach into the node graph themselves; the handler dispatches these.
#[derive(Clone, Debug, PartialEq)]
pub enum EventAction {
    Node {
        slide: usize,
        node: NodeId,
        action: NodeAction,
    },
    WakeActivity(ActivityId),
    InteractiveSequenceStart(NodeId),
    InteractiveSequenceEnd(NodeId),
    TransitionEnd {
        new_slide: usize,
        old_slide: Option<usize>,
    },
    AutoAdvance,
    /// Host-defined tag, returned untouched.
    Marker(u64),
}

pub trait EventBase: fmt::Debug {
    fn id(&self) -> EventId;

    /// Fire the event; `None` when it is no longer charged.
    fn fire(&self) -> Option<EventAction>;

    fn is_charged(&self) -> bool;

    fn activation_time(&self, now: f64) -> f64;

    fn dispose(&self);

    fn charge(&self);
}

pub type EventRef = Rc<dyn EventBase>;

/// One-shot event firing `timeout` seconds after it is queued.
#[derive(Debug)]
pub struct DelayEvent {
    id: EventId,
    action: EventAction,
    timeout: f64,
    was_fired: Cell<bool>,
}

impl DelayEvent {
    pub fn new(action: EventAction, timeout: f64) -> Self {
        Self {
            id: EventId::next(),
            action,
            timeout,
            was_fired: Cell::new(false),
        }
    }

    pub fn action(&self) -> &EventAction {
        &self.action
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }
}

impl EventBase for DelayEvent {
    fn id(&self) -> EventId {
        self.id
    }

    fn fire(&self) -> Option<EventAction> {
        if !self.is_charged() {
            return None;
        }
        self.was_fired.set(true);
        Some(self.action.clone())
    }

    fn is_charged(&self) -> bool {
        !self.was_fired.get()
    }

    fn activation_time(&self, now: f64) -> f64 {
        now + self.timeout
    }

    fn dispose(&self) {
        // a disposed event behaves as if it had already fired
        self.was_fired.set(true);
    }

    fn charge(&self) {
        self.was_fired.set(false);
    }
}

pub fn make_delay(action: EventAction, timeout: f64) -> EventRef {
    Rc::new(DelayEvent::new(action, timeout))
}

pub fn make_event(action: EventAction) -> EventRef {
    make_delay(action, 0.0)
}

/// Re-queues a discrete activity at the time of its next frame.
#[derive(Debug)]
pub struct WakeupEvent {
    id: EventId,
    timer: ElapsedTime,
    next_time: Cell<f64>,
    activity: Cell<Option<ActivityId>>,
}

impl WakeupEvent {
    pub fn new(queue_timer: &ElapsedTime) -> Self {
        Self {
            id: EventId::next(),
            timer: ElapsedTime::child_of(queue_timer),
            next_time: Cell::new(0.0),
            activity: Cell::new(None),
        }
    }

    pub fn start(&self) {
        self.timer.reset();
    }

    pub fn set_next_timeout(&self, next_time: f64) {
        self.next_time.set(next_time);
    }

    pub fn set_activity(&self, activity: ActivityId) {
        self.activity.set(Some(activity));
    }
}

impl EventBase for WakeupEvent {
    fn id(&self) -> EventId {
        self.id
    }

    fn fire(&self) -> Option<EventAction> {
        self.activity.get().map(EventAction::WakeActivity)
    }

    fn is_charged(&self) -> bool {
        true
    }

    fn activation_time(&self, now: f64) -> f64 {
        let elapsed = self.timer.elapsed();
        now.max(now - elapsed + self.next_time.get())
    }

    fn dispose(&self) {
        self.activity.set(None);
    }

    fn charge(&self) {}
}

#[cfg(test)]
#[path = "../../tests/unit/events/event.rs"]
mod tests;
