use crate::events::event::{EventAction, EventRef};

/// Events started by successive "next effect" user actions, in play order.
#[derive(Debug, Default)]
pub struct NextEffectEventArray {
    events: Vec<EventRef>,
}

impl NextEffectEventArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&EventRef> {
        self.events.get(index)
    }

    /// Append `event` unless an event with the same id is already present.
    pub fn append(&mut self, event: EventRef) -> bool {
        if self.events.iter().any(|e| e.id() == event.id()) {
            tracing::debug!(event = %event.id(), "next effect event already present");
            return false;
        }
        tracing::trace!(event = %event.id(), index = self.events.len(), "next effect event appended");
        self.events.push(event);
        true
    }

    /// Fire the event at `index` directly, bypassing the timer queue.
    pub fn fire(&self, index: usize) -> Option<EventAction> {
        self.events.get(index).and_then(|e| e.fire())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
