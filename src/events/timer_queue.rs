use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::events::event::{EventAction, EventRef};
use crate::timing::ElapsedTime;

struct EventEntry {
    activation_time: f64,
    seq: u64,
    event: EventRef,
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    // BinaryHeap is a max-heap: the earliest time, then the earliest insertion, is the greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .activation_time
            .total_cmp(&self.activation_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered queue of pending events.
///
/// Entries with equal activation times fire in insertion order.
pub struct TimerEventQueue {
    timer: ElapsedTime,
    entries: BinaryHeap<EventEntry>,
    next_seq: u64,
}

impl fmt::Debug for TimerEventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEventQueue")
            .field("pending", &self.entries.len())
            .field("next_seq", &self.next_seq)
            .finish()
    }
}

impl TimerEventQueue {
    pub fn new(timer: ElapsedTime) -> Self {
        Self {
            timer,
            entries: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn timer(&self) -> &ElapsedTime {
        &self.timer
    }

    /// Schedule `event` at `event.activation_time(elapsed)`. Returns `false` for a missing event.
    pub fn add_event(&mut self, event: Option<EventRef>) -> bool {
        let Some(event) = event else {
            tracing::warn!("TimerEventQueue::add_event: null event");
            return false;
        };
        let activation_time = event.activation_time(self.timer.elapsed());
        tracing::trace!(event = %event.id(), activation_time, "event queued");
        self.entries.push(EventEntry {
            activation_time,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
        true
    }

    pub fn push(&mut self, event: EventRef) {
        self.add_event(Some(event));
    }

    /// Pop the next charged event due at `now` (any pending event when `force`).
    ///
    /// Uncharged events on the way are dropped without firing.
    pub fn pop_due(&mut self, now: f64, force: bool) -> Option<EventRef> {
        while let Some(top) = self.entries.peek() {
            if !force && top.activation_time > now {
                return None;
            }
            let entry = self.entries.pop()?;
            if entry.event.is_charged() {
                return Some(entry.event);
            }
            tracing::trace!(event = %entry.event.id(), "dropped uncharged event");
        }
        None
    }

    /// Fire every event whose activation time has been reached.
    pub fn process(&mut self) -> Vec<EventAction> {
        self.drain(false)
    }

    /// Fire every pending event regardless of its activation time.
    pub fn force_empty(&mut self) -> Vec<EventAction> {
        self.drain(true)
    }

    fn drain(&mut self, force: bool) -> Vec<EventAction> {
        let now = self.timer.elapsed();
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(now, force) {
            fired.extend(event.fire());
        }
        fired
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Seconds until the next event is due, or `f64::MAX` when empty.
    pub fn next_timeout(&self) -> f64 {
        match self.entries.peek() {
            Some(top) => top.activation_time - self.timer.elapsed(),
            None => f64::MAX,
        }
    }

    /// Drop every pending event without firing it.
    pub fn clear(&mut self) {
        tracing::debug!(pending = self.entries.len(), "timer event queue cleared");
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/timer_queue.rs"]
mod tests;
