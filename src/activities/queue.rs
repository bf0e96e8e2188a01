use std::collections::{HashMap, VecDeque};

use crate::activities::Activity;
use crate::events::TimerEventQueue;
use crate::foundation::ids::ActivityId;
use crate::timing::ElapsedTime;

/// Owns every live activity and steps the scheduled ones once per round.
#[derive(Debug)]
pub struct ActivityQueue {
    timer: ElapsedTime,
    activities: HashMap<ActivityId, Box<dyn Activity>>,
    waiting: VecDeque<ActivityId>,
    reinsert: Vec<ActivityId>,
    dequeued: Vec<ActivityId>,
}

impl ActivityQueue {
    pub fn new(timer: ElapsedTime) -> Self {
        Self {
            timer,
            activities: HashMap::new(),
            waiting: VecDeque::new(),
            reinsert: Vec::new(),
            dequeued: Vec::new(),
        }
    }

    pub fn timer(&self) -> &ElapsedTime {
        &self.timer
    }

    /// Take ownership of `activity` without scheduling it.
    pub fn insert(&mut self, activity: Box<dyn Activity>) -> ActivityId {
        let id = activity.id();
        self.activities.insert(id, activity);
        id
    }

    pub fn get(&self, id: ActivityId) -> Option<&dyn Activity> {
        self.activities.get(&id).map(|a| a.as_ref())
    }

    pub fn get_mut(&mut self, id: ActivityId) -> Option<&mut (dyn Activity + 'static)> {
        self.activities.get_mut(&id).map(|a| a.as_mut())
    }

    /// Drop an activity from the arena and every schedule list.
    pub fn remove(&mut self, id: ActivityId) -> Option<Box<dyn Activity>> {
        self.waiting.retain(|a| *a != id);
        self.reinsert.retain(|a| *a != id);
        self.dequeued.retain(|a| *a != id);
        self.activities.remove(&id)
    }

    /// Schedule a registered activity for the next round.
    pub fn add_activity(&mut self, id: ActivityId) -> bool {
        if !self.activities.contains_key(&id) {
            tracing::warn!(activity = %id, "ActivityQueue::add_activity: unknown activity");
            return false;
        }
        self.waiting.push_back(id);
        true
    }

    /// Perform every waiting activity once.
    pub fn process(&mut self, events: &mut TimerEventQueue) {
        let mut lag = 0.0_f64;
        for id in &self.waiting {
            if let Some(activity) = self.activities.get_mut(id) {
                lag = lag.max(activity.calc_time_lag());
            }
        }
        if lag > 0.0 {
            tracing::trace!(lag, "activity queue moves timer back");
            self.timer.adjust(-lag);
        }

        while let Some(id) = self.waiting.pop_front() {
            let Some(activity) = self.activities.get_mut(&id) else {
                continue;
            };
            if activity.perform(events) {
                self.reinsert.push(id);
            } else {
                self.dequeued.push(id);
            }
        }

        if !self.reinsert.is_empty() {
            self.waiting.extend(self.reinsert.drain(..));
        }
    }

    pub fn process_dequeued(&mut self) {
        for id in std::mem::take(&mut self.dequeued) {
            if let Some(activity) = self.activities.get_mut(&id) {
                activity.dequeued();
            }
        }
    }

    /// End every scheduled activity, jumping each to its final state.
    pub fn end_all(&mut self, events: &mut TimerEventQueue) {
        let ids: Vec<ActivityId> = self.waiting.drain(..).chain(self.reinsert.drain(..)).collect();
        for id in ids {
            if let Some(activity) = self.activities.get_mut(&id) {
                activity.end(events);
            }
        }
    }

    /// Unschedule everything without ending it.
    pub fn clear(&mut self) {
        self.waiting.clear();
        self.reinsert.clear();
        self.dequeued.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty() && self.reinsert.is_empty()
    }

    pub fn scheduled(&self) -> usize {
        self.waiting.len() + self.reinsert.len()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/activities/queue.rs"]
mod tests;
