use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::events::event::EventRef;
use crate::events::timer_queue::TimerEventQueue;
use crate::foundation::ids::NodeId;
use crate::timing::EventTrigger;

/// Who an event registration is keyed on: an animation node or a shape on the slide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notifier {
    Node(NodeId),
    Element(String),
}

impl fmt::Display for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "{id}"),
            Self::Element(id) => f.write_str(id),
        }
    }
}

/// Work re-armed after an effect is rewound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RewindedHandler {
    ChargeSource(String),
    ChargeInteractiveSequence(NodeId),
}

/// Messages from the node graph to the slideshow handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerNotice {
    NextEffectEnd,
    AnimationsEnd,
    FirstAutoEffectStarted,
    FirstAutoEffectEnded,
    Rewinded(RewindedHandler),
}

/// Per-slide routing of triggers to queued events.
#[derive(Debug, Default)]
pub struct EventMultiplexer {
    event_map: HashMap<(EventTrigger, Notifier), Vec<EventRef>>,
    animations_end_handler: bool,
    next_effect_end_handlers: usize,
    skip_effect_event: Option<EventRef>,
    rewind_current_effect_event: Option<EventRef>,
    rewind_last_effect_event: Option<EventRef>,
    skip_interactive: HashMap<NodeId, EventRef>,
    rewind_running_interactive: HashMap<NodeId, EventRef>,
    rewind_ended_interactive: HashMap<NodeId, EventRef>,
    rewinded_handlers: HashMap<Notifier, RewindedHandler>,
    notices: VecDeque<HandlerNotice>,
}

impl EventMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_event(&mut self, trigger: EventTrigger, notifier: Notifier, event: EventRef) {
        tracing::trace!(?trigger, %notifier, event = %event.id(), "event registered");
        self.event_map
            .entry((trigger, notifier))
            .or_default()
            .push(event);
    }

    /// Queue every event registered for `(trigger, notifier)`.
    pub fn notify_event(
        &self,
        trigger: EventTrigger,
        notifier: &Notifier,
        queue: &mut TimerEventQueue,
    ) {
        if let Some(events) = self.event_map.get(&(trigger, notifier.clone())) {
            for event in events {
                queue.push(event.clone());
            }
        }
    }

    pub fn register_animations_end_handler(&mut self) {
        self.animations_end_handler = true;
    }

    pub fn notify_animations_end(&mut self) {
        if self.animations_end_handler {
            self.notices.push_back(HandlerNotice::AnimationsEnd);
        }
    }

    pub fn register_next_effect_end_handler(&mut self) {
        self.next_effect_end_handlers += 1;
    }

    /// Notify each registered next-effect-end handler once, then forget them.
    pub fn notify_next_effect_end(&mut self) {
        for _ in 0..self.next_effect_end_handlers {
            self.notices.push_back(HandlerNotice::NextEffectEnd);
        }
        self.next_effect_end_handlers = 0;
    }

    pub fn register_skip_effect_event(&mut self, event: EventRef) {
        self.skip_effect_event = Some(event);
    }

    pub fn notify_skip_effect(&mut self, queue: &mut TimerEventQueue) {
        if let Some(event) = self.skip_effect_event.take() {
            queue.push(event);
        }
    }

    pub fn register_rewind_current_effect_event(&mut self, event: EventRef) {
        self.rewind_current_effect_event = Some(event);
    }

    pub fn notify_rewind_current_effect(&mut self, queue: &mut TimerEventQueue) {
        if let Some(event) = self.rewind_current_effect_event.take() {
            queue.push(event);
        }
    }

    pub fn register_rewind_last_effect_event(&mut self, event: EventRef) {
        self.rewind_last_effect_event = Some(event);
    }

    pub fn notify_rewind_last_effect(&mut self, queue: &mut TimerEventQueue) {
        if let Some(event) = self.rewind_last_effect_event.take() {
            queue.push(event);
        }
    }

    pub fn register_skip_interactive_effect_event(&mut self, node: NodeId, event: EventRef) {
        self.skip_interactive.insert(node, event);
    }

    pub fn notify_skip_interactive_effect(&self, node: NodeId, queue: &mut TimerEventQueue) {
        if let Some(event) = self.skip_interactive.get(&node) {
            queue.push(event.clone());
        }
    }

    pub fn register_rewind_running_interactive_effect_event(
        &mut self,
        node: NodeId,
        event: EventRef,
    ) {
        self.rewind_running_interactive.insert(node, event);
    }

    pub fn notify_rewind_running_interactive_effect(
        &self,
        node: NodeId,
        queue: &mut TimerEventQueue,
    ) {
        if let Some(event) = self.rewind_running_interactive.get(&node) {
            queue.push(event.clone());
        }
    }

    pub fn register_rewind_ended_interactive_effect_event(
        &mut self,
        node: NodeId,
        event: EventRef,
    ) {
        self.rewind_ended_interactive.insert(node, event);
    }

    pub fn notify_rewind_ended_interactive_effect(
        &self,
        node: NodeId,
        queue: &mut TimerEventQueue,
    ) {
        if let Some(event) = self.rewind_ended_interactive.get(&node) {
            queue.push(event.clone());
        }
    }

    pub fn register_rewinded_effect_handler(&mut self, notifier: Notifier, handler: RewindedHandler) {
        self.rewinded_handlers.insert(notifier, handler);
    }

    pub fn notify_rewinded_effect(&mut self, notifier: &Notifier) {
        if let Some(handler) = self.rewinded_handlers.get(notifier) {
            self.notices
                .push_back(HandlerNotice::Rewinded(handler.clone()));
        }
    }

    pub fn push_notice(&mut self, notice: HandlerNotice) {
        self.notices.push_back(notice);
    }

    pub fn take_notice(&mut self) -> Option<HandlerNotice> {
        self.notices.pop_front()
    }

    pub fn has_notices(&self) -> bool {
        !self.notices.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/multiplexer.rs"]
mod tests;
