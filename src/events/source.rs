use kurbo::{Point, Rect};

use crate::events::event::{EventAction, EventRef, make_event};
use crate::events::multiplexer::{EventMultiplexer, Notifier};
use crate::events::timer_queue::TimerEventQueue;
use crate::foundation::ids::NodeId;
use crate::timing::EventTrigger;

/// A clickable shape that triggers `OnClick` registrations for its id.
#[derive(Clone, Debug)]
pub struct SourceEventElement {
    id: String,
    bounds: Rect,
    click_handled: bool,
    pointer_over: bool,
}

impl SourceEventElement {
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            bounds,
            click_handled: false,
            pointer_over: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn is_pointer_over(&self) -> bool {
        self.pointer_over
    }

    /// Track the pointer; returns true when the element should show a pointer cursor.
    pub fn on_pointer_move(&mut self, point: Point) -> bool {
        self.pointer_over = self.bounds.contains(point);
        self.pointer_over && !self.click_handled
    }

    pub fn charge(&mut self) {
        self.click_handled = false;
    }

    pub fn is_charged(&self) -> bool {
        !self.click_handled
    }

    /// Fire the element's click registrations if `point` hits it and it is charged.
    pub fn handle_click(
        &mut self,
        point: Point,
        multiplexer: &EventMultiplexer,
        queue: &mut TimerEventQueue,
    ) -> bool {
        self.pointer_over = self.bounds.contains(point);
        if !self.pointer_over || self.click_handled {
            return false;
        }
        tracing::debug!(element = %self.id, "source element clicked");
        multiplexer.notify_event(
            EventTrigger::OnClick,
            &Notifier::Element(self.id.clone()),
            queue,
        );
        self.click_handled = true;
        true
    }
}

/// An interactive effect started by clicking a shape, identified by its effect node.
#[derive(Debug)]
pub struct InteractiveAnimationSequence {
    id: NodeId,
    running: bool,
    start_event: Option<EventRef>,
    end_event: Option<EventRef>,
}

impl InteractiveAnimationSequence {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            running: false,
            start_event: None,
            end_event: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn start_event(&mut self) -> EventRef {
        let id = self.id;
        self.start_event
            .get_or_insert_with(|| make_event(EventAction::InteractiveSequenceStart(id)))
            .clone()
    }

    pub fn end_event(&mut self) -> EventRef {
        let id = self.id;
        self.end_event
            .get_or_insert_with(|| make_event(EventAction::InteractiveSequenceEnd(id)))
            .clone()
    }

    pub fn charge_events(&self) {
        if let Some(e) = &self.start_event {
            e.charge();
        }
        if let Some(e) = &self.end_event {
            e.charge();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn end(&mut self) {
        self.running = false;
    }
}
