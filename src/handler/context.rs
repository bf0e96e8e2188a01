use std::collections::{BTreeMap, VecDeque};

use kurbo::Vec2;

use crate::activities::ActivityQueue;
use crate::events::{
    EventAction, EventMultiplexer, InteractiveAnimationSequence, NextEffectEventArray,
    SourceEventElement, TimerEventQueue,
};
use crate::foundation::config::EngineConfig;
use crate::foundation::ids::NodeId;
use crate::timing::ElapsedTime;

/// State shared by the slideshow handler and the node graph of the slide on screen.
///
/// The timer event queue and the activity queue run on the same timer. The next-effect array,
/// the interactive sequences and the source elements belong to the current slide and are handed
/// back to it when the slide ends.
#[derive(Debug)]
pub struct SlideShowContext {
    pub config: EngineConfig,
    pub timer: ElapsedTime,
    pub timer_queue: TimerEventQueue,
    pub activities: ActivityQueue,
    pub multiplexer: EventMultiplexer,
    pub next_effects: NextEffectEventArray,
    pub interactive_sequences: BTreeMap<NodeId, InteractiveAnimationSequence>,
    pub source_elements: BTreeMap<String, SourceEventElement>,
    pub is_skipping: bool,
    pub is_rewinding: bool,
    pub slide_size: Vec2,
    /// Index of the slide whose node events are live; events of other slides are stale.
    pub slide: Option<usize>,
    deferred: VecDeque<EventAction>,
}

impl SlideShowContext {
    pub fn new(config: EngineConfig, timer: ElapsedTime, slide_size: Vec2) -> Self {
        Self {
            config,
            timer_queue: TimerEventQueue::new(timer.clone()),
            activities: ActivityQueue::new(timer.clone()),
            timer,
            multiplexer: EventMultiplexer::new(),
            next_effects: NextEffectEventArray::new(),
            interactive_sequences: BTreeMap::new(),
            source_elements: BTreeMap::new(),
            is_skipping: false,
            is_rewinding: false,
            slide_size,
            slide: None,
            deferred: VecDeque::new(),
        }
    }

    /// Hand an action the node graph cannot run itself over to the handler.
    pub fn defer(&mut self, action: EventAction) {
        self.deferred.push_back(action);
    }

    pub fn take_deferred(&mut self) -> Option<EventAction> {
        self.deferred.pop_front()
    }

    /// Drop pending events and unschedule every activity.
    pub fn clear_queues(&mut self) {
        self.timer_queue.clear();
        self.activities.clear();
    }
}
