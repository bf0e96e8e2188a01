//! Discrete-event core: events, the timer queue and per-slide trigger routing.

pub mod event;
pub mod multiplexer;
pub mod next_effect;
pub mod source;
pub mod timer_queue;

pub use event::{
    DelayEvent, EventAction, EventBase, EventRef, NodeAction, WakeupEvent, make_delay, make_event,
};
pub use multiplexer::{EventMultiplexer, HandlerNotice, Notifier, RewindedHandler};
pub use next_effect::NextEffectEventArray;
pub use source::{InteractiveAnimationSequence, SourceEventElement};
pub use timer_queue::TimerEventQueue;
