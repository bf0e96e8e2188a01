#![forbid(unsafe_code)]

pub mod activities;
pub mod animation;
pub mod compositor;
pub mod events;
pub mod expression;
pub mod foundation;
pub mod handler;
pub mod render;
pub mod timing;
pub mod transitions;

pub use foundation::config::EngineConfig;
pub use foundation::error::{SlideShowError, SlideShowResult};
pub use foundation::ids::NodeId;
pub use handler::{
    MetaPresentation, PresentationInfo, PresenterEvent, SlideInfo, SlideShowHandler,
    TimelineEntry,
};
pub use timing::{ElapsedTime, ManualClock};
