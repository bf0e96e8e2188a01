//! The presentation model and the handler that plays it.

pub mod context;
#[allow(clippy::module_inception)]
pub mod handler;
pub mod presentation;

pub use context::SlideShowContext;
pub use handler::{PresenterEvent, SlideShowHandler, TimelineEntry};
pub use presentation::{MetaPresentation, MetaSlide, PresentationInfo, SlideInfo};
