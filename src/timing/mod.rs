pub mod clock;
pub mod elapsed;
pub mod frame_sync;
pub mod smil;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use elapsed::ElapsedTime;
pub use frame_sync::FrameSynchronization;
pub use smil::{Duration, EventTrigger, Timing, TimingType, parse_clock_value};
