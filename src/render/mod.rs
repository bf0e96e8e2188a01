//! Drawing surfaces: the GL backend trait, a recording backend and a CPU compositor.

pub mod backend;
pub mod cpu;
pub mod recording;
#[cfg(feature = "webgl")]
pub mod webgl;

pub use backend::{BufferId, GlBackend, GlCommand, ProgramId, TextureId, Uniform};
pub use cpu::CpuCompositor;
pub use recording::{CommandLog, RecordingBackend};
#[cfg(feature = "webgl")]
pub use webgl::WebGlBackend;
