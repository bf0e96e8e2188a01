//! Slide transitions: the catalogue, its shaders and scenes, and the per-change GL lifecycle.

use std::fmt;

use glam::{Vec2, Vec4};

use crate::foundation::error::SlideShowResult;
use crate::render::backend::Uniform;

pub mod fade;
pub mod info;
pub mod kind;
pub mod mask;
pub mod mesh;
pub mod operation;
pub mod primitive;
pub mod registry;
pub mod shader;
pub mod slide_change;
pub mod types;

pub use fade::FadeTransition;
pub use kind::{ResolvedTransition, TransitionKind};
pub use mask::MaskTransition;
pub use mesh::MeshTransition;
pub use operation::Operation;
pub use primitive::{DrawPolicy, Primitive, TransitionScene};
pub use registry::{TransitionParameters, TransitionProgram, TransitionRegistry};
pub use slide_change::{SlideChange, TransitionAnimation, TransitionStage};
pub use types::{TransitionSubType, TransitionType};

/// A transition drawn by one fragment shader over a full-screen quad.
pub trait Transition2d: fmt::Debug {
    fn kind(&self) -> TransitionKind;

    fn fragment_shader(&self) -> SlideShowResult<String>;

    /// Uniforms beyond the two slide samplers and `time`.
    fn uniforms(&self) -> Vec<(&'static str, Uniform)> {
        Vec::new()
    }

    /// CPU equivalent of the fragment shader for one texel.
    fn blend(&self, uv: Vec2, time: f32, leaving: Vec4, entering: Vec4) -> Vec4;
}
