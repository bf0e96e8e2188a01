use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec4;
use image::RgbaImage;

use crate::animation::color::RgbColor;
use crate::foundation::error::SlideShowResult;
use crate::transitions::Transition2d;
use crate::transitions::fade::FadeTransition;
use crate::transitions::info::{ReverseMethod, transition_info};
use crate::transitions::kind::{ResolvedTransition, TransitionKind};
use crate::transitions::mask::MaskTransition;
use crate::transitions::mesh::MeshTransition;
use crate::transitions::shader::{VERTEX_2D, VERTEX_3D};
use crate::transitions::slide_change::SlideChange;
use crate::transitions::types::{TransitionSubType, TransitionType};

/// What a slide asks for, plus the two slide bitmaps.
#[derive(Clone, Debug)]
pub struct TransitionParameters {
    pub transition_type: TransitionType,
    pub subtype: TransitionSubType,
    pub direction_forward: bool,
    pub fade_color: Vec4,
    pub leaving: Rc<RgbaImage>,
    pub entering: Rc<RgbaImage>,
}

impl TransitionParameters {
    pub fn new(
        transition_type: TransitionType,
        subtype: TransitionSubType,
        leaving: Rc<RgbaImage>,
        entering: Rc<RgbaImage>,
    ) -> Self {
        Self {
            transition_type,
            subtype,
            direction_forward: true,
            fade_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            leaving,
            entering,
        }
    }

    pub fn with_direction(mut self, forward: bool) -> Self {
        self.direction_forward = forward;
        self
    }

    pub fn with_fade_color(mut self, color: RgbColor) -> Self {
        self.fade_color = Vec4::new(color.r as f32, color.g as f32, color.b as f32, 1.0);
        self
    }

    /// Transitions whose reversal is a no-op always run forward.
    pub fn effective_direction(&self) -> bool {
        match transition_info(self.transition_type, self.subtype) {
            Some(info) if info.reverse_method == ReverseMethod::Ignore => true,
            _ => self.direction_forward,
        }
    }
}

#[derive(Debug)]
pub enum TransitionProgram {
    Flat(Box<dyn Transition2d>),
    Mesh(MeshTransition),
}

impl TransitionProgram {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Flat(t) => t.kind(),
            Self::Mesh(m) => m.kind(),
        }
    }

    pub fn is_3d(&self) -> bool {
        matches!(self, Self::Mesh(_))
    }

    pub fn vertex_shader(&self) -> &'static str {
        match self {
            Self::Flat(_) => VERTEX_2D,
            Self::Mesh(_) => VERTEX_3D,
        }
    }

    pub fn fragment_shader(&self) -> SlideShowResult<String> {
        match self {
            Self::Flat(t) => t.fragment_shader(),
            Self::Mesh(m) => m.fragment_shader(),
        }
    }
}

pub type TransitionConstructor = fn(&ResolvedTransition, &TransitionParameters) -> TransitionProgram;

fn fade(resolved: &ResolvedTransition, params: &TransitionParameters) -> TransitionProgram {
    TransitionProgram::Flat(Box::new(FadeTransition::new(resolved.subtype, params.fade_color)))
}

fn mask(resolved: &ResolvedTransition, params: &TransitionParameters) -> TransitionProgram {
    TransitionProgram::Flat(Box::new(MaskTransition::new(
        resolved.kind,
        resolved.subtype,
        params.effective_direction(),
    )))
}

fn mesh(resolved: &ResolvedTransition, _params: &TransitionParameters) -> TransitionProgram {
    TransitionProgram::Mesh(MeshTransition::build(resolved.kind, resolved.subtype, resolved.push))
}

/// Maps each [`TransitionKind`] to the constructor of its program.
#[derive(Clone, Default)]
pub struct TransitionRegistry {
    constructors: HashMap<TransitionKind, TransitionConstructor>,
}

impl fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.constructors.keys().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("TransitionRegistry").field("kinds", &kinds).finish()
    }
}

impl TransitionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        for kind in TransitionKind::ALL {
            let constructor: TransitionConstructor = match kind {
                TransitionKind::Fade => fade,
                k if k.is_3d() => mesh,
                _ => mask,
            };
            registry.register(kind, constructor);
        }
        registry
    }

    /// Install `constructor` for `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: TransitionKind,
        constructor: TransitionConstructor,
    ) -> Option<TransitionConstructor> {
        self.constructors.insert(kind, constructor)
    }

    pub fn contains(&self, kind: TransitionKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn program(&self, params: &TransitionParameters) -> Option<(ResolvedTransition, TransitionProgram)> {
        let resolved = TransitionKind::resolve(params.transition_type, params.subtype)?;
        let Some(constructor) = self.constructors.get(&resolved.kind) else {
            tracing::warn!(kind = %resolved.kind, "no constructor registered for transition");
            return None;
        };
        Some((resolved, constructor(&resolved, params)))
    }

    /// Build the slide change for `params`, `None` when the transition is unknown.
    pub fn create(&self, params: &TransitionParameters) -> Option<SlideChange> {
        let (resolved, program) = self.program(params)?;
        tracing::debug!(
            kind = %resolved.kind,
            subtype = %resolved.subtype,
            "created slide change"
        );
        Some(SlideChange::new(
            program,
            params.leaving.clone(),
            params.entering.clone(),
            resolved.mipmaps,
        ))
    }
}
