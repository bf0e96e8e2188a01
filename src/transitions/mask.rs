//! Mask transitions: a per-pixel distance decides when the entering slide takes over.
//!
//! Every mask is written twice, as a GLSL expression spliced into [`MASK_FUNCTION`] and as the
//! Rust function the CPU compositor uses. Both read `uv` with the origin in the top-left corner.

use std::f32::consts::{FRAC_PI_2, SQRT_2, TAU};

use glam::{Vec2, Vec4};

use crate::foundation::error::SlideShowResult;
use crate::foundation::math::{fract, mix4, step};
use crate::transitions::Transition2d;
use crate::transitions::kind::TransitionKind;
use crate::transitions::shader::{MASK_FRAGMENT, MASK_FUNCTION};
use crate::transitions::types::TransitionSubType as S;

const BLINDS: f32 = 6.0;
const CHECKERS: f32 = 8.0;
const RANDOM_BARS: f32 = 128.0;
const DISSOLVE_GRID: Vec2 = Vec2::new(64.0, 48.0);
const ELLIPSE_NORM: f32 = 1.118_034;

/// Same hash as `hash12` in the fragment template.
pub(crate) fn hash12(p: Vec2) -> f32 {
    fract((p.dot(Vec2::new(12.9898, 78.233))).sin() * 43758.5453)
}

/// A 2D transition driven by a distance field over the slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskTransition {
    kind: TransitionKind,
    subtype: S,
    forward: bool,
}

impl MaskTransition {
    pub fn new(kind: TransitionKind, subtype: S, forward: bool) -> Self {
        let subtype = if kind.supports(subtype) {
            subtype
        } else {
            kind.default_subtype()
        };
        Self {
            kind,
            subtype,
            forward,
        }
    }

    pub fn subtype(&self) -> S {
        self.subtype
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    fn blades(&self) -> (f32, f32) {
        match self.subtype {
            S::TwoBladeVertical => (2.0, 0.0),
            S::TwoBladeHorizontal => (2.0, FRAC_PI_2),
            S::ThreeBlade => (3.0, 0.0),
            S::FourBlade => (4.0, 0.0),
            S::EightBlade => (8.0, 0.0),
            _ => (1.0, 0.0),
        }
    }

    /// Distance of `uv` in `[0, 1]`; the entering slide shows once time passes it.
    pub fn distance(&self, uv: Vec2) -> f32 {
        let c = uv - Vec2::splat(0.5);
        match (self.kind, self.subtype) {
            (TransitionKind::Wipe, S::TopToBottom) => uv.y,
            (TransitionKind::Wipe, _) => uv.x,
            (TransitionKind::Box, S::TopLeft) => uv.x.max(uv.y),
            (TransitionKind::Box, S::TopRight) => (1.0 - uv.x).max(uv.y),
            (TransitionKind::Box, S::BottomLeft) => uv.x.max(1.0 - uv.y),
            (TransitionKind::Box, S::BottomRight) => (1.0 - uv.x).max(1.0 - uv.y),
            (TransitionKind::Box, _) => c.x.abs().max(c.y.abs()) * 2.0,
            (TransitionKind::Diamond, _) => c.x.abs() + c.y.abs(),
            (TransitionKind::Venetian, S::Vertical) => fract(uv.x * BLINDS),
            (TransitionKind::Venetian, _) => fract(uv.y * BLINDS),
            (TransitionKind::Checkers, sub) => {
                let cell = (uv * CHECKERS).floor();
                let parity = (cell.x + cell.y).rem_euclid(2.0);
                let along = if sub == S::Across { uv.x } else { uv.y };
                (fract(along * CHECKERS) + parity) * 0.5
            }
            (TransitionKind::Wheel, _) => {
                let (blades, offset) = self.blades();
                fract((c.x.atan2(-c.y) + offset) * blades / TAU)
            }
            (TransitionKind::Split, S::Horizontal) => c.y.abs() * 2.0,
            (TransitionKind::Split, _) => c.x.abs() * 2.0,
            (TransitionKind::Bars, S::Horizontal) => {
                hash12(Vec2::new((uv.y * RANDOM_BARS).floor(), 0.0))
            }
            (TransitionKind::Bars, _) => hash12(Vec2::new((uv.x * RANDOM_BARS).floor(), 0.0)),
            (TransitionKind::Oval, S::Horizontal) => {
                (c * Vec2::new(1.0, 2.0)).length() / ELLIPSE_NORM
            }
            (TransitionKind::Oval, S::Vertical) => {
                (c * Vec2::new(2.0, 1.0)).length() / ELLIPSE_NORM
            }
            (TransitionKind::Oval, _) => c.length() * SQRT_2,
            (TransitionKind::Plus, S::CornersOut) => 1.0 - c.x.abs().min(c.y.abs()) * 2.0,
            (TransitionKind::Plus, _) => c.x.abs().min(c.y.abs()) * 2.0,
            (TransitionKind::SimpleDissolve, _) => hash12((uv * DISSOLVE_GRID).floor()),
            (TransitionKind::Fan, S::CenterRight) => c.y.abs().atan2(1.0 - uv.x) / FRAC_PI_2,
            (TransitionKind::Fan, S::TopCenter) => fract(c.x.atan2(-c.y) / TAU),
            (TransitionKind::Fan, _) => c.x.abs().atan2(uv.y) / FRAC_PI_2,
            (TransitionKind::Waterfall, S::HorizontalRight) => (uv.y + 1.0 - uv.x) * 0.5,
            (TransitionKind::Waterfall, _) => (uv.y + uv.x) * 0.5,
            (kind, _) => {
                tracing::warn!(%kind, "not a mask transition");
                0.0
            }
        }
    }

    /// GLSL expression equal to [`MaskTransition::distance`].
    pub fn glsl_distance(&self) -> String {
        let c = "(uv - vec2(0.5))";
        match (self.kind, self.subtype) {
            (TransitionKind::Wipe, S::TopToBottom) => "uv.y".into(),
            (TransitionKind::Wipe, _) => "uv.x".into(),
            (TransitionKind::Box, S::TopLeft) => "max(uv.x, uv.y)".into(),
            (TransitionKind::Box, S::TopRight) => "max(1.0 - uv.x, uv.y)".into(),
            (TransitionKind::Box, S::BottomLeft) => "max(uv.x, 1.0 - uv.y)".into(),
            (TransitionKind::Box, S::BottomRight) => "max(1.0 - uv.x, 1.0 - uv.y)".into(),
            (TransitionKind::Box, _) => format!("max(abs({c}.x), abs({c}.y)) * 2.0"),
            (TransitionKind::Diamond, _) => format!("abs({c}.x) + abs({c}.y)"),
            (TransitionKind::Venetian, S::Vertical) => format!("fract(uv.x * {BLINDS:.1})"),
            (TransitionKind::Venetian, _) => format!("fract(uv.y * {BLINDS:.1})"),
            (TransitionKind::Checkers, sub) => {
                let along = if sub == S::Across { "uv.x" } else { "uv.y" };
                format!(
                    "(fract({along} * {CHECKERS:.1}) + mod(floor(uv.x * {CHECKERS:.1}) + floor(uv.y * {CHECKERS:.1}), 2.0)) * 0.5"
                )
            }
            (TransitionKind::Wheel, _) => {
                let (blades, offset) = self.blades();
                format!(
                    "fract((atan({c}.x, -{c}.y) + {offset:.8}) * {blades:.1} / {TAU:.8})"
                )
            }
            (TransitionKind::Split, S::Horizontal) => format!("abs({c}.y) * 2.0"),
            (TransitionKind::Split, _) => format!("abs({c}.x) * 2.0"),
            (TransitionKind::Bars, S::Horizontal) => {
                format!("hash12(vec2(floor(uv.y * {RANDOM_BARS:.1}), 0.0))")
            }
            (TransitionKind::Bars, _) => {
                format!("hash12(vec2(floor(uv.x * {RANDOM_BARS:.1}), 0.0))")
            }
            (TransitionKind::Oval, S::Horizontal) => {
                format!("length({c} * vec2(1.0, 2.0)) / {ELLIPSE_NORM:.6}")
            }
            (TransitionKind::Oval, S::Vertical) => {
                format!("length({c} * vec2(2.0, 1.0)) / {ELLIPSE_NORM:.6}")
            }
            (TransitionKind::Oval, _) => format!("length({c}) * {SQRT_2:.8}"),
            (TransitionKind::Plus, S::CornersOut) => {
                format!("1.0 - min(abs({c}.x), abs({c}.y)) * 2.0")
            }
            (TransitionKind::Plus, _) => format!("min(abs({c}.x), abs({c}.y)) * 2.0"),
            (TransitionKind::SimpleDissolve, _) => format!(
                "hash12(floor(uv * vec2({:.1}, {:.1})))",
                DISSOLVE_GRID.x, DISSOLVE_GRID.y
            ),
            (TransitionKind::Fan, S::CenterRight) => {
                format!("atan(abs({c}.y), 1.0 - uv.x) / {FRAC_PI_2:.8}")
            }
            (TransitionKind::Fan, S::TopCenter) => format!("fract(atan({c}.x, -{c}.y) / {TAU:.8})"),
            (TransitionKind::Fan, _) => format!("atan(abs({c}.x), uv.y) / {FRAC_PI_2:.8}"),
            (TransitionKind::Waterfall, S::HorizontalRight) => "(uv.y + 1.0 - uv.x) * 0.5".into(),
            (TransitionKind::Waterfall, _) => "(uv.y + uv.x) * 0.5".into(),
            _ => "0.0".into(),
        }
    }

    /// `1.0` where the entering slide shows at `time`.
    pub fn mask(&self, uv: Vec2, time: f32) -> f32 {
        let d = self.distance(uv);
        let edge = if self.forward { d } else { 1.0 - d };
        step(edge, time)
    }

    pub fn mask_function(&self) -> SlideShowResult<String> {
        let edge = if self.forward { "d" } else { "1.0 - d" };
        MASK_FUNCTION.render(&[("distance", &self.glsl_distance()), ("edge", edge)])
    }
}

impl Transition2d for MaskTransition {
    fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn fragment_shader(&self) -> SlideShowResult<String> {
        let mask = self.mask_function()?;
        MASK_FRAGMENT.render(&[("mask_function", &mask)])
    }

    fn blend(&self, uv: Vec2, time: f32, leaving: Vec4, entering: Vec4) -> Vec4 {
        mix4(leaving, entering, self.mask(uv, time))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/mask.rs"]
mod tests;
