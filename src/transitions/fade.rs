use glam::{Vec2, Vec4};

use crate::foundation::error::SlideShowResult;
use crate::foundation::math::mix4;
use crate::render::backend::Uniform;
use crate::transitions::Transition2d;
use crate::transitions::kind::TransitionKind;
use crate::transitions::shader::{CROSS_FADE_BLEND, FADE_FRAGMENT, FADE_OVER_COLOR_BLEND};
use crate::transitions::types::TransitionSubType;

/// Cross fade, or fade through a solid color for the color subtypes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTransition {
    over_color: bool,
    color: Vec4,
}

impl FadeTransition {
    pub fn new(subtype: TransitionSubType, color: Vec4) -> Self {
        let over_color = matches!(
            subtype,
            TransitionSubType::FadeOverColor
                | TransitionSubType::FadeToColor
                | TransitionSubType::FadeFromColor
        );
        Self { over_color, color }
    }

    pub fn cross_fade() -> Self {
        Self::new(TransitionSubType::CrossFade, Vec4::new(0.0, 0.0, 0.0, 1.0))
    }

    pub fn is_over_color(&self) -> bool {
        self.over_color
    }
}

impl Transition2d for FadeTransition {
    fn kind(&self) -> TransitionKind {
        TransitionKind::Fade
    }

    fn fragment_shader(&self) -> SlideShowResult<String> {
        let blend = if self.over_color {
            FADE_OVER_COLOR_BLEND
        } else {
            CROSS_FADE_BLEND
        };
        FADE_FRAGMENT.render(&[("blend", blend)])
    }

    fn uniforms(&self) -> Vec<(&'static str, Uniform)> {
        vec![("fadeColor", Uniform::Vec4(self.color))]
    }

    fn blend(&self, _uv: Vec2, time: f32, leaving: Vec4, entering: Vec4) -> Vec4 {
        if !self.over_color {
            return mix4(leaving, entering, time);
        }
        if time < 0.5 {
            mix4(leaving, self.color, time * 2.0)
        } else {
            mix4(self.color, entering, (time - 0.5) * 2.0)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/fade.rs"]
mod tests;
