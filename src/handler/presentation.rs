//! Presentation metadata and navigation over its slides.

use std::collections::BTreeMap;

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::color::{RgbColor, parse_color};
use crate::animation::element::AnimatedShapeInfo;
use crate::animation::node_info::AnimationNodeInfo;
use crate::animation::slide::SlideAnimations;
use crate::foundation::config::EngineConfig;
use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::transitions::types::{TransitionSubType, TransitionType};

/// Per-slide metadata from the document layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideInfo {
    pub hash: String,
    pub index: usize,
    pub hidden: bool,
    pub transition_type: Option<String>,
    pub transition_subtype: Option<String>,
    pub transition_direction: bool,
    pub transition_fade_color: Option<String>,
    /// Milliseconds.
    pub transition_duration: Option<f64>,
    /// Milliseconds before advancing on its own once all effects ran; `0` waits for the user.
    pub next_slide_duration: Option<f64>,
    pub animations: Option<AnimationNodeInfo>,
    /// Layer state of the animated shapes, keyed by element id.
    pub shapes: BTreeMap<String, AnimatedShapeInfo>,
}

impl Default for SlideInfo {
    fn default() -> Self {
        Self {
            hash: String::new(),
            index: 0,
            hidden: false,
            transition_type: None,
            transition_subtype: None,
            transition_direction: true,
            transition_fade_color: None,
            transition_duration: None,
            next_slide_duration: None,
            animations: None,
            shapes: BTreeMap::new(),
        }
    }
}

impl SlideInfo {
    /// The slide transition, `None` when the slide has none or names an unknown type.
    pub fn transition(&self) -> Option<(TransitionType, TransitionSubType)> {
        let name = self.transition_type.as_deref()?;
        let Some(ty) = TransitionType::parse(name) else {
            tracing::warn!(transition = name, "unknown slide transition type");
            return None;
        };
        if ty == TransitionType::Invalid {
            return None;
        }
        let subtype = self
            .transition_subtype
            .as_deref()
            .and_then(TransitionSubType::parse)
            .unwrap_or(TransitionSubType::Default);
        Some((ty, subtype))
    }

    pub fn fade_color(&self) -> RgbColor {
        self.transition_fade_color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(RgbColor::BLACK)
    }

    /// Transition length in seconds, `fallback` when absent or not positive.
    pub fn transition_seconds(&self, fallback: f64) -> f64 {
        match self.transition_duration {
            Some(ms) if ms > 0.0 => ms / 1000.0,
            _ => fallback,
        }
    }

    pub fn auto_advance_seconds(&self) -> Option<f64> {
        match self.next_slide_duration {
            Some(ms) if ms > 0.0 => Some(ms / 1000.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PresentationInfo {
    pub slides: Vec<SlideInfo>,
    pub width: u32,
    pub height: u32,
}

impl PresentationInfo {
    pub fn from_json(json: &str) -> SlideShowResult<Self> {
        let info: Self = serde_json::from_str(json)?;
        if info.width == 0 || info.height == 0 {
            return Err(SlideShowError::validation(
                "presentation width and height must be non-zero",
            ));
        }
        Ok(info)
    }

    pub fn slide_hash(&self, index: usize) -> Option<&str> {
        self.slides.get(index).map(|s| s.hash.as_str())
    }
}

/// A slide together with the animations imported from it.
#[derive(Debug)]
pub struct MetaSlide {
    pub info: SlideInfo,
    pub animations: SlideAnimations,
}

impl MetaSlide {
    pub fn new(index: usize, info: SlideInfo, slide_size: Vec2, config: &EngineConfig) -> Self {
        let mut animations = SlideAnimations::new();
        if let Some(root) = info.animations.as_ref() {
            animations.import(index, root, slide_size, config);
        }
        Self { info, animations }
    }

    pub fn is_animated(&self) -> bool {
        self.animations.is_animated()
    }
}

/// The slides of a running show and the one on screen.
#[derive(Debug)]
pub struct MetaPresentation {
    width: u32,
    height: u32,
    slides: Vec<MetaSlide>,
    current: Option<usize>,
}

impl MetaPresentation {
    pub fn new(info: PresentationInfo, config: &EngineConfig) -> SlideShowResult<Self> {
        if info.width == 0 || info.height == 0 {
            return Err(SlideShowError::validation(
                "presentation width and height must be non-zero",
            ));
        }
        if info.slides.is_empty() {
            return Err(SlideShowError::validation("presentation has no slides"));
        }
        let slide_size = Vec2::new(f64::from(info.width), f64::from(info.height));
        let slides = info
            .slides
            .into_iter()
            .enumerate()
            .map(|(index, slide)| MetaSlide::new(index, slide, slide_size, config))
            .collect();
        Ok(Self {
            width: info.width,
            height: info.height,
            slides,
            current: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn slide_size(&self) -> Vec2 {
        Vec2::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Option<&MetaSlide> {
        self.slides.get(index)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut MetaSlide> {
        self.slides.get_mut(index)
    }

    pub fn slides(&self) -> &[MetaSlide] {
        &self.slides
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_slide(&self) -> Option<&MetaSlide> {
        self.current.and_then(|i| self.slides.get(i))
    }

    /// Make `index` the current slide and return the previous one.
    pub fn go_to(&mut self, index: usize) -> SlideShowResult<Option<usize>> {
        if index >= self.slides.len() {
            return Err(SlideShowError::validation(format!(
                "slide {index} out of range ({} slides)",
                self.slides.len()
            )));
        }
        Ok(self.current.replace(index))
    }

    /// First slide that is not hidden.
    pub fn first_slide(&self) -> Option<usize> {
        self.slides.iter().position(|s| !s.info.hidden)
    }

    /// The visible slide after the current one.
    pub fn next_slide(&self) -> Option<usize> {
        match self.current {
            Some(current) => self.visible_after(current),
            None => self.first_slide(),
        }
    }

    /// The visible slide before the current one.
    pub fn previous_slide(&self) -> Option<usize> {
        let current = self.current?;
        (0..current).rev().find(|&i| !self.slides[i].info.hidden)
    }

    /// True when no visible slide follows `index`.
    pub fn is_last_slide(&self, index: usize) -> bool {
        self.visible_after(index).is_none()
    }

    fn visible_after(&self, index: usize) -> Option<usize> {
        (index + 1..self.slides.len()).find(|&i| !self.slides[i].info.hidden)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handler/presentation.rs"]
mod tests;
