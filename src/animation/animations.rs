//! Animations: the objects an activity pushes its computed values into.

use std::fmt;

use kurbo::{BezPath, ParamCurve, ParamCurveArclen, PathSeg, Point};

use crate::animation::element::ElementRef;
use crate::animation::property::AnimatedProperty;
use crate::animation::value::AnimValue;
use crate::foundation::error::{SlideShowError, SlideShowResult};

const ARCLEN_ACCURACY: f64 = 1e-6;

pub trait Animation: fmt::Debug {
    /// Begin driving `target` (or the animation's own target when `None`).
    fn start(&mut self, target: Option<&ElementRef>);

    fn perform(&mut self, value: &AnimValue);

    fn end(&mut self);

    /// Current value of the animated attribute, in animation units.
    fn underlying_value(&self) -> Option<AnimValue>;
}

/// Tracks the running-animation counter on an element so start/end stay balanced.
#[derive(Debug, Default)]
struct Attachment {
    element: Option<ElementRef>,
    started: bool,
}

impl Attachment {
    fn new(element: Option<ElementRef>) -> Self {
        Self {
            element,
            started: false,
        }
    }

    fn start(&mut self, target: Option<&ElementRef>, what: &str) {
        if let Some(target) = target {
            self.element = Some(target.clone());
        }
        let Some(element) = &self.element else {
            tracing::error!(animation = what, "animation started without a target element");
            return;
        };
        if !self.started {
            element.borrow_mut().notify_animation_start();
            self.started = true;
        }
    }

    fn end(&mut self) {
        if self.started {
            self.started = false;
            if let Some(element) = &self.element {
                element.borrow_mut().notify_animation_end();
            }
        }
    }
}

/// Drives one attribute of an element through its property accessors.
pub struct PropertyAnimation {
    property: AnimatedProperty,
    attachment: Attachment,
}

impl PropertyAnimation {
    pub fn new(property: AnimatedProperty, element: ElementRef) -> Self {
        Self {
            property,
            attachment: Attachment::new(Some(element)),
        }
    }

    pub fn property(&self) -> AnimatedProperty {
        self.property
    }
}

impl fmt::Debug for PropertyAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = self
            .attachment
            .element
            .as_ref()
            .map(|e| e.borrow().id().to_owned());
        f.debug_struct("PropertyAnimation")
            .field("property", &self.property)
            .field("element", &element)
            .field("started", &self.attachment.started)
            .finish()
    }
}

impl Animation for PropertyAnimation {
    fn start(&mut self, target: Option<&ElementRef>) {
        self.attachment.start(target, self.property.name());
    }

    fn perform(&mut self, value: &AnimValue) {
        if let Some(element) = &self.attachment.element {
            element.borrow_mut().set_property(self.property, value);
        }
    }

    fn end(&mut self) {
        self.attachment.end();
    }

    fn underlying_value(&self) -> Option<AnimValue> {
        let element = self.attachment.element.as_ref()?;
        Some(element.borrow().property(self.property))
    }
}

/// Moves the element centre along an SVG path at constant speed.
///
/// Path coordinates are fractions of the slide size, relative to the element's base centre.
pub struct PathAnimation {
    segments: Vec<PathSeg>,
    lengths: Vec<f64>,
    total_length: f64,
    attachment: Attachment,
}

impl PathAnimation {
    pub fn new(path: &str, element: ElementRef) -> SlideShowResult<Self> {
        let bez = BezPath::from_svg(path)
            .map_err(|e| SlideShowError::animation(format!("invalid motion path {path:?}: {e}")))?;
        let segments: Vec<PathSeg> = bez.segments().collect();
        if segments.is_empty() {
            return Err(SlideShowError::animation(format!(
                "motion path {path:?} has no segments"
            )));
        }
        let lengths: Vec<f64> = segments
            .iter()
            .map(|s| s.arclen(ARCLEN_ACCURACY))
            .collect();
        let total_length = lengths.iter().sum();
        Ok(Self {
            segments,
            lengths,
            total_length,
            attachment: Attachment::new(Some(element)),
        })
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Point at fraction `t` of the path's arc length.
    pub fn point_at(&self, t: f64) -> Point {
        let mut remaining = t.clamp(0.0, 1.0) * self.total_length;
        for (seg, len) in self.segments.iter().zip(&self.lengths) {
            if remaining <= *len || *len <= 0.0 && remaining <= 0.0 {
                let param = if *len > 0.0 {
                    seg.inv_arclen(remaining, ARCLEN_ACCURACY)
                } else {
                    0.0
                };
                return seg.eval(param);
            }
            remaining -= len;
        }
        self.segments
            .last()
            .map(|s| s.eval(1.0))
            .unwrap_or(Point::ZERO)
    }
}

impl fmt::Debug for PathAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathAnimation")
            .field("segments", &self.segments.len())
            .field("total_length", &self.total_length)
            .finish()
    }
}

impl Animation for PathAnimation {
    fn start(&mut self, target: Option<&ElementRef>) {
        self.attachment.start(target, "motion path");
    }

    fn perform(&mut self, value: &AnimValue) {
        let Some(t) = value.as_number() else {
            tracing::warn!(?value, "motion path driven with a non numeric value");
            return;
        };
        let Some(element) = &self.attachment.element else {
            return;
        };
        let offset = self.point_at(t);
        let mut element = element.borrow_mut();
        let base = element.base_center();
        let size = element.slide_size();
        element.set_pos(Point::new(
            base.x + offset.x * size.x,
            base.y + offset.y * size.y,
        ));
    }

    fn end(&mut self) {
        self.attachment.end();
    }

    fn underlying_value(&self) -> Option<AnimValue> {
        Some(AnimValue::Number(0.0))
    }
}

/// Shape clip-polygon transitions. These are recognised but not rendered; calls are logged.
#[derive(Debug)]
pub struct ClippingAnimation {
    description: String,
}

impl ClippingAnimation {
    pub fn new(description: impl Into<String>) -> Self {
        let description = description.into();
        tracing::debug!(%description, "clipping animation created");
        Self { description }
    }
}

impl Animation for ClippingAnimation {
    fn start(&mut self, target: Option<&ElementRef>) {
        let id = target.map(|t| t.borrow().id().to_owned());
        tracing::debug!(description = %self.description, element = ?id, "clipping animation start");
    }

    fn perform(&mut self, value: &AnimValue) {
        tracing::trace!(description = %self.description, ?value, "clipping animation perform");
    }

    fn end(&mut self) {
        tracing::debug!(description = %self.description, "clipping animation end");
    }

    fn underlying_value(&self) -> Option<AnimValue> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animations.rs"]
mod tests;
