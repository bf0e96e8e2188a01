use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::animation::color::{AnimColor, RgbColor, parse_color};
use crate::animation::node_info::AdditiveMode;
use crate::animation::property::AnimatedProperty;
use crate::animation::value::AnimValue;
use crate::foundation::ids::NodeId;

/// Bounding box of a shape in slide coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsInfo {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundsInfo {
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Layer metadata for one animated shape, delivered with the slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatedShapeInfo {
    pub bounds: BoundsInfo,
    #[serde(default)]
    pub init_visible: bool,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub line_color: Option<String>,
    #[serde(default)]
    pub font_color: Option<String>,
}

/// Colors the renderer should substitute when drawing the shape bitmap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorMap {
    pub from_fill: Option<RgbColor>,
    pub to_fill: Option<RgbColor>,
    pub from_line: Option<RgbColor>,
    pub to_line: Option<RgbColor>,
}

/// What a layer renderer needs to draw the element this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProperties {
    /// Corners (bottom-left, bottom-right, top-left, top-right) divided by the slide size.
    pub bounds: [Point; 4],
    pub alpha: f64,
    pub color_map: ColorMap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ElementState {
    center: Point,
    scale: Vec2,
    rotation: f64,
    skew_x: f64,
    skew_y: f64,
    transform: Affine,
    opacity: f64,
    fill_color: RgbColor,
    line_color: RgbColor,
    font_color: RgbColor,
    visible: bool,
}

const MIN_SCALE: f64 = 1e-5;
const DUMMY_BBOX: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

/// Shared handle to an element; activities, animations and nodes all mutate the same shape.
pub type ElementRef = Rc<RefCell<AnimatedElement>>;

/// Animated state of one shape on a slide.
///
/// Positions are in slide units; the property accessors normalise them to the slide size the way
/// animation values are written.
#[derive(Debug)]
pub struct AnimatedElement {
    id: String,
    slide_size: Vec2,
    is_text: bool,
    shape: Option<AnimatedShapeInfo>,
    base_bbox: Rect,
    base_fill_color: RgbColor,
    base_line_color: RgbColor,
    base_font_color: RgbColor,
    additive: AdditiveMode,
    current: ElementState,
    state_set: HashMap<NodeId, ElementState>,
    state_on_next_effect: HashMap<usize, ElementState>,
    active_nodes: BTreeMap<usize, BTreeSet<NodeId>>,
    current_effect: Option<usize>,
    running_animations: u32,
}

impl AnimatedElement {
    pub fn new(id: impl Into<String>, slide_width: f64, slide_height: f64) -> Self {
        let base_bbox = DUMMY_BBOX;
        Self {
            id: id.into(),
            slide_size: Vec2::new(slide_width, slide_height),
            is_text: false,
            shape: None,
            base_bbox,
            base_fill_color: RgbColor::BLACK,
            base_line_color: RgbColor::BLACK,
            base_font_color: RgbColor::BLACK,
            additive: AdditiveMode::Replace,
            current: ElementState {
                center: base_bbox.center(),
                scale: Vec2::new(1.0, 1.0),
                rotation: 0.0,
                skew_x: 0.0,
                skew_y: 0.0,
                transform: Affine::IDENTITY,
                opacity: 1.0,
                fill_color: RgbColor::BLACK,
                line_color: RgbColor::BLACK,
                font_color: RgbColor::BLACK,
                visible: false,
            },
            state_set: HashMap::new(),
            state_on_next_effect: HashMap::new(),
            active_nodes: BTreeMap::new(),
            current_effect: None,
            running_animations: 0,
        }
    }

    pub fn into_ref(self) -> ElementRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_valid(&self) -> bool {
        self.shape.is_some()
    }

    pub fn is_text(&self) -> bool {
        self.is_text
    }

    pub fn set_text(&mut self, is_text: bool) {
        self.is_text = is_text;
    }

    pub fn slide_size(&self) -> Vec2 {
        self.slide_size
    }

    pub fn base_bbox(&self) -> Rect {
        self.base_bbox
    }

    pub fn base_center(&self) -> Point {
        self.base_bbox.center()
    }

    pub fn additive_mode(&self) -> AdditiveMode {
        self.additive
    }

    pub fn set_additive_mode(&mut self, mode: AdditiveMode) {
        self.additive = mode;
    }

    /// Take the shape's layer metadata; a missing entry leaves a full-HD placeholder box.
    pub fn update_shape_info(&mut self, info: Option<&AnimatedShapeInfo>) {
        let Some(info) = info else {
            tracing::warn!(element = %self.id, "no layer info for animated element");
            self.base_bbox = DUMMY_BBOX;
            self.shape = None;
            return;
        };
        self.base_bbox = info.bounds.to_rect();
        let color = |s: &Option<String>| s.as_deref().and_then(parse_color);
        if let Some(c) = color(&info.fill_color) {
            self.base_fill_color = c;
        }
        if let Some(c) = color(&info.line_color) {
            self.base_line_color = c;
        }
        if let Some(c) = color(&info.font_color) {
            self.base_font_color = c;
        }
        self.shape = Some(info.clone());
    }

    pub fn notify_slide_start(&mut self, info: Option<&AnimatedShapeInfo>) {
        self.running_animations = 0;
        self.active_nodes.clear();
        self.current_effect = None;
        self.state_on_next_effect.clear();
        self.update_shape_info(info);
        self.reset_properties();
        tracing::debug!(element = %self.id, "slide start");
    }

    pub fn notify_slide_end(&mut self) {
        self.running_animations = 0;
    }

    fn reset_properties(&mut self) {
        self.current = ElementState {
            center: self.base_center(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            transform: Affine::IDENTITY,
            opacity: 1.0,
            fill_color: self.base_fill_color,
            line_color: self.base_line_color,
            font_color: self.base_font_color,
            visible: self.shape.as_ref().is_some_and(|s| s.init_visible),
        };
    }

    pub fn notify_animation_start(&mut self) {
        self.running_animations += 1;
    }

    pub fn notify_animation_end(&mut self) {
        if self.running_animations == 0 {
            tracing::warn!(element = %self.id, "animation end without a running animation");
            return;
        }
        self.running_animations -= 1;
    }

    pub fn is_active(&self) -> bool {
        self.running_animations > 0
    }

    pub fn running_animations(&self) -> u32 {
        self.running_animations
    }

    pub fn notify_next_effect_start(&mut self, effect: usize) {
        self.current_effect = Some(effect);
        self.active_nodes.insert(effect, BTreeSet::new());
    }

    /// Remember the current state under `node`. The first node saved for the current effect also
    /// records the state the effect started from.
    pub fn save_state(&mut self, node: NodeId) {
        tracing::trace!(element = %self.id, %node, "save state");
        self.state_set.insert(node, self.current);

        let Some(effect) = self.current_effect else {
            tracing::debug!(element = %self.id, %node, "save state outside of an effect");
            return;
        };
        match self.active_nodes.get_mut(&effect) {
            Some(nodes) => {
                nodes.insert(node);
                if nodes.len() == 1 {
                    self.state_on_next_effect.insert(effect, self.current);
                }
            }
            None => {
                tracing::debug!(element = %self.id, %node, effect, "current effect not found");
            }
        }
    }

    /// Go back to the state saved for `node`; when that empties its effect, go back to the state
    /// the whole effect started from. Returns `false` if nothing was saved.
    pub fn restore_state(&mut self, node: NodeId) -> bool {
        let Some(mut state) = self.state_set.remove(&node) else {
            tracing::debug!(element = %self.id, %node, "no saved state to restore");
            return false;
        };

        let mut emptied = None;
        for (effect, nodes) in self.active_nodes.iter_mut() {
            if nodes.remove(&node) {
                if nodes.is_empty() {
                    emptied = Some(*effect);
                }
                break;
            }
        }
        if let Some(effect) = emptied {
            self.active_nodes.remove(&effect);
            if let Some(effect_state) = self.state_on_next_effect.remove(&effect) {
                state = effect_state;
            }
        }

        self.current = state;
        tracing::trace!(element = %self.id, %node, "state restored");
        self.notify_animation_start();
        self.notify_animation_end();
        true
    }

    fn update_transform(&mut self) {
        let s = &self.current;
        let base = self.base_center();
        let transform = Affine::translate(s.center.to_vec2())
            * Affine::rotate(s.rotation.to_radians())
            * Affine::scale_non_uniform(s.scale.x, s.scale.y)
            * Affine::skew(0.0, s.skew_y)
            * Affine::skew(s.skew_x, 0.0)
            * Affine::translate(-base.to_vec2());
        self.current.transform = transform;
    }

    pub fn transform(&self) -> Affine {
        self.current.transform
    }

    pub fn x(&self) -> f64 {
        self.current.center.x
    }

    pub fn y(&self) -> f64 {
        self.current.center.y
    }

    pub fn pos(&self) -> Point {
        self.current.center
    }

    pub fn width(&self) -> f64 {
        self.current.scale.x * self.base_bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.current.scale.y * self.base_bbox.height()
    }

    pub fn set_x(&mut self, x: f64) {
        if x != self.current.center.x {
            self.current.center.x = x;
            self.update_transform();
        }
    }

    pub fn set_y(&mut self, y: f64) {
        if y != self.current.center.y {
            self.current.center.y = y;
            self.update_transform();
        }
    }

    pub fn set_pos(&mut self, pos: Point) {
        if pos != self.current.center {
            self.current.center = pos;
            self.update_transform();
        }
    }

    pub fn set_width(&mut self, width: f64) {
        let sx = clamp_scale(width / self.base_bbox.width());
        if sx != self.current.scale.x {
            self.current.scale.x = sx;
            self.update_transform();
        }
    }

    pub fn set_height(&mut self, height: f64) {
        let sy = clamp_scale(height / self.base_bbox.height());
        if sy != self.current.scale.y {
            self.current.scale.y = sy;
            self.update_transform();
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        let scale = Vec2::new(
            clamp_scale(width / self.base_bbox.width()),
            clamp_scale(height / self.base_bbox.height()),
        );
        if scale != self.current.scale {
            self.current.scale = scale;
            self.update_transform();
        }
    }

    pub fn opacity(&self) -> f64 {
        self.current.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.current.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn rotation(&self) -> f64 {
        self.current.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees != self.current.rotation {
            self.current.rotation = degrees;
            self.update_transform();
        }
    }

    pub fn set_skew_x(&mut self, skew: f64) {
        if skew != self.current.skew_x {
            self.current.skew_x = skew;
            self.update_transform();
        }
    }

    pub fn set_skew_y(&mut self, skew: f64) {
        if skew != self.current.skew_y {
            self.current.skew_y = skew;
            self.update_transform();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.current.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.current.visible = visible;
    }

    pub fn fill_color(&self) -> RgbColor {
        self.current.fill_color
    }

    pub fn line_color(&self) -> RgbColor {
        self.current.line_color
    }

    pub fn font_color(&self) -> RgbColor {
        self.current.font_color
    }

    /// Dimming recolors fill, line and text alike.
    pub fn set_dim_color(&mut self, color: RgbColor) {
        self.current.fill_color = color;
        self.current.line_color = color;
        self.current.font_color = color;
    }

    /// Read a property in animation units.
    pub fn property(&self, property: AnimatedProperty) -> AnimValue {
        let size = self.slide_size;
        let color = |c: RgbColor| AnimValue::Color(AnimColor::Rgb(c));
        match property {
            AnimatedProperty::X => AnimValue::Number(self.x() / size.x),
            AnimatedProperty::Y => AnimValue::Number(self.y() / size.y),
            AnimatedProperty::Width => AnimValue::Number(self.width() / size.x),
            AnimatedProperty::Height => AnimValue::Number(self.height() / size.y),
            AnimatedProperty::Opacity => AnimValue::Number(self.current.opacity),
            AnimatedProperty::Rotate => AnimValue::Number(self.current.rotation),
            AnimatedProperty::SkewX => AnimValue::Number(self.current.skew_x),
            AnimatedProperty::SkewY => AnimValue::Number(self.current.skew_y),
            AnimatedProperty::Scale => AnimValue::Tuple([
                self.width() / self.base_bbox.width(),
                self.height() / self.base_bbox.height(),
            ]),
            AnimatedProperty::Translate => {
                AnimValue::Tuple([self.x() / size.x, self.y() / size.y])
            }
            AnimatedProperty::Visibility => AnimValue::Enum(
                if self.current.visible { "visible" } else { "hidden" }.to_owned(),
            ),
            AnimatedProperty::FillColor => color(self.current.fill_color),
            AnimatedProperty::LineColor => color(self.current.line_color),
            AnimatedProperty::CharColor => color(self.current.font_color),
            AnimatedProperty::DimColor => color(self.current.fill_color),
            AnimatedProperty::FillStyle | AnimatedProperty::LineStyle => {
                AnimValue::String("solid".to_owned())
            }
        }
    }

    /// Write a property given in animation units. Values of the wrong type are ignored.
    pub fn set_property(&mut self, property: AnimatedProperty, value: &AnimValue) {
        let size = self.slide_size;
        match (property, value) {
            (AnimatedProperty::X, AnimValue::Number(v)) => self.set_x(v * size.x),
            (AnimatedProperty::Y, AnimValue::Number(v)) => self.set_y(v * size.y),
            (AnimatedProperty::Width, AnimValue::Number(v)) => self.set_width(v * size.x),
            (AnimatedProperty::Height, AnimValue::Number(v)) => self.set_height(v * size.y),
            (AnimatedProperty::Opacity, AnimValue::Number(v)) => self.set_opacity(*v),
            (AnimatedProperty::Rotate, AnimValue::Number(v)) => self.set_rotation(*v),
            (AnimatedProperty::SkewX, AnimValue::Number(v)) => self.set_skew_x(*v),
            (AnimatedProperty::SkewY, AnimValue::Number(v)) => self.set_skew_y(*v),
            (AnimatedProperty::Scale, AnimValue::Tuple([sx, sy])) => self.set_size(
                sx * self.base_bbox.width(),
                sy * self.base_bbox.height(),
            ),
            (AnimatedProperty::Translate, AnimValue::Tuple([x, y])) => {
                self.set_pos(Point::new(x * size.x, y * size.y));
            }
            (AnimatedProperty::Visibility, AnimValue::Enum(v) | AnimValue::String(v)) => {
                self.set_visible(v == "visible");
            }
            (AnimatedProperty::FillColor, AnimValue::Color(c)) => {
                self.current.fill_color = c.to_rgb();
            }
            (AnimatedProperty::LineColor, AnimValue::Color(c)) => {
                self.current.line_color = c.to_rgb();
            }
            (AnimatedProperty::CharColor, AnimValue::Color(c)) => {
                self.current.font_color = c.to_rgb();
            }
            (AnimatedProperty::DimColor, AnimValue::Color(c)) => self.set_dim_color(c.to_rgb()),
            (AnimatedProperty::FillStyle | AnimatedProperty::LineStyle, _) => {
                tracing::debug!(element = %self.id, %property, "style animation not implemented");
            }
            _ => {
                tracing::warn!(element = %self.id, %property, ?value, "value type does not match property");
            }
        }
    }

    pub fn render_properties(&self) -> RenderProperties {
        let b = self.base_bbox;
        let t = self.current.transform;
        let unit = |p: Point| {
            let q = t * p;
            Point::new(q.x / self.slide_size.x, q.y / self.slide_size.y)
        };
        let bounds = [
            unit(Point::new(b.x0, b.y1)),
            unit(Point::new(b.x1, b.y1)),
            unit(Point::new(b.x0, b.y0)),
            unit(Point::new(b.x1, b.y0)),
        ];

        let s = &self.current;
        let mut color_map = ColorMap::default();
        if self.is_text {
            if s.font_color != self.base_font_color {
                color_map.from_fill = Some(self.base_font_color);
                color_map.to_fill = Some(s.font_color);
            }
        } else if s.fill_color != self.base_fill_color || s.line_color != self.base_line_color {
            color_map = ColorMap {
                from_fill: Some(self.base_fill_color),
                to_fill: Some(s.fill_color),
                from_line: Some(self.base_line_color),
                to_line: Some(s.line_color),
            };
        }

        RenderProperties {
            bounds,
            alpha: s.opacity,
            color_map,
        }
    }
}

fn clamp_scale(s: f64) -> f64 {
    if s.abs() < MIN_SCALE {
        MIN_SCALE.copysign(s)
    } else {
        s
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/element.rs"]
mod tests;
