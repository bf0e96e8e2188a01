//! 2D layer drawing: animated shapes composited over their slide background on the CPU.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec4;
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect};

use crate::animation::element::{AnimatedElement, ColorMap, ElementRef};
use crate::compositor::SlideCompositor;
use crate::render::cpu::{from_vec4, to_vec4};

/// Bitmap of one animated shape, drawn at the element's current transform.
#[derive(Debug, Clone)]
pub struct ShapeLayer {
    pub element: ElementRef,
    /// Shape pixels covering the element's base bounding box.
    pub bitmap: Rc<RgbaImage>,
}

/// Draws the animated shapes of a slide on top of the slide bitmap another compositor supplies.
///
/// Layers are painted in insertion order, so later shapes sit above earlier ones.
pub struct LayerCompositor {
    backgrounds: Box<dyn SlideCompositor>,
    layers: BTreeMap<usize, Vec<ShapeLayer>>,
}

impl fmt::Debug for LayerCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerCompositor")
            .field("backgrounds", &self.backgrounds)
            .field("slides_with_layers", &self.layers.len())
            .finish()
    }
}

impl LayerCompositor {
    pub fn new(backgrounds: Box<dyn SlideCompositor>) -> Self {
        Self {
            backgrounds,
            layers: BTreeMap::new(),
        }
    }

    pub fn add_layer(&mut self, slide: usize, element: ElementRef, bitmap: Rc<RgbaImage>) {
        self.layers
            .entry(slide)
            .or_default()
            .push(ShapeLayer { element, bitmap });
    }

    pub fn layer_count(&self, slide: usize) -> usize {
        self.layers.get(&slide).map_or(0, Vec::len)
    }

    pub fn clear_layers(&mut self, slide: usize) {
        self.layers.remove(&slide);
    }

    /// The slide background with every visible layer painted over it.
    pub fn compose(&mut self, slide: usize) -> Option<RgbaImage> {
        let background = self.backgrounds.get_slide(slide)?;
        let mut frame = (*background).clone();
        for layer in self.layers.get(&slide).into_iter().flatten() {
            draw_layer(&mut frame, &layer.element.borrow(), &layer.bitmap);
        }
        Some(frame)
    }
}

impl SlideCompositor for LayerCompositor {
    fn get_slide(&mut self, slide: usize) -> Option<Rc<RgbaImage>> {
        if self.layer_count(slide) == 0 {
            return self.backgrounds.get_slide(slide);
        }
        self.compose(slide).map(Rc::new)
    }
}

/// Paint `bitmap` where `element` currently sits on `target`.
///
/// Every target pixel inside the transformed bounding box is mapped back into the shape's base box
/// and samples the nearest bitmap pixel. Hidden or fully transparent elements draw nothing.
pub fn draw_layer(target: &mut RgbaImage, element: &AnimatedElement, bitmap: &RgbaImage) {
    let alpha = element.opacity().clamp(0.0, 1.0);
    if !element.is_visible() || alpha <= 0.0 {
        return;
    }
    let (bw, bh) = bitmap.dimensions();
    let bbox = element.base_bbox();
    if bw == 0 || bh == 0 || bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return;
    }
    let transform = element.transform();
    if transform.determinant().abs() < f64::EPSILON {
        return;
    }
    let inverse = transform.inverse();

    let (tw, th) = target.dimensions();
    let slide = element.slide_size();
    let (sx, sy) = (slide.x / f64::from(tw), slide.y / f64::from(th));

    // destination pixels the transformed box can touch
    let corners = [
        Point::new(bbox.x0, bbox.y0),
        Point::new(bbox.x1, bbox.y0),
        Point::new(bbox.x0, bbox.y1),
        Point::new(bbox.x1, bbox.y1),
    ]
    .map(|p| transform * p);
    let reach = corners
        .iter()
        .skip(1)
        .fold(Rect::from_points(corners[0], corners[0]), |r, p| r.union_pt(*p));
    let x_range = pixel_span(reach.x0 / sx, reach.x1 / sx, tw);
    let y_range = pixel_span(reach.y0 / sy, reach.y1 / sy, th);

    let colors = ColorSwap::new(&element.render_properties().color_map);
    for y in y_range {
        for x in x_range.clone() {
            let on_slide = Point::new((f64::from(x) + 0.5) * sx, (f64::from(y) + 0.5) * sy);
            let local = inverse * on_slide;
            if !bbox.contains(local) {
                continue;
            }
            let u = ((local.x - bbox.x0) / bbox.width() * f64::from(bw)) as u32;
            let v = ((local.y - bbox.y0) / bbox.height() * f64::from(bh)) as u32;
            let src = colors.apply(*bitmap.get_pixel(u.min(bw - 1), v.min(bh - 1)));
            let dst = target.get_pixel_mut(x, y);
            *dst = over(*dst, src, alpha as f32);
        }
    }
}

fn pixel_span(lo: f64, hi: f64, size: u32) -> std::ops::Range<u32> {
    let lo = lo.floor().clamp(0.0, f64::from(size)) as u32;
    let hi = hi.ceil().clamp(0.0, f64::from(size)) as u32;
    lo..hi.max(lo)
}

/// Straight-alpha source over destination, with the source alpha scaled by `opacity`.
pub fn over(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let s = to_vec4(src);
    let d = to_vec4(dst);
    let sa = s.w * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let out_a = sa + d.w * (1.0 - sa);
    let rgb = (s.truncate() * sa + d.truncate() * d.w * (1.0 - sa)) / out_a;
    from_vec4(Vec4::new(rgb.x, rgb.y, rgb.z, out_a))
}

/// Exact-match fill and line color substitution for recolored shapes.
struct ColorSwap {
    pairs: Vec<([u8; 3], [u8; 3])>,
}

impl ColorSwap {
    fn new(map: &ColorMap) -> Self {
        let pairs = [(map.from_fill, map.to_fill), (map.from_line, map.to_line)]
            .into_iter()
            .filter_map(|pair| match pair {
                (Some(from), Some(to)) if from != to => Some((from.to_bytes(), to.to_bytes())),
                _ => None,
            })
            .collect();
        Self { pairs }
    }

    fn apply(&self, px: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = px.0;
        for (from, to) in &self.pairs {
            if [r, g, b] == *from {
                return Rgba([to[0], to[1], to[2], a]);
            }
        }
        px
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/layers.rs"]
mod tests;
