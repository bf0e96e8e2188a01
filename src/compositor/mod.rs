//! Where slide bitmaps come from, and the shapes drawn over them.

use std::fmt;
use std::rc::Rc;

use image::RgbaImage;

pub mod cache;
pub mod layers;
pub mod previews;

pub use cache::SlideCache;
pub use layers::{LayerCompositor, ShapeLayer, draw_layer};
pub use previews::{
    FetchCallback, PreviewMessage, PreviewRequester, PreviewTile, PreviewsCompositor,
    decode_data_url,
};

/// Source of the rendered slide bitmaps a slide transition blends between.
pub trait SlideCompositor: fmt::Debug {
    /// `None` while the bitmap of `slide` is not available yet.
    fn get_slide(&mut self, slide: usize) -> Option<Rc<RgbaImage>>;
}

impl SlideCompositor for PreviewsCompositor {
    fn get_slide(&mut self, slide: usize) -> Option<Rc<RgbaImage>> {
        PreviewsCompositor::get_slide(self, slide)
    }
}

/// Pre-rendered bitmaps, one per slide.
impl SlideCompositor for Vec<Rc<RgbaImage>> {
    fn get_slide(&mut self, slide: usize) -> Option<Rc<RgbaImage>> {
        self.get(slide).cloned()
    }
}
