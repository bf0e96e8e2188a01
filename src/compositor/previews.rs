//! Slide bitmaps sourced from server-rendered preview tiles.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::compositor::cache::SlideCache;
use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::handler::presentation::PresentationInfo;

/// Host side that asks the server for a slide preview; the answer comes back through
/// [`PreviewsCompositor::on_got_preview`].
pub trait PreviewRequester: fmt::Debug {
    fn request_preview(&mut self, slide: usize, width: u32, height: u32);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewTile {
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewMessage {
    pub part: usize,
    pub tile: PreviewTile,
}

pub type FetchCallback = Box<dyn FnOnce(&mut PreviewsCompositor, Rc<RgbaImage>)>;

/// Decode a `data:image/...;base64,` URL.
pub fn decode_data_url(src: &str) -> SlideShowResult<RgbaImage> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| SlideShowError::validation("preview source is not a data url"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SlideShowError::validation("data url has no payload"))?;
    if !header.ends_with(";base64") {
        return Err(SlideShowError::validation("data url is not base64 encoded"));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| SlideShowError::validation(format!("invalid base64 payload: {e}")))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| SlideShowError::render(format!("cannot decode preview image: {e}")))?;
    Ok(image.to_rgba8())
}

pub struct PreviewsCompositor {
    requester: Box<dyn PreviewRequester>,
    hashes: Vec<String>,
    width: u32,
    height: u32,
    bitmaps: Vec<Option<Rc<RgbaImage>>>,
    requested: HashSet<usize>,
    cache: SlideCache,
    initial_slide: Option<usize>,
    on_ready: Option<FetchCallback>,
}

impl fmt::Debug for PreviewsCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewsCompositor")
            .field("slides", &self.hashes.len())
            .field("received", &self.bitmaps.iter().filter(|b| b.is_some()).count())
            .field("requested", &self.requested)
            .field("initial_slide", &self.initial_slide)
            .finish()
    }
}

impl PreviewsCompositor {
    pub fn new(info: &PresentationInfo, requester: Box<dyn PreviewRequester>) -> Self {
        Self {
            requester,
            hashes: info.slides.iter().map(|s| s.hash.clone()).collect(),
            width: info.width,
            height: info.height,
            bitmaps: vec![None; info.slides.len()],
            requested: HashSet::new(),
            cache: SlideCache::new(),
            initial_slide: None,
            on_ready: None,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.hashes.len()
    }

    pub fn cache(&self) -> &SlideCache {
        &self.cache
    }

    /// Run `callback` once `slide` is available, requesting it if needed.
    ///
    /// A newer call replaces a callback that has not fired yet.
    pub fn fetch_and_run(&mut self, slide: usize, callback: FetchCallback) -> SlideShowResult<()> {
        if slide >= self.slide_count() {
            return Err(SlideShowError::validation(format!(
                "slide {slide} out of range ({} slides)",
                self.slide_count()
            )));
        }
        if let Some(bitmap) = self.bitmaps[slide].clone() {
            self.initial_slide = None;
            self.on_ready = None;
            callback(self, bitmap);
            return Ok(());
        }
        self.initial_slide = Some(slide);
        self.on_ready = Some(callback);
        self.request(slide);
        Ok(())
    }

    /// Cached bitmap of `slide`, prefetching the slide after it.
    pub fn get_slide(&mut self, slide: usize) -> Option<Rc<RgbaImage>> {
        let next = slide + 1;
        if next < self.slide_count() && self.bitmaps[next].is_none() {
            self.request(next);
        }
        self.bitmaps.get(slide).cloned().flatten()
    }

    pub fn on_got_preview(&mut self, message: &PreviewMessage) -> SlideShowResult<()> {
        let part = message.part;
        if part >= self.slide_count() {
            return Err(SlideShowError::validation(format!(
                "preview for unknown slide {part}"
            )));
        }
        // an undecodable answer leaves the slide free to be requested again
        self.requested.remove(&part);
        let bitmap = Rc::new(decode_data_url(&message.tile.src)?);
        tracing::debug!(
            slide = part,
            width = bitmap.width(),
            height = bitmap.height(),
            "received slide preview"
        );
        self.bitmaps[part] = Some(bitmap.clone());
        self.cache.set(self.hashes[part].clone(), bitmap.clone());

        if self.initial_slide == Some(part) {
            self.initial_slide = None;
            if let Some(callback) = self.on_ready.take() {
                callback(self, bitmap);
            }
        }
        Ok(())
    }

    /// Forget a slide so the next access requests it again.
    pub fn invalidate(&mut self, slide: usize) {
        if let Some(entry) = self.bitmaps.get_mut(slide) {
            *entry = None;
            self.cache.invalidate(&self.hashes[slide]);
        }
    }

    fn request(&mut self, slide: usize) {
        if self.requested.insert(slide) {
            tracing::trace!(slide, "requesting slide preview");
            self.requester.request_preview(slide, self.width, self.height);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/previews.rs"]
mod tests;
