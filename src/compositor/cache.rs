use std::collections::HashMap;
use std::rc::Rc;

use image::RgbaImage;

/// Slide bitmaps keyed by slide hash. Entries stay until invalidated.
#[derive(Debug, Clone, Default)]
pub struct SlideCache {
    entries: HashMap<String, Rc<RgbaImage>>,
}

impl SlideCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn get(&self, hash: &str) -> Option<Rc<RgbaImage>> {
        self.entries.get(hash).cloned()
    }

    pub fn set(&mut self, hash: impl Into<String>, bitmap: Rc<RgbaImage>) {
        self.entries.insert(hash.into(), bitmap);
    }

    /// Drop one entry; returns whether it was present.
    pub fn invalidate(&mut self, hash: &str) -> bool {
        self.entries.remove(hash).is_some()
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/cache.rs"]
mod tests;
