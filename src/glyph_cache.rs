//! Memoized glyph outlines.
//!
//! Outlines are keyed by font identity, scale, glyph index and hinting, and
//! are loaded from the [`FontProvider`] at most once per key. Entries live
//! until [`GlyphCache::clear`]; there is no eviction.
//!
//! Font identity is the address of the shared font object, so two fonts with
//! the same name never share outlines. The cache holds a reference to every
//! font it has entries for, which keeps that address from being reused by
//! another font while the entries exist.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::error::FontError;
use crate::font::{FontProvider, GlyphOutline, Hinting};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Address of the font object.
    pub font: usize,
    /// `f64::to_bits` of the scale.
    pub scale_bits: u64,
    pub glyph: u32,
    pub hinting: Hinting,
}

impl GlyphKey {
    pub fn new(font: &Rc<dyn FontProvider>, scale: f64, glyph: u32, hinting: Hinting) -> Self {
        Self {
            font: font_id(font),
            scale_bits: scale.to_bits(),
            glyph,
            hinting,
        }
    }
}

fn font_id(font: &Rc<dyn FontProvider>) -> usize {
    Rc::as_ptr(font).cast::<()>() as usize
}

#[derive(Default)]
pub struct GlyphCache {
    entries: HashMap<GlyphKey, Rc<GlyphOutline>>,
    fonts: HashMap<usize, Rc<dyn FontProvider>>,
}

impl fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphCache")
            .field("entries", &self.entries.len())
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.fonts.clear();
    }

    /// Outline of `glyph` in `font`, loading and caching it on first use.
    /// Failed loads are not cached.
    pub fn fetch(
        &mut self,
        font: &Rc<dyn FontProvider>,
        scale: f64,
        glyph: u32,
        hinting: Hinting,
    ) -> Result<Rc<GlyphOutline>, FontError> {
        let key = GlyphKey::new(font, scale, glyph, hinting);
        if let Some(outline) = self.entries.get(&key) {
            trace!("glyph cache hit: {} {key:?}", font.name());
            return Ok(Rc::clone(outline));
        }
        trace!("glyph cache miss: {} {key:?}", font.name());
        let outline = Rc::new(font.load_outline(glyph, scale, hinting)?);
        self.fonts.entry(key.font).or_insert_with(|| Rc::clone(font));
        self.entries.insert(key, Rc::clone(&outline));
        Ok(outline)
    }
}

// ============================================================================
// Tests
// ============================================================================
