//! TrueType / OpenType fonts via `ttf-parser`.
//!
//! `ttf-parser` does not hint outlines, so the requested [`Hinting`] is
//! accepted but has no effect on the returned geometry.

use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::error::FontError;
use crate::font::{FontProvider, GlyphOutline, GlyphPoint, Hinting, PointTag};

/// A font face parsed from owned TTF/OTF data.
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
    face_index: u32,
    units_per_em: f64,
    glyph_count: u32,
}

impl TrueTypeFont {
    /// Parse face `face_index` of `data` (0 for single-face files). `name`
    /// identifies the font in the glyph cache.
    pub fn from_data(name: impl Into<String>, data: Vec<u8>, face_index: u32) -> Result<Self, FontError> {
        let face = Face::parse(&data, face_index).map_err(|e| FontError::Parse(e.to_string()))?;
        let units_per_em = face.units_per_em() as f64;
        let glyph_count = face.number_of_glyphs() as u32;
        Ok(Self {
            name: name.into(),
            data,
            face_index,
            units_per_em,
            glyph_count,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }

    fn units_to_pixels(&self, scale: f64) -> f64 {
        scale / self.units_per_em
    }

    /// Ascender in pixels at `scale`.
    pub fn ascender(&self, scale: f64) -> f64 {
        self.face()
            .map_or(0.0, |f| f.ascender() as f64 * self.units_to_pixels(scale))
    }

    /// Descender in pixels at `scale`, usually negative.
    pub fn descender(&self, scale: f64) -> f64 {
        self.face()
            .map_or(0.0, |f| f.descender() as f64 * self.units_to_pixels(scale))
    }
}

impl FontProvider for TrueTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph_index(&self, c: char) -> Option<u32> {
        self.face()?.glyph_index(c).map(|id| id.0 as u32)
    }

    fn load_outline(&self, glyph: u32, scale: f64, _hinting: Hinting) -> Result<GlyphOutline, FontError> {
        if glyph >= self.glyph_count {
            return Err(FontError::InvalidGlyph(glyph));
        }
        let face = self
            .face()
            .ok_or_else(|| FontError::Parse(format!("face {} became unreadable", self.face_index)))?;
        let id = GlyphId(glyph as u16);
        let s = self.units_to_pixels(scale);
        let advance = face.glyph_hor_advance(id).map_or(0.0, |a| a as f64 * s);

        let mut collector = OutlineCollector::new(s);
        // `None` means the glyph has no outline, as for a space.
        face.outline_glyph(id, &mut collector);
        Ok(GlyphOutline::new(collector.finish(), advance))
    }

    fn kerning(&self, left: u32, right: u32, scale: f64) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let Some(kern) = face.tables().kern else {
            return 0.0;
        };
        let (left, right) = (GlyphId(left as u16), GlyphId(right as u16));
        for subtable in kern.subtables {
            if subtable.horizontal && !subtable.has_cross_stream {
                if let Some(value) = subtable.glyphs_kerning(left, right) {
                    return value as f64 * self.units_to_pixels(scale);
                }
            }
        }
        0.0
    }
}

// ============================================================================
// OutlineCollector
// ============================================================================

/// Gathers `ttf-parser` outline callbacks into tagged contours.
struct OutlineCollector {
    scale: f64,
    contours: Vec<Vec<GlyphPoint>>,
    current: Vec<GlyphPoint>,
}

impl OutlineCollector {
    fn new(scale: f64) -> Self {
        Self {
            scale,
            contours: Vec::new(),
            current: Vec::with_capacity(64),
        }
    }

    #[inline]
    fn push(&mut self, x: f32, y: f32, tag: PointTag) {
        self.current
            .push(GlyphPoint::new(x as f64 * self.scale, y as f64 * self.scale, tag));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.contours.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Vec<GlyphPoint>> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.push(x, y, PointTag::On);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y, PointTag::On);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1, PointTag::Quad);
        self.push(x, y, PointTag::On);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(x1, y1, PointTag::Cubic);
        self.push(x2, y2, PointTag::Cubic);
        self.push(x, y, PointTag::On);
    }

    fn close(&mut self) {
        self.flush();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        let err = TrueTypeFont::from_data("bad", vec![0, 1, 2, 3], 0).err();
        assert!(matches!(err, Some(FontError::Parse(_))));
    }

    #[test]
    fn test_collector_tags_and_scale() {
        let mut c = OutlineCollector::new(0.5);
        c.move_to(0.0, 0.0);
        c.line_to(10.0, 0.0);
        c.quad_to(20.0, 10.0, 10.0, 20.0);
        c.curve_to(8.0, 20.0, 2.0, 20.0, 0.0, 10.0);
        c.close();
        c.move_to(4.0, 4.0);
        c.line_to(6.0, 4.0);
        c.close();
        let contours = c.finish();
        assert_eq!(contours.len(), 2);
        let tags: Vec<PointTag> = contours[0].iter().map(|p| p.tag).collect();
        assert_eq!(
            tags,
            vec![
                PointTag::On,
                PointTag::On,
                PointTag::Quad,
                PointTag::On,
                PointTag::Cubic,
                PointTag::Cubic,
                PointTag::On
            ]
        );
        assert_eq!(contours[0][2], GlyphPoint::new(10.0, 5.0, PointTag::Quad));
        assert_eq!(contours[1][0], GlyphPoint::on(2.0, 2.0));
    }

    #[test]
    fn test_unclosed_contour_is_kept() {
        let mut c = OutlineCollector::new(1.0);
        c.move_to(0.0, 0.0);
        c.line_to(1.0, 1.0);
        assert_eq!(c.finish().len(), 1);
    }
}
