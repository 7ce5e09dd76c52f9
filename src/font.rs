//! Font provider interface and glyph outlines.
//!
//! A [`FontProvider`] maps characters to glyph indices and loads
//! [`GlyphOutline`]s at a given scale (pixels per em). Outlines are in font
//! orientation: y grows upwards from the baseline.

use crate::basics::RectD;
use crate::error::FontError;
use crate::path::PathBuilder;

/// Points per inch, the unit of font sizes.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Pixels per em for a font size in points at `dpi`.
#[inline]
pub fn font_scale(font_size: f64, dpi: f64) -> f64 {
    font_size * dpi / POINTS_PER_INCH
}

// ============================================================================
// Hinting
// ============================================================================

/// Outline hinting requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hinting {
    #[default]
    None,
    Vertical,
    Full,
}

// ============================================================================
// GlyphOutline
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointTag {
    /// Curve end point.
    On,
    /// Quadratic control point.
    Quad,
    /// Cubic control point; they come in pairs.
    Cubic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPoint {
    pub x: f64,
    pub y: f64,
    pub tag: PointTag,
}

impl GlyphPoint {
    pub const fn new(x: f64, y: f64, tag: PointTag) -> Self {
        Self { x, y, tag }
    }

    pub const fn on(x: f64, y: f64) -> Self {
        Self::new(x, y, PointTag::On)
    }
}

/// Scaled outline of one glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    /// Closed contours.
    pub contours: Vec<Vec<GlyphPoint>>,
    /// Horizontal advance in pixels.
    pub advance: f64,
    /// Bounds of the contour points, y up.
    pub bounds: RectD,
}

impl GlyphOutline {
    pub fn new(contours: Vec<Vec<GlyphPoint>>, advance: f64) -> Self {
        let mut bounds = RectD::empty();
        for p in contours.iter().flatten() {
            bounds.expand(p.x, p.y);
        }
        if !bounds.is_valid() {
            bounds = RectD::new(0.0, 0.0, 0.0, 0.0);
        }
        Self {
            contours,
            advance,
            bounds,
        }
    }

    /// All contour points.
    pub fn points(&self) -> impl Iterator<Item = &GlyphPoint> {
        self.contours.iter().flatten()
    }

    /// Append the contours to `builder` with the origin at (`x`, `y`) and
    /// the y axis flipped to point down.
    pub fn draw_to<B: PathBuilder + ?Sized>(&self, builder: &mut B, x: f64, y: f64) {
        for contour in &self.contours {
            draw_contour(builder, contour, x, y);
        }
    }
}

fn mid(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5)
}

/// One contour. Two quadratic control points in a row have an implied
/// on-curve point halfway between them; a contour with no on-curve point
/// starts at the implied point between its last and first points.
fn draw_contour<B: PathBuilder + ?Sized>(builder: &mut B, contour: &[GlyphPoint], dx: f64, dy: f64) {
    let Some(last) = contour.last() else {
        return;
    };
    let dev = |p: &GlyphPoint| (dx + p.x, dy - p.y);

    let (start, rest): ((f64, f64), Vec<&GlyphPoint>) =
        match contour.iter().position(|p| p.tag == PointTag::On) {
            Some(s) => (
                dev(&contour[s]),
                contour[s + 1..].iter().chain(&contour[..s]).collect(),
            ),
            None => (mid(dev(last), dev(&contour[0])), contour.iter().collect()),
        };

    builder.move_to(start.0, start.1);
    let mut quad: Option<(f64, f64)> = None;
    let mut cubic: Vec<(f64, f64)> = Vec::with_capacity(2);

    for p in rest {
        let d = dev(p);
        match p.tag {
            PointTag::On => segment_to(builder, d, &mut quad, &mut cubic),
            PointTag::Quad => {
                if let Some(q) = quad {
                    let m = mid(q, d);
                    builder.quad_curve_to(q.0, q.1, m.0, m.1);
                }
                quad = Some(d);
            }
            PointTag::Cubic => {
                if cubic.len() == 2 {
                    let m = mid(cubic[1], d);
                    builder.cubic_curve_to(cubic[0].0, cubic[0].1, cubic[1].0, cubic[1].1, m.0, m.1);
                    cubic.clear();
                }
                cubic.push(d);
            }
        }
    }
    segment_to(builder, start, &mut quad, &mut cubic);
    builder.close();
}

/// Segment ending on the on-curve point `p`, shaped by the pending control
/// points.
fn segment_to<B: PathBuilder + ?Sized>(
    builder: &mut B,
    p: (f64, f64),
    quad: &mut Option<(f64, f64)>,
    cubic: &mut Vec<(f64, f64)>,
) {
    match (quad.take(), cubic.as_slice()) {
        (Some(q), _) => builder.quad_curve_to(q.0, q.1, p.0, p.1),
        (None, [c1, c2]) => builder.cubic_curve_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1),
        (None, [c]) => builder.quad_curve_to(c.0, c.1, p.0, p.1),
        _ => builder.line_to(p.0, p.1),
    }
    cubic.clear();
}

// ============================================================================
// FontProvider
// ============================================================================

/// Source of glyph outlines and metrics.
///
/// `scale` is always in pixels per em (see [`font_scale`]).
pub trait FontProvider {
    /// Identity of the font, part of the glyph cache key.
    fn name(&self) -> &str;

    /// Glyph for `c`, `None` when the font has no mapping.
    fn glyph_index(&self, c: char) -> Option<u32>;

    fn load_outline(&self, glyph: u32, scale: f64, hinting: Hinting) -> Result<GlyphOutline, FontError>;

    /// Horizontal kerning adjustment between two glyphs, in pixels.
    fn kerning(&self, left: u32, right: u32, scale: f64) -> f64;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Component, Path};

    #[test]
    fn test_font_scale() {
        assert_eq!(font_scale(72.0, 92.0), 92.0);
        assert_eq!(font_scale(10.0, 72.0), 10.0);
    }

    #[test]
    fn test_outline_bounds() {
        let o = GlyphOutline::new(
            vec![vec![GlyphPoint::on(1.0, -2.0), GlyphPoint::on(5.0, 7.0)]],
            6.0,
        );
        assert_eq!((o.bounds.x1, o.bounds.y1, o.bounds.x2, o.bounds.y2), (1.0, -2.0, 5.0, 7.0));
        assert_eq!(GlyphOutline::new(vec![], 3.0).bounds, RectD::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_draw_polygon_flips_y() {
        let o = GlyphOutline::new(
            vec![vec![
                GlyphPoint::on(0.0, 0.0),
                GlyphPoint::on(4.0, 0.0),
                GlyphPoint::on(4.0, 8.0),
            ]],
            5.0,
        );
        let mut p = Path::new();
        o.draw_to(&mut p, 10.0, 20.0);
        assert_eq!(
            p.components(),
            &[
                Component::MoveTo,
                Component::LineTo,
                Component::LineTo,
                Component::LineTo,
                Component::Close
            ]
        );
        assert_eq!(&p.points()[..6], &[10.0, 20.0, 14.0, 20.0, 14.0, 12.0]);
    }

    #[test]
    fn test_implied_on_points_between_quads() {
        let o = GlyphOutline::new(
            vec![vec![
                GlyphPoint::on(0.0, 0.0),
                GlyphPoint::new(2.0, 2.0, PointTag::Quad),
                GlyphPoint::new(4.0, 2.0, PointTag::Quad),
                GlyphPoint::on(6.0, 0.0),
            ]],
            6.0,
        );
        let mut p = Path::new();
        o.draw_to(&mut p, 0.0, 0.0);
        assert_eq!(
            p.components(),
            &[
                Component::MoveTo,
                Component::QuadCurveTo,
                Component::QuadCurveTo,
                Component::LineTo,
                Component::Close
            ]
        );
        // first curve ends on the implied point (3, 2), flipped
        assert_eq!(&p.points()[2..6], &[2.0, -2.0, 3.0, -2.0]);
    }

    #[test]
    fn test_contour_starting_off_curve() {
        let o = GlyphOutline::new(
            vec![vec![
                GlyphPoint::new(0.0, 0.0, PointTag::Quad),
                GlyphPoint::new(4.0, 0.0, PointTag::Quad),
            ]],
            4.0,
        );
        let mut p = Path::new();
        o.draw_to(&mut p, 0.0, 0.0);
        assert_eq!(&p.points()[..2], &[2.0, 0.0]);
        assert_eq!(*p.components().last().unwrap(), Component::Close);
        assert_eq!(
            p.components().iter().filter(|c| **c == Component::QuadCurveTo).count(),
            2
        );
    }

    #[test]
    fn test_cubic_pair() {
        let o = GlyphOutline::new(
            vec![vec![
                GlyphPoint::on(0.0, 0.0),
                GlyphPoint::new(1.0, 1.0, PointTag::Cubic),
                GlyphPoint::new(2.0, 1.0, PointTag::Cubic),
                GlyphPoint::on(3.0, 0.0),
            ]],
            3.0,
        );
        let mut p = Path::new();
        o.draw_to(&mut p, 0.0, 0.0);
        assert_eq!(p.components()[1], Component::CubicCurveTo);
    }
}
