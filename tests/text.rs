use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use raster2d::font::{GlyphPoint, PointTag};
use raster2d::{
    Error, FontError, FontProvider, GlyphOutline, GraphicContext, Hinting, PathBuilder, Rgba8,
};

/// Glyph 0 is a box, 'A' a triangle with a quadratic side, 'V' a
/// wedge and 'B' always fails to load. 'A' followed by 'V' kerns by an
/// eighth of an em.
#[derive(Default)]
struct MockFont {
    loads: RefCell<HashMap<u32, usize>>,
}

impl MockFont {
    fn loads_of(&self, glyph: u32) -> usize {
        self.loads.borrow().get(&glyph).copied().unwrap_or(0)
    }

    fn total_loads(&self) -> usize {
        self.loads.borrow().values().sum()
    }
}

impl FontProvider for MockFont {
    fn name(&self) -> &str {
        "mock"
    }

    fn glyph_index(&self, c: char) -> Option<u32> {
        match c {
            'A' | 'V' | 'B' => Some(c as u32),
            _ => None,
        }
    }

    fn load_outline(&self, glyph: u32, scale: f64, _hinting: Hinting) -> Result<GlyphOutline, FontError> {
        *self.loads.borrow_mut().entry(glyph).or_default() += 1;
        let s = scale;
        let contour = match char::from_u32(glyph) {
            Some('A') => vec![
                GlyphPoint::on(0.0, 0.0),
                GlyphPoint::new(0.25 * s, 0.875 * s, PointTag::Quad),
                GlyphPoint::on(0.5 * s, 0.0),
            ],
            Some('V') => vec![
                GlyphPoint::on(0.0, 0.75 * s),
                GlyphPoint::on(0.5 * s, 0.0),
                GlyphPoint::on(0.25 * s, 0.75 * s),
            ],
            Some('B') => return Err(FontError::MalformedOutline(glyph)),
            _ => vec![
                GlyphPoint::on(0.25 * s, 0.0),
                GlyphPoint::on(0.5 * s, 0.0),
                GlyphPoint::on(0.5 * s, 0.5 * s),
                GlyphPoint::on(0.25 * s, 0.5 * s),
            ],
        };
        Ok(GlyphOutline::new(vec![contour], 0.75 * s))
    }

    fn kerning(&self, left: u32, right: u32, scale: f64) -> f64 {
        if left == 'A' as u32 && right == 'V' as u32 {
            -0.125 * scale
        } else {
            0.0
        }
    }
}

/// Context at 72 dpi and 20pt, so one em is 20 pixels.
fn context_with_font() -> (GraphicContext, Rc<MockFont>) {
    let font = Rc::new(MockFont::default());
    let mut ctx = GraphicContext::new(100, 60);
    ctx.set_font(font.clone());
    ctx.set_dpi(72.0);
    ctx.set_font_size(20.0);
    (ctx, font)
}

#[test]
fn string_operations_without_font_fail_cleanly() {
    let mut ctx = GraphicContext::new(10, 10);
    assert!(matches!(ctx.fill_string_at("A", 1.0, 9.0), Err(Error::NoFont)));
    assert!(matches!(ctx.stroke_string("A"), Err(Error::NoFont)));
    assert!(matches!(ctx.get_string_bounds("A"), Err(Error::NoFont)));
    assert!(ctx.image().data().iter().all(|b| *b == 0));
}

#[test]
fn advance_includes_kerning() {
    let (mut ctx, _font) = context_with_font();
    assert_eq!(ctx.create_string_path("AA", 0.0, 0.0).unwrap(), 30.0);
    ctx.begin_path();
    assert_eq!(ctx.create_string_path("AV", 5.0, 0.0).unwrap(), 27.5);
}

#[test]
fn unmapped_characters_use_glyph_zero() {
    let (mut ctx, font) = context_with_font();
    let advance = ctx.create_string_path("?!", 0.0, 0.0).unwrap();
    assert_eq!(advance, 30.0);
    assert_eq!(font.loads_of(0), 1);
    assert_eq!(ctx.glyph_cache().len(), 1);
}

#[test]
fn glyphs_are_placed_at_pen_with_y_flipped() {
    let (mut ctx, _font) = context_with_font();
    ctx.create_string_path("V", 10.0, 40.0).unwrap();
    let pts = ctx.path().points();
    assert_eq!(&pts[..4], &[10.0, 25.0, 20.0, 40.0]);
    assert_eq!(ctx.last_point(), (10.0, 25.0));
}

#[test]
fn glyph_cache_loads_each_glyph_once() {
    let (mut ctx, font) = context_with_font();
    ctx.fill_string_at("AVA", 2.0, 30.0).unwrap();
    ctx.fill_string_at("VAV", 2.0, 55.0).unwrap();
    ctx.get_string_bounds("AAVV").unwrap();
    assert_eq!(font.loads_of('A' as u32), 1);
    assert_eq!(font.loads_of('V' as u32), 1);
    assert_eq!(font.total_loads(), 2);

    ctx.set_font_size(10.0);
    ctx.get_string_bounds("A").unwrap();
    assert_eq!(font.loads_of('A' as u32), 2);

    ctx.set_hinting(Hinting::Full);
    ctx.get_string_bounds("A").unwrap();
    assert_eq!(font.loads_of('A' as u32), 3);
    assert_eq!(ctx.glyph_cache().len(), 4);
}

#[test]
fn cached_text_renders_identically() {
    let (mut ctx, _font) = context_with_font();
    ctx.fill_string_at("AV", 10.0, 30.0).unwrap();
    let first = ctx.image().clone();
    ctx.clear(Rgba8::TRANSPARENT);
    ctx.fill_string_at("AV", 10.0, 30.0).unwrap();
    assert_eq!(ctx.image(), &first);
}

#[test]
fn fill_string_paints_and_clears_path() {
    let (mut ctx, _font) = context_with_font();
    ctx.set_fill_color(Rgba8::RED);
    let advance = ctx.fill_string_at("?", 0.0, 20.0).unwrap();
    assert_eq!(advance, 15.0);
    // glyph 0 covers x 5..10, y 10..20
    assert_eq!(ctx.image().pixel(7, 15), Rgba8::RED);
    assert_eq!(ctx.image().pixel(12, 15), Rgba8::TRANSPARENT);
    assert!(ctx.path().is_empty());
}

#[test]
fn stroke_string_outlines_glyph() {
    let (mut ctx, _font) = context_with_font();
    ctx.set_line_width(2.0);
    ctx.stroke_string_at("?", 0.0, 20.0).unwrap();
    assert_eq!(ctx.image().pixel(5, 15), Rgba8::BLACK);
    assert_eq!(ctx.image().pixel(7, 15), Rgba8::TRANSPARENT);
}

#[test]
fn string_bounds_follow_points_and_kerning() {
    let (mut ctx, _font) = context_with_font();
    let (l, t, r, b) = ctx.get_string_bounds("AV").unwrap();
    // 'A' spans x 0..10 and rises to 17.5; 'V' starts at 15 - 2.5
    assert_eq!(l, 0.0);
    assert_eq!(t, -17.5);
    assert_eq!(r, 22.5);
    assert_eq!(b, 0.0);
    assert!(ctx.path().is_empty());
}

#[test]
fn glyph_load_failure_reports_advance_so_far() {
    let (mut ctx, font) = context_with_font();
    let err = ctx.create_string_path("AVB", 0.0, 0.0).unwrap_err();
    match err {
        Error::GlyphLoad {
            glyph,
            advance,
            source,
        } => {
            assert_eq!(glyph, 'B' as u32);
            assert_eq!(advance, 27.5);
            assert_eq!(source, FontError::MalformedOutline('B' as u32));
        }
        other => panic!("unexpected error: {other}"),
    }
    // failed loads are retried, not cached
    assert!(ctx.get_string_bounds("B").is_err());
    assert_eq!(font.loads_of('B' as u32), 2);
}

#[test]
fn failed_fill_string_leaves_no_partial_path() {
    let (mut ctx, _font) = context_with_font();
    ctx.move_to(1.0, 1.0);
    assert!(matches!(
        ctx.fill_string_at("AB", 10.0, 40.0),
        Err(Error::GlyphLoad { .. })
    ));
    assert!(ctx.path().is_empty());
    assert!(matches!(
        ctx.stroke_string_at("VB", 10.0, 40.0),
        Err(Error::GlyphLoad { .. })
    ));
    assert!(ctx.path().is_empty());

    // A later unrelated fill does not pick up the glyphs laid out so far.
    ctx.fill(&[]);
    ctx.stroke(&[]);
    assert!(ctx.image().data().iter().all(|b| *b == 0));
}
