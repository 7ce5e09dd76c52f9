//! Span painting.
//!
//! A [`Painter`] receives finished scanlines and a color. [`render_scanlines`]
//! drives a [`Rasterizer`] sweep into a painter; [`fill_rect`] produces the
//! same scanlines for an axis-aligned rectangle without building cells.

use log::debug;

use crate::basics::{poly_coord, FillRule, RectD, RectI, POLY_SUBPIXEL_SHIFT};
use crate::color::Rgba8;
use crate::image::ImageBuffer;
use crate::path::{Component, Path};
use crate::rasterizer::{coverage_alpha, Rasterizer, PIXEL};
use crate::scanline::{Scanline, ScanlineU8};
use crate::trans_affine::TransAffine;

// ============================================================================
// Painter
// ============================================================================

/// Consumer of coverage rows.
pub trait Painter {
    fn paint(&mut self, sl: &ScanlineU8, color: Rgba8);
}

impl<P: Painter + ?Sized> Painter for &mut P {
    fn paint(&mut self, sl: &ScanlineU8, color: Rgba8) {
        (**self).paint(sl, color)
    }
}

/// Blends scanlines into an [`ImageBuffer`].
pub struct ImagePainter<'a> {
    image: &'a mut ImageBuffer,
}

impl<'a> ImagePainter<'a> {
    pub fn new(image: &'a mut ImageBuffer) -> Self {
        Self { image }
    }
}

impl Painter for ImagePainter<'_> {
    fn paint(&mut self, sl: &ScanlineU8, color: Rgba8) {
        let y = sl.y();
        for span in sl.spans() {
            self.image
                .blend_solid_hspan(span.x, y, color, sl.span_covers(&span));
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Sweep `ras` into `painter`. Returns `false` when nothing was covered.
pub fn render_scanlines<P: Painter + ?Sized>(
    ras: &mut Rasterizer,
    sl: &mut ScanlineU8,
    painter: &mut P,
    color: Rgba8,
) -> bool {
    if !ras.rewind_scanlines() {
        return false;
    }
    sl.reset(ras.min_x(), ras.max_x());
    while ras.sweep_scanline(sl) {
        painter.paint(sl, color);
    }
    true
}

/// Axis-aligned rectangle in device space together with the direction its
/// corners were traced in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub bounds: RectD,
    /// Sign of the cell area the rasterizer accumulates for this outline:
    /// `-1` when the corners run clockwise on screen (y down), `1` otherwise.
    pub area_sign: i32,
}

impl DeviceRect {
    pub fn new(bounds: RectD, area_sign: i32) -> Self {
        Self { bounds, area_sign }
    }
}

/// Device-space rectangle for `path` under `matrix` when the path is a plain
/// axis-aligned rectangle: a move followed by three lines whose sides
/// alternate between horizontal and vertical, optionally a line back to the
/// start, optionally a close, under a matrix without rotation or shear.
pub fn rect_from_path(path: &Path, matrix: &TransAffine) -> Option<DeviceRect> {
    if !matrix.is_axis_preserving() {
        return None;
    }
    let components = path.components();
    let n = components.len();
    if !(4..=6).contains(&n)
        || components[0] != Component::MoveTo
        || components[1..4].iter().any(|c| *c != Component::LineTo)
    {
        return None;
    }
    let pts = path.points();
    let p = |i: usize| (pts[i * 2], pts[i * 2 + 1]);
    let corners = [p(0), p(1), p(2), p(3)];
    match &components[4..] {
        [] | [Component::Close] => {}
        [Component::LineTo] | [Component::LineTo, Component::Close] => {
            if p(4) != corners[0] {
                return None;
            }
        }
        _ => return None,
    }

    let horizontal_first = corners[0].1 == corners[1].1;
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        let horizontal = (i % 2 == 0) == horizontal_first;
        let aligned = if horizontal { a.1 == b.1 } else { a.0 == b.0 };
        if !aligned {
            return None;
        }
    }

    let device = corners.map(|(x, y)| matrix.transform(x, y));
    let mut r = RectD::empty();
    let mut twice_area = 0.0;
    for i in 0..4 {
        let ((x0, y0), (x1, y1)) = (device[i], device[(i + 1) % 4]);
        r.expand(x0, y0);
        twice_area += x0 * y1 - x1 * y0;
    }
    // Left edge traced upward means negative cover in the sweep.
    let area_sign = if twice_area > 0.0 { -1 } else { 1 };
    Some(DeviceRect::new(r, area_sign))
}

/// Paint an axis-aligned device-space rectangle, clipped to `clip` (24.8
/// fixed point). Coverage per pixel is exactly what the rasterizer produces
/// for the same outline, including the rounding of negative cell areas.
pub fn fill_rect<P: Painter + ?Sized>(
    rect: &DeviceRect,
    clip: &RectI,
    rule: FillRule,
    sl: &mut ScanlineU8,
    painter: &mut P,
    color: Rgba8,
) -> bool {
    let b = &rect.bounds;
    let x0 = poly_coord(b.x1).clamp(clip.x1, clip.x2);
    let x1 = poly_coord(b.x2).clamp(clip.x1, clip.x2);
    let y0 = poly_coord(b.y1).clamp(clip.y1, clip.y2);
    let y1 = poly_coord(b.y2).clamp(clip.y1, clip.y2);
    if x0 >= x1 || y0 >= y1 {
        return false;
    }
    debug!("rectangle fast path: ({x0}, {y0})..({x1}, {y1}) in 1/256 px");

    let ex0 = x0 >> POLY_SUBPIXEL_SHIFT;
    let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
    let fx0 = x0 - (ex0 << POLY_SUBPIXEL_SHIFT);
    let fx1 = x1 - (ex1 << POLY_SUBPIXEL_SHIFT);
    let ey0 = y0 >> POLY_SUBPIXEL_SHIFT;
    let ey1 = (y1 - 1) >> POLY_SUBPIXEL_SHIFT;

    sl.reset(ex0, ex1);
    let mut painted = false;
    for ey in ey0..=ey1 {
        let row_top = ey << POLY_SUBPIXEL_SHIFT;
        let d = y1.min(row_top + PIXEL) - y0.max(row_top);
        sl.reset_spans();
        for ex in ex0..=ex1 {
            let w = if ex0 == ex1 {
                fx1 - fx0
            } else if ex == ex0 {
                PIXEL - fx0
            } else if ex == ex1 {
                fx1
            } else {
                PIXEL
            };
            let alpha = coverage_alpha(rect.area_sign * d * 2 * w, rule);
            if alpha != 0 {
                sl.add_cell(ex, alpha);
            }
        }
        if sl.num_spans() > 0 {
            sl.finalize(ey);
            painter.paint(sl, color);
            painted = true;
        }
    }
    painted
}

// ============================================================================
// Tests
// ============================================================================
