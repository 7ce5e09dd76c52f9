//! Anti-aliased scanline rasterizer.
//!
//! [`Rasterizer`] is a [`Flattener`] sink: it receives device-space polygons,
//! clips them to its clip box, converts them to cells and sweeps the cells
//! row by row into coverage spans under a [`FillRule`].
//!
//! Clipping keeps winding intact: the parts of an edge left or right of the
//! clip box are collapsed onto the box border instead of being dropped, and
//! parts above or below are dropped (they contribute no cover to visible
//! rows).

use crate::basics::{iround, poly_coord, FillRule, RectI, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};
use crate::flatten::Flattener;
use crate::rasterizer_cells::CellRasterizer;
use crate::scanline::{Scanline, ScanlineU8};

/// One pixel in 24.8 fixed point.
pub const PIXEL: i32 = POLY_SUBPIXEL_SCALE as i32;

const AA_SHIFT: u32 = 8;
const AA_SCALE: i32 = 1 << AA_SHIFT;
const AA_MASK: i32 = AA_SCALE - 1;
const AA_SCALE2: i32 = AA_SCALE * 2;
const AA_MASK2: i32 = AA_SCALE2 - 1;

/// Coverage (0..=255) of a cell whose accumulated doubled area is `area`.
#[inline]
pub fn coverage_alpha(area: i32, rule: FillRule) -> u32 {
    let mut cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).saturating_abs();
    if rule == FillRule::EvenOdd {
        cover &= AA_MASK2;
        if cover > AA_SCALE {
            cover = AA_SCALE2 - cover;
        }
    }
    cover.min(AA_MASK) as u32
}

// ============================================================================
// Clipper
// ============================================================================

#[inline]
fn clipping_flags(x: i32, y: i32, b: &RectI) -> u32 {
    (x > b.x2) as u32 | ((y > b.y2) as u32) << 1 | ((x < b.x1) as u32) << 2 | ((y < b.y1) as u32) << 3
}

#[inline]
fn clipping_flags_y(y: i32, b: &RectI) -> u32 {
    ((y > b.y2) as u32) << 1 | ((y < b.y1) as u32) << 3
}

#[inline]
fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    iround(a as f64 * b as f64 / c as f64)
}

/// Clips fixed-point segments against a box before they reach the cells.
#[derive(Debug, Clone)]
struct Clipper {
    clip_box: Option<RectI>,
    x1: i32,
    y1: i32,
    f1: u32,
}

impl Clipper {
    fn new(clip_box: Option<RectI>) -> Self {
        Self {
            clip_box,
            x1: 0,
            y1: 0,
            f1: 0,
        }
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.x1 = x;
        self.y1 = y;
        if let Some(b) = &self.clip_box {
            self.f1 = clipping_flags(x, y, b);
        }
    }

    fn line_to(&mut self, cells: &mut CellRasterizer, x2: i32, y2: i32) {
        let Some(b) = self.clip_box else {
            cells.line(self.x1, self.y1, x2, y2);
            self.x1 = x2;
            self.y1 = y2;
            return;
        };

        let f2 = clipping_flags(x2, y2, &b);
        let (x1, y1, f1) = (self.x1, self.y1, self.f1);
        self.x1 = x2;
        self.y1 = y2;
        self.f1 = f2;

        // Both ends above, or both below.
        if (f1 & 10) == (f2 & 10) && (f1 & 10) != 0 {
            return;
        }

        let y_at = |x: i32| y1 + mul_div(x - x1, y2 - y1, x2 - x1);
        match ((f1 & 5) << 1) | (f2 & 5) {
            0 => line_clip_y(cells, &b, x1, y1, x2, y2, f1, f2),
            1 => {
                let y3 = y_at(b.x2);
                let f3 = clipping_flags_y(y3, &b);
                line_clip_y(cells, &b, x1, y1, b.x2, y3, f1, f3);
                line_clip_y(cells, &b, b.x2, y3, b.x2, y2, f3, f2);
            }
            2 => {
                let y3 = y_at(b.x2);
                let f3 = clipping_flags_y(y3, &b);
                line_clip_y(cells, &b, b.x2, y1, b.x2, y3, f1, f3);
                line_clip_y(cells, &b, b.x2, y3, x2, y2, f3, f2);
            }
            3 => line_clip_y(cells, &b, b.x2, y1, b.x2, y2, f1, f2),
            4 => {
                let y3 = y_at(b.x1);
                let f3 = clipping_flags_y(y3, &b);
                line_clip_y(cells, &b, x1, y1, b.x1, y3, f1, f3);
                line_clip_y(cells, &b, b.x1, y3, b.x1, y2, f3, f2);
            }
            6 => {
                let y3 = y_at(b.x2);
                let y4 = y_at(b.x1);
                let f3 = clipping_flags_y(y3, &b);
                let f4 = clipping_flags_y(y4, &b);
                line_clip_y(cells, &b, b.x2, y1, b.x2, y3, f1, f3);
                line_clip_y(cells, &b, b.x2, y3, b.x1, y4, f3, f4);
                line_clip_y(cells, &b, b.x1, y4, b.x1, y2, f4, f2);
            }
            8 => {
                let y3 = y_at(b.x1);
                let f3 = clipping_flags_y(y3, &b);
                line_clip_y(cells, &b, b.x1, y1, b.x1, y3, f1, f3);
                line_clip_y(cells, &b, b.x1, y3, x2, y2, f3, f2);
            }
            9 => {
                let y3 = y_at(b.x1);
                let y4 = y_at(b.x2);
                let f3 = clipping_flags_y(y3, &b);
                let f4 = clipping_flags_y(y4, &b);
                line_clip_y(cells, &b, b.x1, y1, b.x1, y3, f1, f3);
                line_clip_y(cells, &b, b.x1, y3, b.x2, y4, f3, f4);
                line_clip_y(cells, &b, b.x2, y4, b.x2, y2, f4, f2);
            }
            12 => line_clip_y(cells, &b, b.x1, y1, b.x1, y2, f1, f2),
            // x flags cannot be both left and right of the box
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn line_clip_y(
    cells: &mut CellRasterizer,
    b: &RectI,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    f1: u32,
    f2: u32,
) {
    let f1 = f1 & 10;
    let f2 = f2 & 10;
    if (f1 | f2) == 0 {
        cells.line(x1, y1, x2, y2);
        return;
    }
    if f1 == f2 {
        return;
    }
    let x_at = |y: i32| x1 + mul_div(y - y1, x2 - x1, y2 - y1);
    let (mut tx1, mut ty1, mut tx2, mut ty2) = (x1, y1, x2, y2);
    if f1 & 8 != 0 {
        tx1 = x_at(b.y1);
        ty1 = b.y1;
    }
    if f1 & 2 != 0 {
        tx1 = x_at(b.y2);
        ty1 = b.y2;
    }
    if f2 & 8 != 0 {
        tx2 = x_at(b.y1);
        ty2 = b.y1;
    }
    if f2 & 2 != 0 {
        tx2 = x_at(b.y2);
        ty2 = b.y2;
    }
    cells.line(tx1, ty1, tx2, ty2);
}

// ============================================================================
// Rasterizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Polygon rasterizer producing anti-aliased scanlines.
///
/// Open contours are closed implicitly at the next `move_to`, at `end`, and
/// before sweeping.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    cells: CellRasterizer,
    clipper: Clipper,
    fill_rule: FillRule,
    start_x: i32,
    start_y: i32,
    status: Status,
    scan_y: i32,
}

impl Rasterizer {
    /// Rasterizer clipping to the pixel area `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        let mut ras = Self::unclipped();
        ras.set_clip_box(0.0, 0.0, width as f64, height as f64);
        ras
    }

    pub fn unclipped() -> Self {
        Self {
            cells: CellRasterizer::new(),
            clipper: Clipper::new(None),
            fill_rule: FillRule::default(),
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Clip to a box in device pixels. Discards accumulated geometry.
    pub fn set_clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        let mut b = RectI::new(poly_coord(x1), poly_coord(y1), poly_coord(x2), poly_coord(y2));
        b.normalize();
        self.clipper.clip_box = Some(b);
    }

    /// Clip box in 24.8 fixed point, if any.
    pub fn clip_box(&self) -> Option<RectI> {
        self.clipper.clip_box
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    /// Discard all geometry. Clip box and fill rule are kept.
    pub fn reset(&mut self) {
        self.cells.reset();
        self.status = Status::Initial;
    }

    pub fn min_x(&self) -> i32 {
        self.cells.min_x()
    }
    pub fn min_y(&self) -> i32 {
        self.cells.min_y()
    }
    pub fn max_x(&self) -> i32 {
        self.cells.max_x()
    }
    pub fn max_y(&self) -> i32 {
        self.cells.max_y()
    }

    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.clipper
                .line_to(&mut self.cells, self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.cells.is_sorted() {
            self.reset();
        }
        self.close_polygon();
        self.start_x = poly_coord(x);
        self.start_y = poly_coord(y);
        self.clipper.move_to(self.start_x, self.start_y);
        self.status = Status::MoveTo;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        if self.status == Status::Initial {
            self.move_to_d(x, y);
            return;
        }
        self.clipper
            .line_to(&mut self.cells, poly_coord(x), poly_coord(y));
        self.status = Status::LineTo;
    }

    /// Close the last contour and sort cells. Returns `false` when there is
    /// nothing to sweep.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.close_polygon();
        self.cells.sort_cells();
        if self.cells.total_cells() == 0 {
            return false;
        }
        self.scan_y = self.cells.min_y();
        true
    }

    /// Fill `sl` with the next non-empty row of coverage. Returns `false`
    /// once every row has been swept.
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        let shift = POLY_SUBPIXEL_SHIFT + 1;
        loop {
            if self.scan_y > self.cells.max_y() {
                return false;
            }
            sl.reset_spans();

            let mut cells = self.cells.row_cells(self.scan_y).peekable();
            let mut cover = 0;
            while let Some(cell) = cells.next() {
                let x = cell.x;
                let mut area = cell.area;
                cover += cell.cover;
                while let Some(next) = cells.next_if(|c| c.x == x) {
                    area += next.area;
                    cover += next.cover;
                }

                let mut span_x = x;
                if area != 0 {
                    let alpha = coverage_alpha((cover << shift) - area, self.fill_rule);
                    if alpha != 0 {
                        sl.add_cell(x, alpha);
                    }
                    span_x = x + 1;
                }
                if let Some(next) = cells.peek() {
                    if next.x > span_x {
                        let alpha = coverage_alpha(cover << shift, self.fill_rule);
                        if alpha != 0 {
                            sl.add_span(span_x, (next.x - span_x) as u32, alpha);
                        }
                    }
                }
            }

            if sl.num_spans() > 0 {
                break;
            }
            self.scan_y += 1;
        }
        sl.finalize(self.scan_y);
        self.scan_y += 1;
        true
    }

    /// Whether pixel (`x`, `y`) receives any coverage.
    pub fn hit_test(&mut self, x: i32, y: i32) -> bool {
        self.close_polygon();
        self.cells.sort_cells();
        if self.cells.total_cells() == 0 || y < self.cells.min_y() || y > self.cells.max_y() {
            return false;
        }
        self.scan_y = y;
        let mut sl = ScanlineU8::new();
        sl.reset(self.cells.min_x(), self.cells.max_x());
        self.sweep_scanline(&mut sl) && sl.y() == y && sl.spans().any(|s| x >= s.x && x < s.x + s.len)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::unclipped()
    }
}

impl Flattener for Rasterizer {
    fn move_to(&mut self, x: f64, y: f64) {
        self.move_to_d(x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.line_to_d(x, y);
    }
    fn line_join(&mut self) {}
    fn close(&mut self) {
        self.close_polygon();
    }
    fn end(&mut self) {
        self.close_polygon();
    }
}

// ============================================================================
// Tests
// ============================================================================
