//! Edge-to-cell conversion.
//!
//! Line segments in 24.8 fixed-point device coordinates are decomposed into
//! pixel cells. Each cell accumulates `cover` (the net height of edges
//! crossing it) and `area` (twice the signed area of those edge fragments to
//! the left of the cell's right border). The sweep in
//! [`Rasterizer`](crate::rasterizer::Rasterizer) turns them into coverage.

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

const SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// Segments wider than this are split before cell generation.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

// ============================================================================
// Cell
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl Cell {
    const UNSET: Cell = Cell {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };

    #[inline]
    fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::UNSET
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Row {
    start: u32,
    num: u32,
}

// ============================================================================
// CellRasterizer
// ============================================================================

/// Accumulates cells for a set of edges, then sorts them by row and column.
#[derive(Debug, Clone)]
pub struct CellRasterizer {
    cells: Vec<Cell>,
    sorted: Vec<u32>,
    rows: Vec<Row>,
    curr: Cell,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    is_sorted: bool,
}

impl CellRasterizer {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            sorted: Vec::new(),
            rows: Vec::new(),
            curr: Cell::UNSET,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            is_sorted: false,
        }
    }

    /// Drop all cells, keeping allocations.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.sorted.clear();
        self.rows.clear();
        self.curr = Cell::UNSET;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.is_sorted = false;
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    #[inline]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    /// Cells of row `y` ordered by `x`. Only meaningful after
    /// [`sort_cells`](Self::sort_cells); rows outside the bounds are empty.
    pub fn row_cells(&self, y: i32) -> impl Iterator<Item = &Cell> + '_ {
        let range = if self.is_sorted && y >= self.min_y && y <= self.max_y {
            let r = self.rows[(y - self.min_y) as usize];
            r.start as usize..(r.start + r.num) as usize
        } else {
            0..0
        };
        self.sorted[range].iter().map(|&i| &self.cells[i as usize])
    }

    #[inline]
    fn add_curr_cell(&mut self) {
        if self.curr.area | self.curr.cover != 0 {
            self.cells.push(self.curr);
        }
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if !self.curr.is_at(x, y) {
            self.add_curr_cell();
            self.curr = Cell {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    /// Edge fragment within row `ey`; `y1`, `y2` are sub-pixel offsets in
    /// the row.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & MASK;
        let fx2 = x2 & MASK;

        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr.cover += delta;
            self.curr.area += (fx1 + fx2) * delta;
            return;
        }

        let mut p = (SCALE - fx1) as i64 * (y2 - y1) as i64;
        let mut first = SCALE;
        let mut incr = 1;
        let mut dx = x2 as i64 - x1 as i64;

        if dx < 0 {
            p = fx1 as i64 * (y2 - y1) as i64;
            first = 0;
            incr = -1;
            dx = -dx;
        }

        let mut delta = (p / dx) as i32;
        let mut modulo = p % dx;
        if modulo < 0 {
            delta -= 1;
            modulo += dx;
        }

        self.curr.cover += delta;
        self.curr.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            p = SCALE as i64 * (y2 - y + delta) as i64;
            let mut lift = (p / dx) as i32;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.curr.cover += delta;
                self.curr.area += SCALE * delta;
                y += delta;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }

        delta = y2 - y;
        self.curr.cover += delta;
        self.curr.area += (fx2 + SCALE - first) * delta;
    }

    fn extend_bounds(&mut self, ex: i32, ey: i32) {
        self.min_x = self.min_x.min(ex);
        self.max_x = self.max_x.max(ex);
        self.min_y = self.min_y.min(ey);
        self.max_y = self.max_y.max(ey);
    }

    /// Add an edge in 24.8 fixed point.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }
        if self.is_sorted {
            self.reset();
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & MASK;
        let fy2 = y2 & MASK;

        self.extend_bounds(ex1, ey1);
        self.extend_bounds(ex2, ey2);

        self.set_curr_cell(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let mut incr = 1;

        // Vertical edge: one cell per row, no hline walk.
        if dx == 0 {
            let two_fx = (x1 - (ex1 << POLY_SUBPIXEL_SHIFT)) << 1;
            let mut first = SCALE;
            if dy < 0 {
                first = 0;
                incr = -1;
            }

            let mut delta = first - fy1;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;

            ey1 += incr;
            self.set_curr_cell(ex1, ey1);

            delta = first + first - SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr.cover = delta;
                self.curr.area = area;
                ey1 += incr;
                self.set_curr_cell(ex1, ey1);
            }
            delta = fy2 - SCALE + first;
            self.curr.cover += delta;
            self.curr.area += two_fx * delta;
            return;
        }

        let mut p = (SCALE - fy1) as i64 * dx;
        let mut first = SCALE;
        let mut dy_abs = dy;
        if dy < 0 {
            p = fy1 as i64 * dx;
            first = 0;
            incr = -1;
            dy_abs = -dy;
        }

        let mut delta = (p / dy_abs) as i32;
        let mut modulo = p % dy_abs;
        if modulo < 0 {
            delta -= 1;
            modulo += dy_abs;
        }

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);

        ey1 += incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            p = SCALE as i64 * dx;
            let mut lift = (p / dy_abs) as i32;
            let mut rem = p % dy_abs;
            if rem < 0 {
                lift -= 1;
                rem += dy_abs;
            }
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SCALE - first, x_to, first);
                x_from = x_to;

                ey1 += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, SCALE - first, x2, fy2);
    }

    /// Flush the pending cell and bucket all cells by row, then by column.
    /// Calling it again before new edges arrive is a no-op.
    pub fn sort_cells(&mut self) {
        if self.is_sorted {
            return;
        }
        self.add_curr_cell();
        self.curr = Cell::UNSET;

        if self.cells.is_empty() {
            return;
        }

        self.sorted.clear();
        self.sorted.resize(self.cells.len(), 0);
        self.rows.clear();
        self.rows
            .resize((self.max_y - self.min_y + 1) as usize, Row::default());

        for cell in &self.cells {
            self.rows[(cell.y - self.min_y) as usize].start += 1;
        }

        let mut start = 0;
        for row in &mut self.rows {
            let count = row.start;
            row.start = start;
            start += count;
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let row = &mut self.rows[(cell.y - self.min_y) as usize];
            self.sorted[(row.start + row.num) as usize] = i as u32;
            row.num += 1;
        }

        let cells = &self.cells;
        for row in &self.rows {
            let slice = &mut self.sorted[row.start as usize..(row.start + row.num) as usize];
            slice.sort_unstable_by_key(|&i| cells[i as usize].x);
        }

        self.is_sorted = true;
    }
}

impl Default for CellRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
