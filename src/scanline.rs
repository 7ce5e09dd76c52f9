//! Scanline containers: one row of coverage handed from the rasterizer to a
//! painter.

// ============================================================================
// Scanline
// ============================================================================

/// Receiver of one row of coverage from
/// [`Rasterizer::sweep_scanline`](crate::rasterizer::Rasterizer::sweep_scanline).
///
/// Cells and spans arrive with strictly increasing `x`.
pub trait Scanline {
    /// Start a new row.
    fn reset_spans(&mut self);

    /// One pixel at `x` with coverage `cover`.
    fn add_cell(&mut self, x: i32, cover: u32);

    /// `len` pixels from `x`, all with coverage `cover`.
    fn add_span(&mut self, x: i32, len: u32, cover: u32);

    /// Set the row's `y`.
    fn finalize(&mut self, y: i32);

    fn num_spans(&self) -> usize;

    fn y(&self) -> i32;
}

// ============================================================================
// ScanlineU8
// ============================================================================

/// A run of adjacent pixels; its coverage bytes live in the scanline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanlineSpan {
    pub x: i32,
    pub len: i32,
    cover_offset: usize,
}

/// Scanline storing one coverage byte per pixel.
///
/// [`reset`](Self::reset) sizes it for an x range; every cell and span
/// added afterwards must fall within that range.
#[derive(Debug, Clone, Default)]
pub struct ScanlineU8 {
    min_x: i32,
    last_x: Option<i32>,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<ScanlineSpan>,
}

impl ScanlineU8 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare for rows spanning `min_x..=max_x`.
    pub fn reset(&mut self, min_x: i32, max_x: i32) {
        let len = (max_x as i64 - min_x as i64 + 2).max(0) as usize;
        if len > self.covers.len() {
            self.covers.resize(len, 0);
        }
        self.min_x = min_x;
        self.reset_spans();
    }

    pub fn spans(&self) -> impl Iterator<Item = ScanlineSpan> + '_ {
        self.spans.iter().copied()
    }

    /// Coverage bytes of `span`.
    pub fn span_covers(&self, span: &ScanlineSpan) -> &[u8] {
        &self.covers[span.cover_offset..span.cover_offset + span.len as usize]
    }

    fn push(&mut self, x: i32, len: i32, offset: usize) {
        match self.spans.last_mut() {
            Some(last) if self.last_x == Some(x - 1) => last.len += len,
            _ => self.spans.push(ScanlineSpan {
                x,
                len,
                cover_offset: offset,
            }),
        }
        self.last_x = Some(x + len - 1);
    }
}

impl Scanline for ScanlineU8 {
    fn reset_spans(&mut self) {
        self.last_x = None;
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        let offset = (x - self.min_x) as usize;
        self.covers[offset] = cover as u8;
        self.push(x, 1, offset);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let offset = (x - self.min_x) as usize;
        self.covers[offset..offset + len as usize].fill(cover as u8);
        self.push(x, len as i32, offset);
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn num_spans(&self) -> usize {
        self.spans.len()
    }

    fn y(&self) -> i32 {
        self.y
    }
}

// ============================================================================
// Tests
// ============================================================================
