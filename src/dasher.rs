//! Dash segmentation.
//!
//! [`DashVertexConverter`] sits in front of the stroker. It walks every
//! sub-path by arc length and forwards only the "on" runs of the dash
//! pattern, each as an open sub-path of its own. The pattern restarts at the
//! offset phase on every `move_to`. Closed sub-paths are dashed including the
//! closing edge, which the flattener emits as a regular `line_to`.

use log::warn;

use crate::flatten::Flattener;
use crate::math::{calc_distance, VERTEX_DIST_EPSILON};

/// Upper bound on dash transitions within one segment.
const MAX_DASH_STEPS: usize = 1 << 20;

// ============================================================================
// DashPattern
// ============================================================================

/// Validated dash lengths: alternating on/off runs, even count, positive
/// total length.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    dashes: Vec<f64>,
    total: f64,
}

impl DashPattern {
    /// Build a pattern from `dashes`. An odd-length list is repeated once so
    /// on and off runs keep alternating. Returns `None`, with a warning,
    /// for an empty list, negative or non-finite lengths, or a zero total.
    pub fn new(dashes: &[f64]) -> Option<Self> {
        if dashes.is_empty() {
            return None;
        }
        if dashes.iter().any(|d| !d.is_finite() || *d < 0.0) {
            warn!("ignoring dash pattern with negative or non-finite lengths: {dashes:?}");
            return None;
        }
        let mut v = dashes.to_vec();
        if v.len() % 2 == 1 {
            v.extend_from_slice(dashes);
        }
        let total: f64 = v.iter().sum();
        if total <= 0.0 {
            warn!("ignoring dash pattern with zero total length: {dashes:?}");
            return None;
        }
        Some(Self { dashes: v, total })
    }

    pub fn dashes(&self) -> &[f64] {
        &self.dashes
    }

    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Dash index and distance already consumed within it at phase `offset`.
    fn start(&self, offset: f64) -> (usize, f64) {
        let mut ds = if offset.is_finite() {
            offset.rem_euclid(self.total)
        } else {
            0.0
        };
        let mut i = 0;
        while ds > 0.0 && i < self.dashes.len() {
            if ds > self.dashes[i] {
                ds -= self.dashes[i];
                i += 1;
            } else {
                return (i, ds);
            }
        }
        (i % self.dashes.len(), 0.0)
    }
}

// ============================================================================
// DashVertexConverter
// ============================================================================

pub struct DashVertexConverter<F: Flattener> {
    next: F,
    pattern: DashPattern,
    offset: f64,
    curr_dash: usize,
    curr_dash_start: f64,
    x: f64,
    y: f64,
    started: bool,
    drawing: bool,
}

impl<F: Flattener> DashVertexConverter<F> {
    pub fn new(pattern: DashPattern, offset: f64, next: F) -> Self {
        Self {
            next,
            pattern,
            offset,
            curr_dash: 0,
            curr_dash_start: 0.0,
            x: 0.0,
            y: 0.0,
            started: false,
            drawing: false,
        }
    }

    pub fn into_inner(self) -> F {
        self.next
    }

    #[inline]
    fn is_on(&self) -> bool {
        self.curr_dash % 2 == 0
    }

    fn advance_dash(&mut self) {
        self.curr_dash = (self.curr_dash + 1) % self.pattern.dashes.len();
        self.curr_dash_start = 0.0;
    }

    fn finish_run(&mut self) {
        if self.drawing {
            self.next.end();
            self.drawing = false;
        }
    }
}

impl<F: Flattener> Flattener for DashVertexConverter<F> {
    fn move_to(&mut self, x: f64, y: f64) {
        self.finish_run();
        (self.curr_dash, self.curr_dash_start) = self.pattern.start(self.offset);
        self.x = x;
        self.y = y;
        self.started = true;
        if self.is_on() {
            self.next.move_to(x, y);
            self.drawing = true;
        }
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if !self.started {
            self.move_to(x, y);
            return;
        }
        let (x0, y0) = (self.x, self.y);
        let len = calc_distance(x0, y0, x, y);
        if !(len > VERTEX_DIST_EPSILON) {
            return;
        }
        self.x = x;
        self.y = y;

        let mut rest = len;
        let mut steps = 0;
        loop {
            let dash_rest = self.pattern.dashes[self.curr_dash] - self.curr_dash_start;
            if rest <= dash_rest || steps >= MAX_DASH_STEPS {
                self.curr_dash_start += rest;
                if self.drawing {
                    self.next.line_to(x, y);
                }
                break;
            }
            rest -= dash_rest;
            steps += 1;
            let px = x - (x - x0) * rest / len;
            let py = y - (y - y0) * rest / len;
            if self.is_on() {
                if self.drawing {
                    self.next.line_to(px, py);
                }
                self.finish_run();
            } else {
                self.next.move_to(px, py);
                self.drawing = true;
            }
            self.advance_dash();
        }
    }

    fn line_join(&mut self) {}

    fn close(&mut self) {}

    fn end(&mut self) {
        self.finish_run();
        self.started = false;
    }
}

// ============================================================================
// Tests
// ============================================================================
