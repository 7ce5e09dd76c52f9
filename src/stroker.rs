//! Line stroker: turns flattened center lines into closed fill outlines.
//!
//! The stroker is a [`Flattener`] sink. It buffers one sub-path at a time and,
//! when the sub-path ends, emits its outline to the downstream sink:
//!
//! - an open sub-path becomes one closed polygon: start cap, the left side
//!   walked forward, end cap, the right side walked backward;
//! - a closed sub-path becomes two closed loops, one per side, with joins at
//!   every vertex including the closing one.
//!
//! The outlines overlap themselves at joins and caps, so they must be
//! rasterized with the nonzero winding rule.

use crate::basics::PointD;
use crate::flatten::Flattener;
use crate::math_stroke::{LineCap, LineJoin, MathStroke};
use crate::vertex_sequence::VertexSequence;

// ============================================================================
// StrokeStyle
// ============================================================================

/// Width, cap, join and miter limit of a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
        }
    }
}

// ============================================================================
// LineStroker
// ============================================================================

pub struct LineStroker<F: Flattener> {
    next: F,
    math: MathStroke,
    vertices: VertexSequence,
    closed: bool,
    out: Vec<PointD>,
    outline: Vec<PointD>,
}

impl<F: Flattener> LineStroker<F> {
    /// Stroker feeding `next`. `approximation_scale` is the device scale of
    /// the coordinates it receives.
    pub fn new(style: &StrokeStyle, approximation_scale: f64, next: F) -> Self {
        Self {
            next,
            math: MathStroke::new(style.width, style.cap, style.join, style.miter_limit)
                .with_approximation_scale(approximation_scale),
            vertices: VertexSequence::new(),
            closed: false,
            out: Vec::new(),
            outline: Vec::new(),
        }
    }

    pub fn into_inner(self) -> F {
        self.next
    }

    fn flush(&mut self) {
        self.vertices.close(self.closed);
        if self.vertices.len() >= 2 {
            if self.vertices.is_closed() {
                self.stroke_closed();
            } else {
                self.stroke_open();
            }
            self.next.end();
        }
        self.vertices.clear();
        self.closed = false;
    }

    fn stroke_open(&mut self) {
        let v = &self.vertices;
        let n = v.len();
        self.outline.clear();

        self.math.calc_cap(&mut self.out, &v[0], &v[1], v[0].dist);
        self.outline.extend_from_slice(&self.out);
        for i in 1..n - 1 {
            self.math
                .calc_join(&mut self.out, &v[i - 1], &v[i], &v[i + 1], v[i - 1].dist, v[i].dist);
            self.outline.extend_from_slice(&self.out);
        }
        self.math
            .calc_cap(&mut self.out, &v[n - 1], &v[n - 2], v[n - 2].dist);
        self.outline.extend_from_slice(&self.out);
        for i in (1..n - 1).rev() {
            self.math
                .calc_join(&mut self.out, &v[i + 1], &v[i], &v[i - 1], v[i].dist, v[i - 1].dist);
            self.outline.extend_from_slice(&self.out);
        }
        emit_polygon(&mut self.next, &self.outline);
    }

    fn stroke_closed(&mut self) {
        let v = &self.vertices;
        let n = v.len();

        self.outline.clear();
        for i in 0..n {
            let prev = v.prev(i);
            self.math
                .calc_join(&mut self.out, prev, &v[i], v.next(i), prev.dist, v[i].dist);
            self.outline.extend_from_slice(&self.out);
        }
        emit_polygon(&mut self.next, &self.outline);

        self.outline.clear();
        for i in (0..n).rev() {
            let prev = v.prev(i);
            self.math
                .calc_join(&mut self.out, v.next(i), &v[i], prev, v[i].dist, prev.dist);
            self.outline.extend_from_slice(&self.out);
        }
        emit_polygon(&mut self.next, &self.outline);
    }
}

fn emit_polygon<F: Flattener>(next: &mut F, points: &[PointD]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    next.move_to(first.x, first.y);
    for p in rest {
        next.line_to(p.x, p.y);
    }
    next.close();
}

impl<F: Flattener> Flattener for LineStroker<F> {
    fn move_to(&mut self, x: f64, y: f64) {
        if !self.vertices.is_empty() {
            self.flush();
        }
        self.vertices.add(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.add(x, y);
    }

    fn line_join(&mut self) {}

    fn close(&mut self) {
        self.closed = true;
    }

    fn end(&mut self) {
        self.flush();
    }
}

// ============================================================================
// Tests
// ============================================================================
