//! Curve flattening: quadratic and cubic Bézier segments and elliptical arcs.
//!
//! Bézier segments are subdivided at `t = 0.5` (De Casteljau) using an
//! explicit, fixed-size stack instead of recursion. A segment is flat enough
//! once the squared deviation of its control points from the chord, divided
//! by the squared chord length, is at most the flattening threshold. When the
//! stack is full the top segment is emitted as a line regardless, so
//! pathological input still terminates after a bounded number of steps.

use crate::math::{calc_sq_distance, VERTEX_DIST_EPSILON};

// ============================================================================
// Constants
// ============================================================================

/// Maximum subdivision depth for Bézier segments.
pub const CURVE_RECURSION_LIMIT: usize = 32;

/// Upper bound on the number of lines emitted for a single arc.
pub const ARC_MAX_STEPS: usize = 65536;

// ============================================================================
// Segments
// ============================================================================

/// Cubic Bézier control points: `[x1, y1, cx1, cy1, cx2, cy2, x2, y2]`.
pub type CubicSegment = [f64; 8];

/// Quadratic Bézier control points: `[x1, y1, cx, cy, x2, y2]`.
pub type QuadSegment = [f64; 6];

/// Receives the end point of every emitted line.
pub trait LineSink {
    fn line_to(&mut self, x: f64, y: f64);
}

impl<F: FnMut(f64, f64)> LineSink for F {
    fn line_to(&mut self, x: f64, y: f64) {
        self(x, y)
    }
}

/// Split a cubic segment at `t = 0.5`, returning `(first half, second half)`.
pub fn subdivide_cubic(c: &CubicSegment) -> (CubicSegment, CubicSegment) {
    let [x1, y1, x2, y2, x3, y3, x4, y4] = *c;
    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let x34 = (x3 + x4) / 2.0;
    let y34 = (y3 + y4) / 2.0;
    let x123 = (x12 + x23) / 2.0;
    let y123 = (y12 + y23) / 2.0;
    let x234 = (x23 + x34) / 2.0;
    let y234 = (y23 + y34) / 2.0;
    let xm = (x123 + x234) / 2.0;
    let ym = (y123 + y234) / 2.0;
    (
        [x1, y1, x12, y12, x123, y123, xm, ym],
        [xm, ym, x234, y234, x34, y34, x4, y4],
    )
}

/// Split a quadratic segment at `t = 0.5`, returning `(first half, second half)`.
pub fn subdivide_quad(c: &QuadSegment) -> (QuadSegment, QuadSegment) {
    let [x1, y1, x2, y2, x3, y3] = *c;
    let x12 = (x1 + x2) / 2.0;
    let y12 = (y1 + y2) / 2.0;
    let x23 = (x2 + x3) / 2.0;
    let y23 = (y2 + y3) / 2.0;
    let xm = (x12 + x23) / 2.0;
    let ym = (y12 + y23) / 2.0;
    ([x1, y1, x12, y12, xm, ym], [xm, ym, x23, y23, x3, y3])
}

// ============================================================================
// Bézier tracing
// ============================================================================

/// Flatness test shared by both curve orders. `deviation` is the sum of the
/// absolute cross products of the control points against the chord.
/// Non-finite deviations count as flat so that NaN or overflowing input is
/// emitted as a single line.
#[inline]
fn is_flat(deviation: f64, dx: f64, dy: f64, threshold: f64) -> bool {
    let d = deviation * deviation;
    !d.is_finite() || d <= threshold * (dx * dx + dy * dy)
}

/// Emit lines approximating a cubic Bézier. The start point is not emitted;
/// the last emitted point is the curve's end point.
pub fn trace_cubic<S: LineSink + ?Sized>(sink: &mut S, curve: &CubicSegment, threshold: f64) {
    trace_cubic_to_depth(sink, curve, threshold, CURVE_RECURSION_LIMIT);
}

/// [`trace_cubic`] with segments at depth `limit - 1` emitted unconditionally.
fn trace_cubic_to_depth<S: LineSink + ?Sized>(
    sink: &mut S,
    curve: &CubicSegment,
    threshold: f64,
    limit: usize,
) {
    let limit = limit.clamp(1, CURVE_RECURSION_LIMIT);
    let mut stack = [[0.0f64; 8]; CURVE_RECURSION_LIMIT];
    stack[0] = *curve;
    let mut i: isize = 0;

    while i >= 0 {
        let c = stack[i as usize];
        let dx = c[6] - c[0];
        let dy = c[7] - c[1];

        let flat = if dx * dx + dy * dy < VERTEX_DIST_EPSILON {
            // Closed loop: measure the control points against the end point.
            let d = calc_sq_distance(c[2], c[3], c[6], c[7])
                .max(calc_sq_distance(c[4], c[5], c[6], c[7]));
            !d.is_finite() || d <= threshold
        } else {
            let d2 = ((c[2] - c[6]) * dy - (c[3] - c[7]) * dx).abs();
            let d3 = ((c[4] - c[6]) * dy - (c[5] - c[7]) * dx).abs();
            is_flat(d2 + d3, dx, dy, threshold)
        };

        if flat || i as usize == limit - 1 {
            sink.line_to(c[6], c[7]);
            i -= 1;
        } else {
            let (first, second) = subdivide_cubic(&c);
            stack[i as usize] = second;
            stack[i as usize + 1] = first;
            i += 1;
        }
    }
}

/// Emit lines approximating a quadratic Bézier. A segment whose control
/// point lies on the chord counts as flat and is emitted as one line.
pub fn trace_quad<S: LineSink + ?Sized>(sink: &mut S, curve: &QuadSegment, threshold: f64) {
    trace_quad_to_depth(sink, curve, threshold, CURVE_RECURSION_LIMIT);
}

fn trace_quad_to_depth<S: LineSink + ?Sized>(
    sink: &mut S,
    curve: &QuadSegment,
    threshold: f64,
    limit: usize,
) {
    let limit = limit.clamp(1, CURVE_RECURSION_LIMIT);
    let mut stack = [[0.0f64; 6]; CURVE_RECURSION_LIMIT];
    stack[0] = *curve;
    let mut i: isize = 0;

    while i >= 0 {
        let c = stack[i as usize];
        let dx = c[4] - c[0];
        let dy = c[5] - c[1];

        let flat = if dx * dx + dy * dy < VERTEX_DIST_EPSILON {
            let d = calc_sq_distance(c[2], c[3], c[4], c[5]);
            !d.is_finite() || d <= threshold
        } else {
            let d = ((c[2] - c[4]) * dy - (c[3] - c[5]) * dx).abs();
            is_flat(d, dx, dy, threshold)
        };

        if flat || i as usize == limit - 1 {
            sink.line_to(c[4], c[5]);
            i -= 1;
        } else {
            let (first, second) = subdivide_quad(&c);
            stack[i as usize] = second;
            stack[i as usize + 1] = first;
            i += 1;
        }
    }
}

// ============================================================================
// Arc tracing
// ============================================================================

/// Emit lines approximating an elliptical arc and return its end point.
///
/// The angular step is chosen so that the chord error stays below 1/8 of a
/// device pixel for the average radius at the given `scale`. The start point
/// is not emitted; the last emitted point is exactly the end angle's point.
#[allow(clippy::too_many_arguments)]
pub fn trace_arc<S: LineSink + ?Sized>(
    sink: &mut S,
    x: f64,
    y: f64,
    rx: f64,
    ry: f64,
    start: f64,
    sweep: f64,
    scale: f64,
) -> (f64, f64) {
    let end = start + sweep;
    let end_x = x + end.cos() * rx;
    let end_y = y + end.sin() * ry;

    let ra = (rx.abs() + ry.abs()) / 2.0;
    if ra > 0.0 && sweep != 0.0 && sweep.is_finite() && start.is_finite() {
        let scale = if scale > 0.0 && scale.is_finite() {
            scale
        } else {
            1.0
        };
        let clockwise = sweep > 0.0;
        let min_da = sweep.abs() / ARC_MAX_STEPS as f64;
        let mut da = (ra / (ra + 0.125 / scale)).acos() * 2.0;
        if da.is_nan() || da < min_da {
            da = min_da;
        }
        if !clockwise {
            da = -da;
        }

        let mut angle = start + da;
        let mut steps = 0;
        while (angle < end - da / 4.0) == clockwise && steps < ARC_MAX_STEPS {
            sink.line_to(x + angle.cos() * rx, y + angle.sin() * ry);
            angle += da;
            steps += 1;
        }
    }

    sink.line_to(end_x, end_y);
    (end_x, end_y)
}

// ============================================================================
// Tests
// ============================================================================
