//! Stroke geometry: caps, joins and miters for offset outlines.
//!
//! All functions push the vertices of one cap or join into a caller-owned
//! `Vec<PointD>`, which is cleared first. Offsets are half the line width to
//! the left of the direction of travel, so walking a polyline forward builds
//! one side of the outline and walking it backward builds the other.

use crate::basics::{PointD, PI};
use crate::math::{calc_distance, calc_intersection, cross_product};
use crate::vertex_sequence::VertexDist;

// ============================================================================
// Enums
// ============================================================================

/// Shape of open sub-path ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Square end flush with the end point.
    #[default]
    Butt,
    /// Square end extending half the width past the end point.
    Square,
    /// Semicircular end.
    Round,
}

/// Shape of outer corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner, clipped when it would exceed the miter limit.
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Inner corners are always mitered, falling back to a bevel when the
/// miter point would overshoot this multiple of the half width.
const INNER_MITER_LIMIT: f64 = 1.01;

// ============================================================================
// MathStroke
// ============================================================================

/// Cap and join calculator for a given width and style.
#[derive(Debug, Clone)]
pub struct MathStroke {
    half_width: f64,
    width_eps: f64,
    miter_limit: f64,
    approx_scale: f64,
    line_cap: LineCap,
    line_join: LineJoin,
}

impl MathStroke {
    pub fn new(width: f64, line_cap: LineCap, line_join: LineJoin, miter_limit: f64) -> Self {
        let half_width = width.abs() * 0.5;
        Self {
            half_width,
            width_eps: half_width / 1024.0,
            miter_limit,
            approx_scale: 1.0,
            line_cap,
            line_join,
        }
    }

    /// Device pixels per user unit; controls the step of round caps/joins.
    pub fn with_approximation_scale(mut self, s: f64) -> Self {
        if s > 0.0 && s.is_finite() {
            self.approx_scale = s;
        }
        self
    }

    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    /// Angular step for round caps and joins.
    fn round_step(&self) -> f64 {
        let w = self.half_width;
        (w / (w + 0.125 / self.approx_scale)).acos() * 2.0
    }

    /// Cap at `v0`, the end of the segment `v1 -> v0` of length `len`.
    pub fn calc_cap(&self, vc: &mut Vec<PointD>, v0: &VertexDist, v1: &VertexDist, len: f64) {
        vc.clear();
        let w = self.half_width;
        let dx1 = (v1.y - v0.y) / len * w;
        let dy1 = (v1.x - v0.x) / len * w;

        match self.line_cap {
            LineCap::Butt | LineCap::Square => {
                let (dx2, dy2) = if self.line_cap == LineCap::Square {
                    (dy1, dx1)
                } else {
                    (0.0, 0.0)
                };
                vc.push(PointD::new(v0.x - dx1 - dx2, v0.y + dy1 - dy2));
                vc.push(PointD::new(v0.x + dx1 - dx2, v0.y - dy1 - dy2));
            }
            LineCap::Round => {
                let n = (PI / self.round_step()) as i32;
                let da = PI / (n + 1) as f64;
                vc.push(PointD::new(v0.x - dx1, v0.y + dy1));
                let mut a = dy1.atan2(-dx1) + da;
                for _ in 0..n {
                    vc.push(PointD::new(v0.x + a.cos() * w, v0.y + a.sin() * w));
                    a += da;
                }
                vc.push(PointD::new(v0.x + dx1, v0.y - dy1));
            }
        }
    }

    /// Join at `v1` between the segments `v0 -> v1` (length `len1`) and
    /// `v1 -> v2` (length `len2`).
    pub fn calc_join(
        &self,
        vc: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        len1: f64,
        len2: f64,
    ) {
        let w = self.half_width;
        let dx1 = w * (v1.y - v0.y) / len1;
        let dy1 = w * (v1.x - v0.x) / len1;
        let dx2 = w * (v2.y - v1.y) / len2;
        let dy2 = w * (v2.x - v1.x) / len2;
        let offsets = [dx1, dy1, dx2, dy2];

        vc.clear();

        let cp = cross_product(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
        if cp > 0.0 {
            // inner corner
            let limit = (len1.min(len2) / w).max(INNER_MITER_LIMIT);
            self.calc_miter(vc, v0, v1, v2, offsets, Fallback::Bevel, limit, 0.0);
            return;
        }

        let dx = (dx1 + dx2) / 2.0;
        let dy = (dy1 + dy2) / 2.0;
        let dbevel = (dx * dx + dy * dy).sqrt();

        if self.line_join != LineJoin::Miter && self.approx_scale * (w - dbevel) < self.width_eps {
            // Nearly collinear: a single point is indistinguishable from
            // the round or bevel shape.
            match calc_intersection(
                v0.x + dx1,
                v0.y - dy1,
                v1.x + dx1,
                v1.y - dy1,
                v1.x + dx2,
                v1.y - dy2,
                v2.x + dx2,
                v2.y - dy2,
            ) {
                Some((ix, iy)) => vc.push(PointD::new(ix, iy)),
                None => vc.push(PointD::new(v1.x + dx1, v1.y - dy1)),
            }
            return;
        }

        match self.line_join {
            LineJoin::Miter => {
                self.calc_miter(
                    vc,
                    v0,
                    v1,
                    v2,
                    offsets,
                    Fallback::Clip,
                    self.miter_limit,
                    dbevel,
                );
            }
            LineJoin::Round => {
                self.calc_arc(vc, v1.x, v1.y, dx1, -dy1, dx2, -dy2);
            }
            LineJoin::Bevel => {
                vc.push(PointD::new(v1.x + dx1, v1.y - dy1));
                vc.push(PointD::new(v1.x + dx2, v1.y - dy2));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_arc(
        &self,
        vc: &mut Vec<PointD>,
        x: f64,
        y: f64,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
    ) {
        let w = self.half_width;
        let mut a1 = dy1.atan2(dx1);
        let mut a2 = dy2.atan2(dx2);
        if a1 > a2 {
            a2 += 2.0 * PI;
        }
        let n = ((a2 - a1) / self.round_step()) as i32;
        let da = (a2 - a1) / (n + 1) as f64;

        vc.push(PointD::new(x + dx1, y + dy1));
        a1 += da;
        for _ in 0..n {
            vc.push(PointD::new(x + a1.cos() * w, y + a1.sin() * w));
            a1 += da;
        }
        vc.push(PointD::new(x + dx2, y + dy2));
    }

    #[allow(clippy::too_many_arguments)]
    fn calc_miter(
        &self,
        vc: &mut Vec<PointD>,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        [dx1, dy1, dx2, dy2]: [f64; 4],
        fallback: Fallback,
        mlimit: f64,
        dbevel: f64,
    ) {
        let lim = self.half_width * mlimit;

        let intersection = calc_intersection(
            v0.x + dx1,
            v0.y - dy1,
            v1.x + dx1,
            v1.y - dy1,
            v1.x + dx2,
            v1.y - dy2,
            v2.x + dx2,
            v2.y - dy2,
        );

        let (xi, yi, di) = match intersection {
            Some((xi, yi)) => {
                let di = calc_distance(v1.x, v1.y, xi, yi);
                if di <= lim {
                    vc.push(PointD::new(xi, yi));
                    return;
                }
                (xi, yi, di)
            }
            None => {
                // Parallel offsets: the segments are collinear, either
                // continuing straight or folding back on themselves.
                let x2 = v1.x + dx1;
                let y2 = v1.y - dy1;
                if (cross_product(v0.x, v0.y, v1.x, v1.y, x2, y2) < 0.0)
                    == (cross_product(v1.x, v1.y, v2.x, v2.y, x2, y2) < 0.0)
                {
                    vc.push(PointD::new(x2, y2));
                } else if fallback == Fallback::Bevel {
                    vc.push(PointD::new(x2, y2));
                    vc.push(PointD::new(v1.x + dx2, v1.y - dy2));
                } else {
                    vc.push(PointD::new(v1.x + dx1 + dy1 * mlimit, v1.y - dy1 + dx1 * mlimit));
                    vc.push(PointD::new(v1.x + dx2 - dy2 * mlimit, v1.y - dy2 - dx2 * mlimit));
                }
                return;
            }
        };

        let x1 = v1.x + dx1;
        let y1 = v1.y - dy1;
        let x2 = v1.x + dx2;
        let y2 = v1.y - dy2;
        match fallback {
            Fallback::Bevel => {
                vc.push(PointD::new(x1, y1));
                vc.push(PointD::new(x2, y2));
            }
            Fallback::Clip => {
                let k = (lim - dbevel) / (di - dbevel);
                vc.push(PointD::new(x1 + (xi - x1) * k, y1 + (yi - y1) * k));
                vc.push(PointD::new(x2 + (xi - x2) * k, y2 + (yi - y2) * k));
            }
        }
    }
}

/// What a miter turns into once it exceeds its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Bevel,
    Clip,
}

// ============================================================================
// Tests
// ============================================================================
