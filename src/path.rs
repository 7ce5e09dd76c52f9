//! Path: an ordered list of drawing components over a flat coordinate buffer.
//!
//! Each [`Component`] consumes a fixed number of `(x, y)` pairs from
//! [`Path::points`]; the arity table is [`Component::arity`]. A non-empty path
//! always starts with `MoveTo`: drawing calls issued on an empty path first
//! insert an implicit `MoveTo` at the current pen position.

use std::fmt;

use crate::basics::RectD;

// ============================================================================
// Components
// ============================================================================

/// Kind of a path component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Start a new sub-path at `(x, y)`.
    MoveTo,
    /// Straight line to `(x, y)`.
    LineTo,
    /// Quadratic Bézier: control point, end point.
    QuadCurveTo,
    /// Cubic Bézier: two control points, end point.
    CubicCurveTo,
    /// Elliptical arc: center, radii, (start angle, sweep angle).
    ArcTo,
    /// Close the current sub-path back to its start.
    Close,
}

impl Component {
    /// Number of `(x, y)` pairs the component consumes.
    pub const fn arity(self) -> usize {
        match self {
            Component::MoveTo | Component::LineTo => 1,
            Component::QuadCurveTo => 2,
            Component::CubicCurveTo | Component::ArcTo => 3,
            Component::Close => 0,
        }
    }
}

// ============================================================================
// PathBuilder
// ============================================================================

/// Something that accepts path drawing calls.
pub trait PathBuilder {
    /// Current pen position.
    fn last_point(&self) -> (f64, f64);

    /// Start a new sub-path.
    fn move_to(&mut self, x: f64, y: f64);

    /// Straight line from the pen to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64);

    /// Quadratic Bézier from the pen through control `(cx, cy)` to `(x, y)`.
    fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);

    /// Cubic Bézier from the pen to `(x, y)`.
    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64);

    /// Elliptical arc around `(cx, cy)` from `start_angle` sweeping
    /// `sweep_angle` radians. A line (or move, on an empty path) to the arc's
    /// start point is issued first.
    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64);

    /// Close the current sub-path.
    fn close(&mut self);
}

// ============================================================================
// Path
// ============================================================================

/// Mutable path owned by its builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    components: Vec<Component>,
    points: Vec<f64>,
    x: f64,
    y: f64,
    start_x: f64,
    start_y: f64,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Flat `x, y, x, y, ...` coordinate buffer.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Remove all components, keeping the allocations.
    pub fn clear(&mut self) {
        self.components.clear();
        self.points.clear();
        self.x = 0.0;
        self.y = 0.0;
        self.start_x = 0.0;
        self.start_y = 0.0;
    }

    /// Independent copy of the path.
    pub fn copy(&self) -> Path {
        self.clone()
    }

    /// Iterate components with their coordinate slices.
    pub fn iter(&self) -> PathIter<'_> {
        PathIter {
            path: self,
            component: 0,
            point: 0,
        }
    }

    fn push(&mut self, c: Component, coords: &[f64]) {
        debug_assert_eq!(coords.len(), c.arity() * 2);
        self.components.push(c);
        self.points.extend_from_slice(coords);
    }

    fn ensure_started(&mut self) {
        if self.is_empty() {
            let (x, y) = (self.x, self.y);
            self.move_to(x, y);
        }
    }

    /// Mirror every y coordinate (`y -> -y`). Arc angles are negated so the
    /// arcs mirror too.
    pub fn vertical_flip(&mut self) {
        let mut i = 0;
        for c in &self.components {
            match c {
                Component::ArcTo => {
                    // center y, then the two angles; radii stay positive
                    self.points[i + 1] = -self.points[i + 1];
                    self.points[i + 4] = -self.points[i + 4];
                    self.points[i + 5] = -self.points[i + 5];
                }
                _ => {
                    for k in 0..c.arity() {
                        let yi = i + k * 2 + 1;
                        self.points[yi] = -self.points[yi];
                    }
                }
            }
            i += c.arity() * 2;
        }
        self.y = -self.y;
        self.start_y = -self.start_y;
    }

    /// Bounding box of the raw coordinates (control points included, arcs
    /// expanded to their full ellipse box). `None` for an empty path.
    pub fn bounding_rect(&self) -> Option<RectD> {
        if self.is_empty() {
            return None;
        }
        let mut r = RectD::empty();
        for (c, pts) in self.iter() {
            match c {
                Component::ArcTo => {
                    let (cx, cy, rx, ry) = (pts[0], pts[1], pts[2].abs(), pts[3].abs());
                    r.expand(cx - rx, cy - ry);
                    r.expand(cx + rx, cy + ry);
                }
                _ => {
                    for p in pts.chunks_exact(2) {
                        r.expand(p[0], p[1]);
                    }
                }
            }
        }
        r.is_valid().then_some(r)
    }
}

impl PathBuilder for Path {
    fn last_point(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(Component::MoveTo, &[x, y]);
        self.x = x;
        self.y = y;
        self.start_x = x;
        self.start_y = y;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ensure_started();
        self.push(Component::LineTo, &[x, y]);
        self.x = x;
        self.y = y;
    }

    fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.ensure_started();
        self.push(Component::QuadCurveTo, &[cx, cy, x, y]);
        self.x = x;
        self.y = y;
    }

    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64) {
        self.ensure_started();
        self.push(Component::CubicCurveTo, &[cx1, cy1, cx2, cy2, x, y]);
        self.x = x;
        self.y = y;
    }

    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64) {
        let end_angle = start_angle + sweep_angle;
        let start_x = cx + start_angle.cos() * rx;
        let start_y = cy + start_angle.sin() * ry;
        if self.is_empty() {
            self.move_to(start_x, start_y);
        } else {
            self.line_to(start_x, start_y);
        }
        self.push(
            Component::ArcTo,
            &[cx, cy, rx, ry, start_angle, sweep_angle],
        );
        self.x = cx + end_angle.cos() * rx;
        self.y = cy + end_angle.sin() * ry;
    }

    fn close(&mut self) {
        if self.is_empty() {
            return;
        }
        self.push(Component::Close, &[]);
        self.x = self.start_x;
        self.y = self.start_y;
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (c, pts) in self.iter() {
            write!(f, "{c:?}:")?;
            for (i, v) in pts.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{sep}{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// PathIter
// ============================================================================

/// Iterator over `(component, coordinates)` pairs of a [`Path`].
pub struct PathIter<'a> {
    path: &'a Path,
    component: usize,
    point: usize,
}

impl<'a> Iterator for PathIter<'a> {
    type Item = (Component, &'a [f64]);

    fn next(&mut self) -> Option<Self::Item> {
        let c = *self.path.components.get(self.component)?;
        let n = c.arity() * 2;
        let pts = &self.path.points[self.point..self.point + n];
        self.component += 1;
        self.point += n;
        Some((c, pts))
    }
}

// ============================================================================
// Tests
// ============================================================================
