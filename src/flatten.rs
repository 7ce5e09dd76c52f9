//! Path flattening and the line-level sink pipeline.
//!
//! [`flatten`] walks a [`Path`] and reduces every component to `move_to` /
//! `line_to` events on a [`Flattener`]. Sinks are chained: a [`Transformer`]
//! maps user space to device space, a [`DemuxFlattener`] fans one walk out to
//! several consumers, and the stroker, dasher and rasterizer sit at the ends.

use crate::basics::{PointD, RectD};
use crate::curves::{trace_arc, trace_cubic, trace_quad};
use crate::path::{Component, Path};
use crate::trans_affine::TransAffine;

/// Default flattening tolerance (squared deviation, in device pixels).
pub const DEFAULT_FLATNESS_TOLERANCE: f64 = 0.5;

// ============================================================================
// Flattener
// ============================================================================

/// Receiver of flattened geometry.
///
/// A sub-path is a `move_to` followed by `line_to`s, optionally a `close`,
/// and is terminated by `end`. `line_join` marks a vertex where two path
/// components meet (as opposed to a vertex produced inside a curve).
pub trait Flattener {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn line_join(&mut self);
    fn close(&mut self);
    fn end(&mut self);
}

impl<F: Flattener + ?Sized> Flattener for &mut F {
    fn move_to(&mut self, x: f64, y: f64) {
        (**self).move_to(x, y)
    }
    fn line_to(&mut self, x: f64, y: f64) {
        (**self).line_to(x, y)
    }
    fn line_join(&mut self) {
        (**self).line_join()
    }
    fn close(&mut self) {
        (**self).close()
    }
    fn end(&mut self) {
        (**self).end()
    }
}

/// Walk `path` into `sink`.
///
/// `scale` is the user-to-device scale of the transform the sink applies; it
/// tightens the curve threshold so the tolerance holds in device space, and
/// sets the arc step. `tolerance` is the allowed squared deviation in device
/// pixels; anything but a positive finite value falls back to
/// [`DEFAULT_FLATNESS_TOLERANCE`].
pub fn flatten<F: Flattener + ?Sized>(path: &Path, sink: &mut F, scale: f64, tolerance: f64) {
    if path.is_empty() {
        return;
    }
    let scale = if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    };
    let tolerance = if tolerance > 0.0 && tolerance.is_finite() {
        tolerance
    } else {
        DEFAULT_FLATNESS_TOLERANCE
    };
    let threshold = tolerance / (scale * scale);

    let (mut start_x, mut start_y) = (0.0, 0.0);
    let (mut x, mut y) = (0.0, 0.0);
    let mut first = true;

    for (c, p) in path.iter() {
        match c {
            Component::MoveTo => {
                if !first {
                    sink.end();
                }
                first = false;
                x = p[0];
                y = p[1];
                start_x = x;
                start_y = y;
                sink.move_to(x, y);
            }
            Component::LineTo => {
                x = p[0];
                y = p[1];
                sink.line_to(x, y);
                sink.line_join();
            }
            Component::QuadCurveTo => {
                let curve = [x, y, p[0], p[1], p[2], p[3]];
                trace_quad(&mut |lx, ly| sink.line_to(lx, ly), &curve, threshold);
                x = p[2];
                y = p[3];
                sink.line_to(x, y);
            }
            Component::CubicCurveTo => {
                let curve = [x, y, p[0], p[1], p[2], p[3], p[4], p[5]];
                trace_cubic(&mut |lx, ly| sink.line_to(lx, ly), &curve, threshold);
                x = p[4];
                y = p[5];
                sink.line_to(x, y);
            }
            Component::ArcTo => {
                (x, y) = trace_arc(
                    &mut |lx, ly| sink.line_to(lx, ly),
                    p[0],
                    p[1],
                    p[2],
                    p[3],
                    p[4],
                    p[5],
                    scale,
                );
            }
            Component::Close => {
                sink.line_to(start_x, start_y);
                sink.close();
                x = start_x;
                y = start_y;
            }
        }
    }
    sink.end();
}

// ============================================================================
// Transformer
// ============================================================================

/// Applies an affine matrix to every point before forwarding it.
pub struct Transformer<F: Flattener> {
    matrix: TransAffine,
    inner: F,
}

impl<F: Flattener> Transformer<F> {
    pub fn new(matrix: TransAffine, inner: F) -> Self {
        Self { matrix, inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Flattener> Flattener for Transformer<F> {
    fn move_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.matrix.transform(x, y);
        self.inner.move_to(x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.matrix.transform(x, y);
        self.inner.line_to(x, y);
    }
    fn line_join(&mut self) {
        self.inner.line_join();
    }
    fn close(&mut self) {
        self.inner.close();
    }
    fn end(&mut self) {
        self.inner.end();
    }
}

// ============================================================================
// DemuxFlattener
// ============================================================================

/// Forwards every event to each of its sinks, in order.
pub struct DemuxFlattener<'a> {
    sinks: Vec<&'a mut dyn Flattener>,
}

impl<'a> DemuxFlattener<'a> {
    pub fn new(sinks: Vec<&'a mut dyn Flattener>) -> Self {
        Self { sinks }
    }
}

impl Flattener for DemuxFlattener<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        for s in self.sinks.iter_mut() {
            s.move_to(x, y);
        }
    }
    fn line_to(&mut self, x: f64, y: f64) {
        for s in self.sinks.iter_mut() {
            s.line_to(x, y);
        }
    }
    fn line_join(&mut self) {
        for s in self.sinks.iter_mut() {
            s.line_join();
        }
    }
    fn close(&mut self) {
        for s in self.sinks.iter_mut() {
            s.close();
        }
    }
    fn end(&mut self) {
        for s in self.sinks.iter_mut() {
            s.end();
        }
    }
}

// ============================================================================
// SegmentedPath
// ============================================================================

/// One recorded sub-path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<PointD>,
    pub closed: bool,
}

/// Records flattened geometry as polylines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedPath {
    pub polylines: Vec<Polyline>,
    open: bool,
}

impl SegmentedPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded points.
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(|p| p.points.len()).sum()
    }

    /// Bounds of every recorded point, `None` when nothing was recorded.
    pub fn bounds(&self) -> Option<RectD> {
        let mut r = RectD::empty();
        for p in self.polylines.iter().flat_map(|l| l.points.iter()) {
            r.expand(p.x, p.y);
        }
        r.is_valid().then_some(r)
    }

    fn current(&mut self) -> &mut Polyline {
        if !self.open || self.polylines.is_empty() {
            self.polylines.push(Polyline::default());
            self.open = true;
        }
        let last = self.polylines.len() - 1;
        &mut self.polylines[last]
    }
}

impl Flattener for SegmentedPath {
    fn move_to(&mut self, x: f64, y: f64) {
        self.open = false;
        self.current().points.push(PointD::new(x, y));
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.current().points.push(PointD::new(x, y));
    }
    fn line_join(&mut self) {}
    fn close(&mut self) {
        if self.open {
            self.current().closed = true;
        }
    }
    fn end(&mut self) {
        self.open = false;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::PI;
    use crate::path::PathBuilder;

    /// Records every event as text.
    #[derive(Default)]
    struct EventLog(Vec<String>);

    impl Flattener for EventLog {
        fn move_to(&mut self, x: f64, y: f64) {
            self.0.push(format!("M {x} {y}"));
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.0.push(format!("L {x} {y}"));
        }
        fn line_join(&mut self) {
            self.0.push("J".into());
        }
        fn close(&mut self) {
            self.0.push("C".into());
        }
        fn end(&mut self) {
            self.0.push("E".into());
        }
    }

    #[test]
    fn test_invalid_tolerance_uses_default() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.cubic_curve_to(0.0, 40.0, 40.0, 40.0, 40.0, 0.0);
        let mut expected = EventLog::default();
        flatten(&p, &mut expected, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        for bad in [0.0, -0.5, f64::NAN] {
            let mut log = EventLog::default();
            flatten(&p, &mut log, 1.0, bad);
            assert_eq!(log.0, expected.0, "tolerance {bad}");
        }
    }

    #[test]
    fn test_flatten_lines_and_close() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(10.0, 0.0);
        p.line_to(10.0, 10.0);
        p.close();
        let mut log = EventLog::default();
        flatten(&p, &mut log, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        assert_eq!(
            log.0,
            vec!["M 0 0", "L 10 0", "J", "L 10 10", "J", "L 0 0", "C", "E"]
        );
    }

    #[test]
    fn test_flatten_ends_between_sub_paths() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(1.0, 0.0);
        p.move_to(5.0, 5.0);
        p.line_to(6.0, 5.0);
        let mut log = EventLog::default();
        flatten(&p, &mut log, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        assert_eq!(
            log.0,
            vec!["M 0 0", "L 1 0", "J", "E", "M 5 5", "L 6 5", "J", "E"]
        );
    }

    #[test]
    fn test_flatten_empty_path_is_silent() {
        let mut log = EventLog::default();
        flatten(&Path::new(), &mut log, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        assert!(log.0.is_empty());
    }

    #[test]
    fn test_flatten_curve_ends_on_end_point() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.quad_curve_to(50.0, 100.0, 100.0, 0.0);
        let mut rec = SegmentedPath::new();
        flatten(&p, &mut rec, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        assert_eq!(rec.polylines.len(), 1);
        let pts = &rec.polylines[0].points;
        assert!(pts.len() > 3);
        assert_eq!(*pts.last().unwrap(), PointD::new(100.0, 0.0));
    }

    #[test]
    fn test_larger_scale_emits_more_points() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.cubic_curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0);
        let mut coarse = SegmentedPath::new();
        flatten(&p, &mut coarse, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        let mut fine = SegmentedPath::new();
        flatten(&p, &mut fine, 10.0, DEFAULT_FLATNESS_TOLERANCE);
        assert!(fine.point_count() > coarse.point_count());
    }

    #[test]
    fn test_flatten_arc_reaches_end() {
        let mut p = Path::new();
        p.arc_to(0.0, 0.0, 10.0, 10.0, 0.0, PI);
        let mut rec = SegmentedPath::new();
        flatten(&p, &mut rec, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        let last = *rec.polylines[0].points.last().unwrap();
        assert!((last.x + 10.0).abs() < 1e-9 && last.y.abs() < 1e-9);
        assert_eq!(rec.polylines[0].points[0], PointD::new(10.0, 0.0));
    }

    #[test]
    fn test_transformer_maps_points() {
        let mut p = Path::new();
        p.move_to(1.0, 0.0);
        p.line_to(2.0, 0.0);
        let mut m = TransAffine::identity();
        m.translate(2.0, 3.0);
        m.rotate(PI / 2.0);
        let mut t = Transformer::new(m, SegmentedPath::new());
        flatten(&p, &mut t, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        let rec = t.into_inner();
        let p0 = rec.polylines[0].points[0];
        assert!((p0.x - 2.0).abs() < 1e-12 && (p0.y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_demux_feeds_all_sinks() {
        let mut p = Path::new();
        p.move_to(0.0, 0.0);
        p.line_to(3.0, 4.0);
        p.close();
        let mut a = SegmentedPath::new();
        let mut b = EventLog::default();
        {
            let sinks: Vec<&mut dyn Flattener> = vec![&mut a, &mut b];
            let mut demux = DemuxFlattener::new(sinks);
            flatten(&p, &mut demux, 1.0, DEFAULT_FLATNESS_TOLERANCE);
        }
        assert_eq!(a.point_count(), 3);
        assert!(a.polylines[0].closed);
        assert_eq!(b.0.len(), 6);
    }

    #[test]
    fn test_segmented_path_bounds() {
        let mut rec = SegmentedPath::new();
        assert!(rec.bounds().is_none());
        rec.move_to(1.0, 2.0);
        rec.line_to(-4.0, 8.0);
        rec.end();
        let r = rec.bounds().unwrap();
        assert_eq!((r.x1, r.y1, r.x2, r.y2), (-4.0, 2.0, 1.0, 8.0));
    }
}
