//! Vertex sequence with segment lengths, as consumed by the stroker.
//!
//! Coincident consecutive vertices are dropped on insertion. After
//! [`VertexSequence::close`] every vertex carries the length of the segment
//! that starts at it (wrapping to the first vertex for closed sequences).

use crate::math::{calc_distance, VERTEX_DIST_EPSILON};

// ============================================================================
// VertexDist
// ============================================================================

/// A vertex and the distance to the next vertex in its sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDist {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
}

impl VertexDist {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, dist: 0.0 }
    }

    /// `true` when `other` is not coincident with `self`.
    fn is_distinct(&self, other: &VertexDist) -> bool {
        calc_distance(self.x, self.y, other.x, other.y) > VERTEX_DIST_EPSILON
    }
}

// ============================================================================
// VertexSequence
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
    closed: bool,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.closed = false;
    }

    /// Append a vertex unless it coincides with the previous one.
    pub fn add(&mut self, x: f64, y: f64) {
        let v = VertexDist::new(x, y);
        match self.vertices.last() {
            Some(last) if !last.is_distinct(&v) => {}
            _ => self.vertices.push(v),
        }
    }

    /// Finish the sequence. For a closed sequence, trailing vertices that
    /// coincide with the first are dropped; fewer than three vertices cannot
    /// form a closed outline and the sequence stays open.
    pub fn close(&mut self, closed: bool) {
        if closed {
            while self.vertices.len() > 1 {
                let first = self.vertices[0];
                let last = self.vertices[self.vertices.len() - 1];
                if first.is_distinct(&last) {
                    break;
                }
                self.vertices.pop();
            }
        }
        self.closed = closed && self.vertices.len() >= 3;

        let n = self.vertices.len();
        for i in 0..n {
            let next = if i + 1 < n {
                self.vertices[i + 1]
            } else if self.closed {
                self.vertices[0]
            } else {
                self.vertices[i]
            };
            let v = &mut self.vertices[i];
            v.dist = calc_distance(v.x, v.y, next.x, next.y);
        }
    }

    /// Vertex before `i`, wrapping around.
    pub fn prev(&self, i: usize) -> &VertexDist {
        let n = self.vertices.len();
        &self.vertices[(i + n - 1) % n]
    }

    /// Vertex after `i`, wrapping around.
    pub fn next(&self, i: usize) -> &VertexDist {
        &self.vertices[(i + 1) % self.vertices.len()]
    }
}

impl core::ops::Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_coincident() {
        let mut s = VertexSequence::new();
        s.add(0.0, 0.0);
        s.add(0.0, 0.0);
        s.add(10.0, 0.0);
        s.add(10.0, 0.0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_open_distances() {
        let mut s = VertexSequence::new();
        s.add(0.0, 0.0);
        s.add(3.0, 4.0);
        s.add(3.0, 10.0);
        s.close(false);
        assert!(!s.is_closed());
        assert_eq!(s[0].dist, 5.0);
        assert_eq!(s[1].dist, 6.0);
        assert_eq!(s[2].dist, 0.0);
    }

    #[test]
    fn test_closed_wraps_and_drops_repeat_of_first() {
        let mut s = VertexSequence::new();
        s.add(0.0, 0.0);
        s.add(4.0, 0.0);
        s.add(4.0, 3.0);
        s.add(0.0, 0.0);
        s.close(true);
        assert!(s.is_closed());
        assert_eq!(s.len(), 3);
        assert_eq!(s[2].dist, 5.0);
        assert_eq!(s.prev(0), &s[2]);
        assert_eq!(s.next(2), &s[0]);
    }

    #[test]
    fn test_two_point_closed_stays_open() {
        let mut s = VertexSequence::new();
        s.add(0.0, 0.0);
        s.add(4.0, 0.0);
        s.close(true);
        assert!(!s.is_closed());
    }
}
