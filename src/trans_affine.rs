//! Affine transformation matrix.
//!
//! The drawing state carries one of these as its current transform. The
//! `translate`, `rotate`, `scale` and `compose` operations all work in the
//! matrix's *local* space: the new operation is applied to points first and
//! the existing matrix afterwards, so a sequence of calls reads in the same
//! order as nested coordinate systems.

use crate::basics::is_equal_eps;

/// Epsilon for affine matrix comparisons.
pub const AFFINE_EPSILON: f64 = 1e-14;

/// 2D affine transformation matrix.
///
/// Stores six components: `[sx, shy, shx, sy, tx, ty]` representing the
/// matrix:
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Matrix from its six components.
    pub const fn new(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    /// `[sx, shy, shx, sy, tx, ty]`
    pub fn to_array(&self) -> [f64; 6] {
        [self.sx, self.shy, self.shx, self.sy, self.tx, self.ty]
    }

    pub fn from_translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Rotation by `a` radians. Positive angles turn +x towards +y.
    pub fn from_rotation(a: f64) -> Self {
        let (sa, ca) = a.sin_cos();
        Self::new(ca, sa, -sa, ca, 0.0, 0.0)
    }

    pub fn from_scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    // ====================================================================
    // Composition
    // ====================================================================

    /// `self = self * m`: points go through `self` first, then `m`.
    pub fn then(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// Compose `m` in local space: points go through `m` first, then the
    /// previous `self`.
    pub fn compose(&mut self, m: &TransAffine) -> &mut Self {
        let mut t = *m;
        t.then(self);
        *self = t;
        self
    }

    /// Local-space translation.
    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x * self.sx + y * self.shx;
        self.ty += x * self.shy + y * self.sy;
        self
    }

    /// Local-space rotation by `a` radians.
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        self.compose(&Self::from_rotation(a))
    }

    /// Local-space non-uniform scale.
    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.sx *= x;
        self.shy *= x;
        self.shx *= y;
        self.sy *= y;
        self
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<TransAffine> {
        let det = self.determinant();
        if det.abs() < AFFINE_EPSILON {
            return None;
        }
        let d = 1.0 / det;
        let sx = self.sy * d;
        let sy = self.sx * d;
        let shy = -self.shy * d;
        let shx = -self.shx * d;
        let tx = -self.tx * sx - self.ty * shx;
        let ty = -self.tx * shy - self.ty * sy;
        Some(Self::new(sx, shy, shx, sy, tx, ty))
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    /// Forward transform of a point.
    #[inline]
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.sx + y * self.shx + self.tx,
            x * self.shy + y * self.sy + self.ty,
        )
    }

    /// Inverse transform of a point. A singular matrix returns the point
    /// unchanged.
    pub fn inverse_transform(&self, x: f64, y: f64) -> (f64, f64) {
        match self.inverse() {
            Some(inv) => inv.transform(x, y),
            None => (x, y),
        }
    }

    // ====================================================================
    // Auxiliary
    // ====================================================================

    /// Determinant of the 2x2 portion.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// Average scale factor, used as the approximation scale for arcs and
    /// round joins.
    pub fn get_scale(&self) -> f64 {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let x = s * self.sx + s * self.shx;
        let y = s * self.shy + s * self.sy;
        (x * x + y * y).sqrt()
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.is_equal(&Self::identity(), epsilon)
    }

    /// `true` when horizontal and vertical lines stay horizontal and
    /// vertical: no rotation and no shear.
    pub fn is_axis_preserving(&self) -> bool {
        self.shx == 0.0 && self.shy == 0.0
    }

    /// Check if two matrices are equal within epsilon.
    pub fn is_equal(&self, m: &TransAffine, epsilon: f64) -> bool {
        self.to_array()
            .iter()
            .zip(m.to_array().iter())
            .all(|(&a, &b)| is_equal_eps(a, b, epsilon))
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for TransAffine {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other, AFFINE_EPSILON)
    }
}

/// `a * b` applies `a` first, then `b`.
impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        let mut result = self;
        result.then(&rhs);
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
