//! Foundation types, constants, and rounding helpers.
//!
//! Everything else in the crate depends on these: fixed-point subpixel
//! constants shared by the rasterizer and the rectangle fast path, the fill
//! rule, and small geometry value types.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

// ============================================================================
// Subpixel constants
// ============================================================================

/// Subpixel accuracy of the rasterizer (number of fractional bits).
/// With 8 fractional bits and 32-bit integers, coordinate capacity is 24 bits.
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

/// Largest device coordinate (in pixels) accepted before fixed-point
/// conversion saturates.
pub const POLY_MAX_COORD: f64 = (1 << 21) as f64;

/// Convert a device coordinate to 24.8 fixed point, saturating at
/// `±POLY_MAX_COORD` so that pathological input cannot overflow cell math.
#[inline]
pub fn poly_coord(v: f64) -> i32 {
    let v = if v.is_nan() {
        0.0
    } else {
        v.clamp(-POLY_MAX_COORD, POLY_MAX_COORD)
    };
    iround(v * POLY_SUBPIXEL_SCALE as f64)
}

// ============================================================================
// Fill rule
// ============================================================================

/// Winding rule deciding which regions of overlapping geometry are inside.
///
/// `EvenOdd` is the default; strokes are always rasterized with `NonZero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    EvenOdd,
    NonZero,
}

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Returns `true` if the rectangle is valid (non-empty).
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Returns `true` if the point (x, y) is inside the rectangle.
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Rectangle with `i32` coordinates.
pub type RectI = Rect<i32>;
/// Rectangle with `f64` coordinates.
pub type RectD = Rect<f64>;

impl RectD {
    /// An "inverted" rectangle that any `expand` call turns valid.
    pub fn empty() -> Self {
        Self::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN)
    }

    /// Grow the rectangle to include (x, y).
    pub fn expand(&mut self, x: f64, y: f64) {
        self.x1 = self.x1.min(x);
        self.y1 = self.y1.min(y);
        self.x2 = self.x2.max(x);
        self.y2 = self.y2.max(y);
    }
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// Approximate equality comparison
// ============================================================================

/// Compare two floating-point values for approximate equality using
/// relative comparison scaled by the smaller exponent.
pub fn is_equal_eps(v1: f64, v2: f64, epsilon: f64) -> bool {
    let neg1 = v1 < 0.0;
    let neg2 = v2 < 0.0;

    if neg1 != neg2 {
        return v1.abs() < epsilon && v2.abs() < epsilon;
    }

    let (_, exp1) = frexp(v1);
    let (_, exp2) = frexp(v2);
    let min_exp = exp1.min(exp2);

    let scaled1 = ldexp(v1, -min_exp);
    let scaled2 = ldexp(v2, -min_exp);

    (scaled1 - scaled2).abs() < epsilon
}

/// C-style frexp: decompose `x` into `(mantissa, exponent)` where
/// `x = mantissa * 2^exponent` and `0.5 <= |mantissa| < 1.0`.
#[inline]
fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }
    let bits = x.to_bits();
    let exp = ((bits >> 52) & 0x7FF) as i32 - 1022;
    let mantissa = f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | 0x3FE0_0000_0000_0000);
    (mantissa, exp)
}

#[inline]
fn ldexp(x: f64, exp: i32) -> f64 {
    x * (2.0_f64).powi(exp)
}

// ============================================================================
// Tests
// ============================================================================
