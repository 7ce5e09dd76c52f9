//! RGBA8 color type and the fixed-point channel arithmetic used for blending.

use crate::basics::CoverType;

// ============================================================================
// Rgba8
// ============================================================================

/// Non-premultiplied RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
    pub const GREEN: Rgba8 = Rgba8::new(0, 255, 0, 255);
    pub const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fixed-point multiply, exact over u8: `a * b / 255` rounded.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Multiply a channel value by a coverage value.
    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate `p` towards `q` by `a / 255`.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

// ============================================================================
// Tests
// ============================================================================
