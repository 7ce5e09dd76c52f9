//! In-memory RGBA8 pixel buffer.
//!
//! Pixels are stored row-major, non-premultiplied, four bytes per pixel in
//! `[r, g, b, a]` order. Blending is source-over: the color channels are
//! interpolated towards the source by `alpha * cover`, and the destination
//! alpha is interpolated towards opaque.

use crate::basics::CoverType;
use crate::color::Rgba8;

/// Bytes per pixel.
pub const BPP: usize = 4;

// ============================================================================
// ImageBuffer
// ============================================================================

/// Owned RGBA8 raster the painters write into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BPP],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.stride() + x as usize * BPP)
    }

    /// Color at (x, y); transparent black outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        match self.offset(x, y) {
            Some(off) => {
                let p = &self.data[off..off + BPP];
                Rgba8::new(p[0], p[1], p[2], p[3])
            }
            None => Rgba8::TRANSPARENT,
        }
    }

    /// Fill the whole buffer with `c`.
    pub fn clear(&mut self, c: Rgba8) {
        for p in self.data.chunks_exact_mut(BPP) {
            p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    #[inline]
    fn blend_pix(p: &mut [u8], c: Rgba8, alpha: u8) {
        p[0] = Rgba8::lerp(p[0], c.r, alpha);
        p[1] = Rgba8::lerp(p[1], c.g, alpha);
        p[2] = Rgba8::lerp(p[2], c.b, alpha);
        p[3] = Rgba8::lerp(p[3], 255, alpha);
    }

    /// Blend `c` into (x, y) with the given coverage.
    pub fn blend_pixel(&mut self, x: i32, y: i32, c: Rgba8, cover: CoverType) {
        let Some(off) = self.offset(x, y) else {
            return;
        };
        let alpha = Rgba8::mult_cover(c.a, cover);
        let p = &mut self.data[off..off + BPP];
        if alpha == 255 {
            p.copy_from_slice(&[c.r, c.g, c.b, 255]);
        } else if alpha > 0 {
            Self::blend_pix(p, c, alpha);
        }
    }

    /// Blend a horizontal span with per-pixel coverage values.
    pub fn blend_solid_hspan(&mut self, x: i32, y: i32, c: Rgba8, covers: &[CoverType]) {
        for (i, &cover) in covers.iter().enumerate() {
            self.blend_pixel(x + i as i32, y, c, cover);
        }
    }

    /// Encode the buffer as an RGBA8 PNG.
    #[cfg(feature = "png")]
    pub fn into_png(self) -> Result<Vec<u8>, png::EncodingError> {
        let mut data = Vec::new();
        let mut encoder = png::Encoder::new(&mut data, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.data)?;
        writer.finish().map(|_| data)
    }
}

// ============================================================================
// Tests
// ============================================================================
