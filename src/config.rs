//! Context configuration.

use log::warn;

use crate::color::Rgba8;
use crate::flatten::DEFAULT_FLATNESS_TOLERANCE;

pub const DEFAULT_DPI: f64 = 92.0;
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const DEFAULT_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Initial settings of a [`GraphicContext`](crate::context::GraphicContext).
///
/// Everything except `flatness_tolerance` seeds the base drawing state and
/// can be changed later through the context. A `flatness_tolerance` that is
/// not a positive finite number is replaced by the default when the context
/// is built, however the config was constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextConfig {
    /// Allowed squared deviation, in device pixels, when flattening curves.
    pub flatness_tolerance: f64,
    pub dpi: f64,
    pub line_width: f64,
    /// Font size in points.
    pub font_size: f64,
    pub miter_limit: f64,
    pub fill_color: Rgba8,
    pub stroke_color: Rgba8,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            flatness_tolerance: DEFAULT_FLATNESS_TOLERANCE,
            dpi: DEFAULT_DPI,
            line_width: DEFAULT_LINE_WIDTH,
            font_size: DEFAULT_FONT_SIZE,
            miter_limit: DEFAULT_MITER_LIMIT,
            fill_color: Rgba8::WHITE,
            stroke_color: Rgba8::BLACK,
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-positive or non-finite values keep the default.
    pub fn with_flatness_tolerance(mut self, tolerance: f64) -> Self {
        if valid_tolerance(tolerance) {
            self.flatness_tolerance = tolerance;
        }
        self
    }

    /// Copy with out-of-range fields replaced by their defaults.
    pub(crate) fn sanitized(mut self) -> Self {
        if !valid_tolerance(self.flatness_tolerance) {
            warn!(
                "flatness tolerance {} is not a positive finite number, using {}",
                self.flatness_tolerance, DEFAULT_FLATNESS_TOLERANCE
            );
            self.flatness_tolerance = DEFAULT_FLATNESS_TOLERANCE;
        }
        self
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn with_fill_color(mut self, color: Rgba8) -> Self {
        self.fill_color = color;
        self
    }

    pub fn with_stroke_color(mut self, color: Rgba8) -> Self {
        self.stroke_color = color;
        self
    }
}

fn valid_tolerance(tolerance: f64) -> bool {
    tolerance > 0.0 && tolerance.is_finite()
}

// ============================================================================
// Tests
// ============================================================================
