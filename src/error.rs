//! Error types.

use thiserror::Error;

/// Errors raised by [`GraphicContext`](crate::context::GraphicContext) text
/// operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A string operation was requested with no font set.
    #[error("no font is set")]
    NoFont,
    /// The font provider failed to load a glyph outline.
    #[error("failed to load glyph {glyph} after advancing {advance}")]
    GlyphLoad {
        /// Glyph index that failed.
        glyph: u32,
        /// Pen advance produced before the failure.
        advance: f64,
        #[source]
        source: FontError,
    },
}

/// Errors raised by a [`FontProvider`](crate::font::FontProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    /// The font data could not be parsed.
    #[error("failed to parse font: {0}")]
    Parse(String),
    /// The glyph index is out of range for the font.
    #[error("glyph {0} is not in the font")]
    InvalidGlyph(u32),
    /// The glyph exists but its outline is malformed.
    #[error("glyph {0} has a malformed outline")]
    MalformedOutline(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// Tests
// ============================================================================
