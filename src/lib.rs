//! # raster2d
//!
//! Anti-aliased 2D vector rasterization into an in-memory RGBA buffer.
//!
//! Paths made of lines, quadratic and cubic Bézier curves, arcs and glyph
//! outlines are flattened into polylines, optionally stroked (with caps,
//! joins and dashes), and converted to anti-aliased coverage under a
//! nonzero or even-odd fill rule.
//!
//! ## Architecture
//!
//! Drawing goes through a push pipeline:
//!
//! 1. **Path**: components with a flat coordinate buffer ([`path`])
//! 2. **Flattening**: curves and arcs reduced to lines within a tolerance
//!    ([`curves`], [`flatten`])
//! 3. **Line sinks**: transform, dash and stroke stages ([`flatten`],
//!    [`dasher`], [`stroker`])
//! 4. **Rasterizer**: 24.8 fixed-point cells swept into coverage
//!    scanlines ([`rasterizer`], [`scanline`])
//! 5. **Painter**: scanlines blended into the pixel buffer ([`painter`],
//!    [`image`])
//!
//! [`GraphicContext`] ties the stages together with a save/restore state
//! stack and cached glyph outlines.
//!
//! ## Features
//!
//! - `font`: `truetype::TrueTypeFont`, a [`FontProvider`] backed by
//!   `ttf-parser`
//! - `png`: PNG encoding of an [`ImageBuffer`]

// Foundation
pub mod basics;
pub mod color;
pub mod math;
pub mod trans_affine;

// Geometry
pub mod curves;
pub mod flatten;
pub mod path;

// Stroking
pub mod dasher;
pub mod math_stroke;
pub mod stroker;
pub mod vertex_sequence;

// Rasterization
pub mod image;
pub mod painter;
pub mod rasterizer;
pub mod rasterizer_cells;
pub mod scanline;

// Text
pub mod font;
pub mod glyph_cache;
#[cfg(feature = "font")]
pub mod truetype;

// Context
pub mod config;
pub mod context;
pub mod error;
pub mod state;

pub use basics::FillRule;
pub use color::Rgba8;
pub use config::ContextConfig;
pub use context::GraphicContext;
pub use error::{Error, FontError, Result};
pub use font::{FontProvider, GlyphOutline, Hinting};
pub use image::ImageBuffer;
pub use math_stroke::{LineCap, LineJoin};
pub use path::{Component, Path, PathBuilder};
pub use trans_affine::TransAffine;
