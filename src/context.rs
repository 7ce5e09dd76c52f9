//! The drawing surface.
//!
//! [`GraphicContext`] owns a pixel buffer, the current [`Path`], the
//! drawing-state stack and a glyph cache. Paths are built through its
//! [`PathBuilder`] implementation and consumed by `fill`, `stroke` and
//! `fill_stroke`, which flatten them in user space, map them to device space
//! with the current matrix and rasterize them into the buffer.
//!
//! Every paint operation clears the current path afterwards.

use std::iter;
use std::rc::Rc;

use log::debug;

use crate::basics::FillRule;
use crate::color::Rgba8;
use crate::config::ContextConfig;
use crate::dasher::{DashPattern, DashVertexConverter};
use crate::error::{Error, Result};
use crate::flatten::{flatten, DemuxFlattener, Flattener, Transformer};
use crate::font::{font_scale, FontProvider, Hinting};
use crate::glyph_cache::GlyphCache;
use crate::image::ImageBuffer;
use crate::math_stroke::{LineCap, LineJoin};
use crate::painter::{fill_rect, rect_from_path, render_scanlines, ImagePainter};
use crate::path::{Path, PathBuilder};
use crate::rasterizer::Rasterizer;
use crate::scanline::ScanlineU8;
use crate::state::{DrawingState, StateStack};
use crate::stroker::LineStroker;
use crate::trans_affine::TransAffine;

/// Stroke sink for `state`: optional dasher, then the stroker, then the
/// user-to-device transform, ending in `ras`.
fn stroke_pipeline<'a>(state: &DrawingState, ras: &'a mut Rasterizer) -> Box<dyn Flattener + 'a> {
    let stroker = LineStroker::new(
        &state.stroke_style(),
        state.matrix.get_scale(),
        Transformer::new(state.matrix, ras),
    );
    if state.dash.is_empty() {
        return Box::new(stroker);
    }
    match DashPattern::new(&state.dash) {
        Some(pattern) => Box::new(DashVertexConverter::new(pattern, state.dash_offset, stroker)),
        None => Box::new(stroker),
    }
}

#[inline]
fn has_stroke_width(state: &DrawingState) -> bool {
    state.line_width > 0.0 && state.line_width.is_finite()
}

// ============================================================================
// GraphicContext
// ============================================================================

pub struct GraphicContext {
    image: ImageBuffer,
    path: Path,
    states: StateStack,
    glyph_cache: GlyphCache,
    config: ContextConfig,
    fill_ras: Rasterizer,
    stroke_ras: Rasterizer,
    scanline: ScanlineU8,
}

impl GraphicContext {
    /// Context drawing into a new transparent `width` x `height` buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(ImageBuffer::new(width, height), ContextConfig::default())
    }

    /// Context drawing into `image`.
    pub fn with_config(image: ImageBuffer, config: ContextConfig) -> Self {
        let config = config.sanitized();
        let (w, h) = (image.width(), image.height());
        let mut stroke_ras = Rasterizer::new(w, h);
        stroke_ras.set_fill_rule(FillRule::NonZero);
        Self {
            image,
            path: Path::new(),
            states: StateStack::new(DrawingState::new(&config)),
            glyph_cache: GlyphCache::new(),
            config,
            fill_ras: Rasterizer::new(w, h),
            stroke_ras,
            scanline: ScanlineU8::new(),
        }
    }

    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    pub fn into_image(self) -> ImageBuffer {
        self.image
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// The path under construction.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the current path without painting it.
    pub fn begin_path(&mut self) {
        self.path.clear();
    }

    pub fn glyph_cache(&self) -> &GlyphCache {
        &self.glyph_cache
    }

    pub fn clear_glyph_cache(&mut self) {
        self.glyph_cache.clear();
    }

    /// Fill the whole buffer with `color`, ignoring the matrix.
    pub fn clear(&mut self, color: Rgba8) {
        self.image.clear(color);
    }

    // ====================================================================
    // State stack
    // ====================================================================

    pub fn state(&self) -> &DrawingState {
        self.states.current()
    }

    fn state_mut(&mut self) -> &mut DrawingState {
        self.states.current_mut()
    }

    /// Number of states saved above the base state.
    pub fn save_depth(&self) -> usize {
        self.states.depth()
    }

    pub fn save(&mut self) {
        self.states.save();
    }

    /// Undo every state change since the matching `save`. The current path
    /// is left alone. Without a matching `save` this logs a warning and
    /// keeps the current state.
    pub fn restore(&mut self) {
        self.states.restore();
    }

    // ====================================================================
    // Transform
    // ====================================================================

    pub fn matrix_transform(&self) -> TransAffine {
        self.state().matrix
    }

    pub fn set_matrix_transform(&mut self, m: TransAffine) {
        self.state_mut().matrix = m;
    }

    /// Apply `m` in the current user space.
    pub fn compose_matrix(&mut self, m: &TransAffine) {
        self.state_mut().matrix.compose(m);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.state_mut().matrix.translate(tx, ty);
    }

    /// Rotate by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.state_mut().matrix.rotate(angle);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state_mut().matrix.scale(sx, sy);
    }

    // ====================================================================
    // Style
    // ====================================================================

    pub fn stroke_color(&self) -> Rgba8 {
        self.state().stroke_color
    }

    pub fn set_stroke_color(&mut self, c: Rgba8) {
        self.state_mut().stroke_color = c;
    }

    pub fn fill_color(&self) -> Rgba8 {
        self.state().fill_color
    }

    pub fn set_fill_color(&mut self, c: Rgba8) {
        self.state_mut().fill_color = c;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.state().fill_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.state_mut().fill_rule = rule;
    }

    pub fn line_width(&self) -> f64 {
        self.state().line_width
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.state_mut().line_width = width;
    }

    pub fn line_cap(&self) -> LineCap {
        self.state().line_cap
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state_mut().line_cap = cap;
    }

    pub fn line_join(&self) -> LineJoin {
        self.state().line_join
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state_mut().line_join = join;
    }

    pub fn miter_limit(&self) -> f64 {
        self.state().miter_limit
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.state_mut().miter_limit = limit;
    }

    /// Dash lengths and phase offset.
    pub fn line_dash(&self) -> (&[f64], f64) {
        let s = self.state();
        (&s.dash, s.dash_offset)
    }

    /// Set the dash pattern. An empty `dash` strokes solid lines; a pattern
    /// that cannot be walked (negative lengths, zero total) also strokes
    /// solid.
    pub fn set_line_dash(&mut self, dash: &[f64], offset: f64) {
        let s = self.state_mut();
        s.dash.clear();
        s.dash.extend_from_slice(dash);
        s.dash_offset = offset;
    }

    // ====================================================================
    // Font
    // ====================================================================

    pub fn font(&self) -> Option<&Rc<dyn FontProvider>> {
        self.state().font.as_ref()
    }

    pub fn set_font(&mut self, font: Rc<dyn FontProvider>) {
        self.state_mut().font = Some(font);
    }

    pub fn unset_font(&mut self) {
        self.state_mut().font = None;
    }

    /// Font size in points.
    pub fn font_size(&self) -> f64 {
        self.state().font_size
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.state_mut().font_size = size;
    }

    pub fn dpi(&self) -> f64 {
        self.state().dpi
    }

    pub fn set_dpi(&mut self, dpi: f64) {
        self.state_mut().dpi = dpi;
    }

    pub fn hinting(&self) -> Hinting {
        self.state().hinting
    }

    pub fn set_hinting(&mut self, hinting: Hinting) {
        self.state_mut().hinting = hinting;
    }

    // ====================================================================
    // Painting
    // ====================================================================

    /// Fill `paths` and the current path with the fill color and rule.
    pub fn fill(&mut self, paths: &[&Path]) {
        let painted = self.fill_paths(paths);
        debug!("fill: {} path(s), painted: {painted}", paths.len() + 1);
        self.finish_paint();
    }

    /// Stroke `paths` and the current path with the stroke color and the
    /// current line style. A zero line width paints nothing.
    pub fn stroke(&mut self, paths: &[&Path]) {
        let painted = has_stroke_width(self.state()) && self.stroke_paths(paths);
        debug!("stroke: {} path(s), painted: {painted}", paths.len() + 1);
        self.finish_paint();
    }

    /// Fill then stroke `paths` and the current path, flattening each path
    /// once.
    pub fn fill_stroke(&mut self, paths: &[&Path]) {
        let state = self.states.current();
        let matrix = state.matrix;
        let scale = matrix.get_scale();
        let tolerance = self.config.flatness_tolerance;
        let stroking = has_stroke_width(state);
        self.fill_ras.set_fill_rule(state.fill_rule);
        {
            let mut fill_sink = Transformer::new(matrix, &mut self.fill_ras);
            let mut stroke_sink = if stroking {
                Some(stroke_pipeline(state, &mut self.stroke_ras))
            } else {
                None
            };
            let mut sinks: Vec<&mut dyn Flattener> = vec![&mut fill_sink];
            if let Some(sink) = stroke_sink.as_mut() {
                sinks.push(sink.as_mut());
            }
            let mut demux = DemuxFlattener::new(sinks);
            for p in paths.iter().copied().chain(iter::once(&self.path)) {
                flatten(p, &mut demux, scale, tolerance);
            }
        }

        let (fill_color, stroke_color) = (state.fill_color, state.stroke_color);
        let mut painter = ImagePainter::new(&mut self.image);
        let filled = render_scanlines(&mut self.fill_ras, &mut self.scanline, &mut painter, fill_color);
        let stroked =
            stroking && render_scanlines(&mut self.stroke_ras, &mut self.scanline, &mut painter, stroke_color);
        debug!(
            "fill_stroke: {} path(s), filled: {filled}, stroked: {stroked}",
            paths.len() + 1
        );
        self.finish_paint();
    }

    fn fill_paths(&mut self, paths: &[&Path]) -> bool {
        let state = self.states.current();
        let (matrix, rule, color) = (state.matrix, state.fill_rule, state.fill_color);
        let visible: Vec<&Path> = paths
            .iter()
            .copied()
            .chain(iter::once(&self.path))
            .filter(|p| !p.is_empty())
            .collect();
        let mut painter = ImagePainter::new(&mut self.image);

        if let [only] = visible.as_slice() {
            if let (Some(rect), Some(clip)) = (rect_from_path(only, &matrix), self.fill_ras.clip_box()) {
                return fill_rect(&rect, &clip, rule, &mut self.scanline, &mut painter, color);
            }
        }

        self.fill_ras.set_fill_rule(rule);
        {
            let mut sink = Transformer::new(matrix, &mut self.fill_ras);
            for p in &visible {
                flatten(p, &mut sink, matrix.get_scale(), self.config.flatness_tolerance);
            }
        }
        render_scanlines(&mut self.fill_ras, &mut self.scanline, &mut painter, color)
    }

    fn stroke_paths(&mut self, paths: &[&Path]) -> bool {
        let state = self.states.current();
        let scale = state.matrix.get_scale();
        {
            let mut sink = stroke_pipeline(state, &mut self.stroke_ras);
            for p in paths.iter().copied().chain(iter::once(&self.path)) {
                flatten(p, &mut *sink, scale, self.config.flatness_tolerance);
            }
        }
        let mut painter = ImagePainter::new(&mut self.image);
        render_scanlines(&mut self.stroke_ras, &mut self.scanline, &mut painter, state.stroke_color)
    }

    fn finish_paint(&mut self) {
        self.fill_ras.reset();
        self.stroke_ras.reset();
        self.path.clear();
    }

    // ====================================================================
    // Text
    // ====================================================================

    fn current_font(&self) -> Result<Rc<dyn FontProvider>> {
        self.state().font.clone().ok_or(Error::NoFont)
    }

    /// Append the outlines of `text` to the current path with the baseline
    /// origin at (`x`, `y`). Returns the horizontal advance.
    ///
    /// Characters the font cannot map use glyph 0. On a load failure the
    /// glyphs before it stay in the path and the error reports their
    /// advance.
    pub fn create_string_path(&mut self, text: &str, x: f64, y: f64) -> Result<f64> {
        let font = self.current_font()?;
        let state = self.states.current();
        let scale = font_scale(state.font_size, state.dpi);
        let hinting = state.hinting;

        let mut pen = x;
        let mut prev: Option<u32> = None;
        for c in text.chars() {
            let glyph = font.glyph_index(c).unwrap_or(0);
            if let Some(p) = prev {
                pen += font.kerning(p, glyph, scale);
            }
            let outline = self
                .glyph_cache
                .fetch(&font, scale, glyph, hinting)
                .map_err(|source| Error::GlyphLoad {
                    glyph,
                    advance: pen - x,
                    source,
                })?;
            outline.draw_to(&mut self.path, pen, y);
            pen += outline.advance;
            prev = Some(glyph);
        }
        Ok(pen - x)
    }

    /// Fill `text` at the origin. Returns the advance.
    pub fn fill_string(&mut self, text: &str) -> Result<f64> {
        self.fill_string_at(text, 0.0, 0.0)
    }

    /// Fill `text` with its baseline origin at (`x`, `y`). On error nothing
    /// is painted and the current path is cleared, including any glyphs
    /// appended before the failing one.
    pub fn fill_string_at(&mut self, text: &str, x: f64, y: f64) -> Result<f64> {
        let advance = self.string_path_or_reset(text, x, y)?;
        self.fill(&[]);
        Ok(advance)
    }

    /// Stroke the outlines of `text` at the origin. Returns the advance.
    pub fn stroke_string(&mut self, text: &str) -> Result<f64> {
        self.stroke_string_at(text, 0.0, 0.0)
    }

    /// Stroke `text` with its baseline origin at (`x`, `y`). Errors clear
    /// the current path like [`fill_string_at`](Self::fill_string_at).
    pub fn stroke_string_at(&mut self, text: &str, x: f64, y: f64) -> Result<f64> {
        let advance = self.string_path_or_reset(text, x, y)?;
        self.stroke(&[]);
        Ok(advance)
    }

    fn string_path_or_reset(&mut self, text: &str, x: f64, y: f64) -> Result<f64> {
        let result = self.create_string_path(text, x, y);
        if let Err(e) = &result {
            debug!("dropping partial string path: {e}");
            self.begin_path();
        }
        result
    }

    /// Box `(left, top, right, bottom)` of the glyph points of `text` laid
    /// out from the origin, y pointing down. Zeros when `text` has no
    /// outline points. The current path is not touched.
    pub fn get_string_bounds(&mut self, text: &str) -> Result<(f64, f64, f64, f64)> {
        let font = self.current_font()?;
        let state = self.states.current();
        let scale = font_scale(state.font_size, state.dpi);
        let hinting = state.hinting;

        let (mut left, mut top) = (f64::MAX, f64::MAX);
        let (mut right, mut bottom) = (f64::MIN, f64::MIN);
        let mut pen = 0.0;
        let mut prev: Option<u32> = None;
        for c in text.chars() {
            let glyph = font.glyph_index(c).unwrap_or(0);
            if let Some(p) = prev {
                pen += font.kerning(p, glyph, scale);
            }
            let outline = self
                .glyph_cache
                .fetch(&font, scale, glyph, hinting)
                .map_err(|source| Error::GlyphLoad {
                    glyph,
                    advance: pen,
                    source,
                })?;
            for p in outline.points() {
                left = left.min(pen + p.x);
                right = right.max(pen + p.x);
                top = top.min(-p.y);
                bottom = bottom.max(-p.y);
            }
            pen += outline.advance;
            prev = Some(glyph);
        }
        if left > right {
            return Ok((0.0, 0.0, 0.0, 0.0));
        }
        Ok((left, top, right, bottom))
    }
}

impl PathBuilder for GraphicContext {
    fn last_point(&self) -> (f64, f64) {
        self.path.last_point()
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to(x, y);
    }

    fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.path.quad_curve_to(cx, cy, x, y);
    }

    fn cubic_curve_to(&mut self, cx1: f64, cy1: f64, cx2: f64, cy2: f64, x: f64, y: f64) {
        self.path.cubic_curve_to(cx1, cy1, cx2, cy2, x, y);
    }

    fn arc_to(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64) {
        self.path.arc_to(cx, cy, rx, ry, start_angle, sweep_angle);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
