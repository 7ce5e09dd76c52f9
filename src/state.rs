//! Drawing state and the save/restore stack.

use std::fmt;
use std::rc::Rc;

use log::warn;

use crate::basics::FillRule;
use crate::color::Rgba8;
use crate::config::ContextConfig;
use crate::font::{FontProvider, Hinting};
use crate::math_stroke::{LineCap, LineJoin};
use crate::stroker::StrokeStyle;
use crate::trans_affine::TransAffine;

// ============================================================================
// DrawingState
// ============================================================================

/// Everything `save` captures and `restore` brings back.
#[derive(Clone)]
pub struct DrawingState {
    pub matrix: TransAffine,
    pub stroke_color: Rgba8,
    pub fill_color: Rgba8,
    pub fill_rule: FillRule,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    /// Dash lengths; empty for solid strokes.
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    pub font: Option<Rc<dyn FontProvider>>,
    /// Font size in points.
    pub font_size: f64,
    pub dpi: f64,
    pub hinting: Hinting,
}

impl DrawingState {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            matrix: TransAffine::identity(),
            stroke_color: config.stroke_color,
            fill_color: config.fill_color,
            fill_rule: FillRule::default(),
            line_width: config.line_width,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: config.miter_limit,
            dash: Vec::new(),
            dash_offset: 0.0,
            font: None,
            font_size: config.font_size,
            dpi: config.dpi,
            hinting: Hinting::default(),
        }
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.line_width,
            cap: self.line_cap,
            join: self.line_join,
            miter_limit: self.miter_limit,
        }
    }
}

impl Default for DrawingState {
    fn default() -> Self {
        Self::new(&ContextConfig::default())
    }
}

impl fmt::Debug for DrawingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingState")
            .field("matrix", &self.matrix)
            .field("stroke_color", &self.stroke_color)
            .field("fill_color", &self.fill_color)
            .field("fill_rule", &self.fill_rule)
            .field("line_width", &self.line_width)
            .field("line_cap", &self.line_cap)
            .field("line_join", &self.line_join)
            .field("miter_limit", &self.miter_limit)
            .field("dash", &self.dash)
            .field("dash_offset", &self.dash_offset)
            .field("font", &self.font.as_ref().map(|f| f.name().to_owned()))
            .field("font_size", &self.font_size)
            .field("dpi", &self.dpi)
            .field("hinting", &self.hinting)
            .finish()
    }
}

// ============================================================================
// StateStack
// ============================================================================

/// Non-empty stack of drawing states. The top is the current state.
#[derive(Debug, Clone)]
pub struct StateStack {
    states: Vec<DrawingState>,
}

impl StateStack {
    pub fn new(base: DrawingState) -> Self {
        Self { states: vec![base] }
    }

    /// Number of saved states above the base.
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }

    pub fn current(&self) -> &DrawingState {
        &self.states[self.states.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut DrawingState {
        let top = self.states.len() - 1;
        &mut self.states[top]
    }

    /// Push a copy of the current state.
    pub fn save(&mut self) {
        let copy = self.current().clone();
        self.states.push(copy);
    }

    /// Pop back to the last saved state. With nothing saved this does
    /// nothing and returns `false`.
    pub fn restore(&mut self) -> bool {
        if self.states.len() <= 1 {
            warn!("restore without a matching save; keeping the base state");
            return false;
        }
        self.states.pop();
        true
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new(DrawingState::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
