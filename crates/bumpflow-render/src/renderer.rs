//! Renderer trait abstraction.

use bumpflow_core::{Diagram, Editor, TransientLine};
use kurbo::{Point, Rect};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No scene has been built")]
    SceneNotBuilt,
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Palette and sizes used when drawing a diagram.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub background_color: Color,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub text_color: Color,
    pub stroke_width: f64,
    /// Radius of the circle marking where a line starts.
    pub tail_radius: f64,
    /// Length of the arrowhead sides.
    pub arrow_size: f64,
    pub box_font_size: f64,
    pub line_font_size: f64,
    /// Padding around a connection label.
    pub label_padding: f64,
    pub font_family: String,
    /// Empty space kept around the drawing.
    pub margin: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background_color: Color::from_rgba8(255, 255, 255, 255),
            stroke_color: Color::from_rgba8(0, 0, 0, 255),
            fill_color: Color::from_rgba8(255, 255, 255, 255),
            text_color: Color::from_rgba8(0, 0, 0, 255),
            stroke_width: 2.0,
            tail_radius: 5.0,
            arrow_size: 12.0,
            box_font_size: 14.0,
            line_font_size: 12.0,
            label_padding: 4.0,
            font_family: "sans-serif".to_string(),
            margin: 40.0,
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The diagram to render.
    pub diagram: &'a Diagram,
    /// Line being drawn or re-routed, drawn on top of committed connections.
    pub transient: Option<TransientLine>,
    pub options: RenderOptions,
}

impl<'a> RenderContext<'a> {
    /// Create a render context for a diagram at rest.
    pub fn new(diagram: &'a Diagram) -> Self {
        Self {
            diagram,
            transient: None,
            options: RenderOptions::default(),
        }
    }

    /// Create a render context for the editor's diagram and current gesture.
    pub fn from_editor(editor: &'a Editor) -> Self {
        Self::new(editor.diagram()).with_transient(editor.transient_line())
    }

    pub fn with_transient(mut self, line: Option<TransientLine>) -> Self {
        self.transient = line;
        self
    }

    /// Bounding box of everything that will be drawn, bumps included.
    /// `None` for an empty frame.
    pub fn content_bounds(&self) -> Option<Rect> {
        let radius = self.diagram.bump_radius();
        let boxes = self
            .diagram
            .boxes()
            .map(|b| b.bounds().inflate(radius, radius));
        let transient = self
            .transient
            .iter()
            .map(|line| Rect::from_points(line.start, line.end));
        boxes.chain(transient).reduce(|acc, r| acc.union(r))
    }

    /// Canvas extent: from the origin to the far corner of the content,
    /// plus the margin.
    pub fn canvas_extent(&self) -> Point {
        let margin = self.options.margin;
        match self.content_bounds() {
            Some(bounds) => Point::new(bounds.x1.max(0.0) + margin, bounds.y1.max(0.0) + margin),
            None => Point::new(margin * 2.0, margin * 2.0),
        }
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene for a frame.
    ///
    /// Called once per frame; replaces whatever the previous call produced.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.options.background_color
    }
}
