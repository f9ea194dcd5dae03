//! Bumpflow Render Library
//!
//! Renderer abstraction for bumpflow diagrams, with an SVG scene builder.

mod renderer;
mod svg;

pub use renderer::{RenderContext, RenderOptions, RenderResult, Renderer, RendererError};
pub use svg::SvgRenderer;
