//! SVG scene builder.

use crate::renderer::{RenderContext, RenderOptions, RenderResult, Renderer, RendererError};
use bumpflow_core::{Bump, ConnectionId, DiagramBox};
use kurbo::{Point, Vec2};
use peniko::Color;
use std::f64::consts::PI;

/// Average glyph advance as a fraction of the font size, used to size
/// label backgrounds without a font engine.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Builds a standalone SVG document for a diagram.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    svg: Option<String>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the document produced by the last [`Renderer::build_scene`].
    pub fn finish(&mut self) -> RenderResult<String> {
        self.svg.take().ok_or(RendererError::SceneNotBuilt)
    }

    /// Build and take a document in one go.
    pub fn render(ctx: &RenderContext) -> String {
        let mut renderer = Self::new();
        renderer.build_scene(ctx);
        renderer.svg.unwrap_or_default()
    }
}

impl Renderer for SvgRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let opts = &ctx.options;
        let extent = ctx.canvas_extent();
        let mut svg = String::new();

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.2}\" height=\"{h:.2}\" viewBox=\"0 0 {w:.2} {h:.2}\">",
            w = extent.x,
            h = extent.y,
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            hex(self.background_color(ctx))
        ));

        // Connections first so boxes and bumps sit on top of line ends.
        let dragged = ctx.transient.and_then(|line| line.connection);
        for connection in ctx.diagram.connections() {
            if dragged == Some(connection.id()) {
                continue;
            }
            let Some((start, end)) = ctx.diagram.connection_segment(connection.id()) else {
                continue;
            };
            draw_line(&mut svg, opts, start, end, Some(connection.id()));
        }

        if let Some(line) = ctx.transient {
            draw_line(&mut svg, opts, line.start, line.end, line.connection);
        }

        let radius = ctx.diagram.bump_radius();
        for b in ctx.diagram.boxes() {
            draw_box(&mut svg, opts, b, radius);
        }

        svg.push_str("</svg>");
        log::debug!(
            "built svg scene: {} boxes, {} connections, {} bytes",
            ctx.diagram.box_count(),
            ctx.diagram.connection_count(),
            svg.len()
        );
        self.svg = Some(svg);
    }
}

fn draw_box(svg: &mut String, opts: &RenderOptions, b: &DiagramBox, bump_radius: f64) {
    let bounds = b.bounds();
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        bounds.x0,
        bounds.y0,
        bounds.width(),
        bounds.height(),
        hex(opts.fill_color),
        hex(opts.stroke_color),
        opts.stroke_width
    ));

    for bump in b.bumps() {
        draw_bump(svg, opts, &bump, bump_radius);
    }

    let center = bounds.center();
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
        center.x,
        center.y,
        escape_xml(&opts.font_family),
        opts.box_font_size,
        hex(opts.text_color),
        escape_xml(&b.id().to_string())
    ));
}

/// Half disc on the box edge, bulging along the bump's normal.
fn draw_bump(svg: &mut String, opts: &RenderOptions, bump: &Bump, radius: f64) {
    let normal = bump.class.normal();
    // Quarter turn against the normal; sweeping clockwise from here passes
    // through the tip.
    let side = Vec2::new(normal.y, -normal.x) * radius;
    let from = bump.anchor + side;
    let to = bump.anchor - side;
    svg.push_str(&format!(
        "<path d=\"M {:.2} {:.2} A {r} {r} 0 0 1 {:.2} {:.2} Z\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
        from.x,
        from.y,
        to.x,
        to.y,
        hex(opts.fill_color),
        hex(opts.stroke_color),
        opts.stroke_width,
        r = radius,
    ));
}

/// Straight line with a tail circle at `start`, an arrowhead at `end` and,
/// for committed connections, the connection id at the midpoint.
fn draw_line(
    svg: &mut String,
    opts: &RenderOptions,
    start: Point,
    end: Point,
    label: Option<ConnectionId>,
) {
    let stroke = hex(opts.stroke_color);
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-width=\"{}\"/>",
        start.x, start.y, end.x, end.y, opts.stroke_width
    ));
    svg.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{}\"/>",
        start.x,
        start.y,
        opts.tail_radius,
        hex(opts.fill_color),
        opts.stroke_width
    ));

    let [tip, left, right] = arrowhead(start, end, opts.arrow_size);
    svg.push_str(&format!(
        "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{stroke}\"/>",
        tip.x, tip.y, left.x, left.y, right.x, right.y
    ));

    let Some(id) = label else {
        return;
    };
    let text = id.to_string();
    let mid = start.midpoint(end);
    let text_width = text.chars().count() as f64 * opts.line_font_size * GLYPH_WIDTH_RATIO;
    let pad = opts.label_padding;
    let height = opts.line_font_size + pad;
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
        mid.x - text_width / 2.0 - pad,
        mid.y - height / 2.0,
        text_width + pad * 2.0,
        height,
        hex(opts.fill_color)
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
        mid.x,
        mid.y,
        escape_xml(&opts.font_family),
        opts.line_font_size,
        hex(opts.text_color),
        escape_xml(&text)
    ));
}

/// Triangle corners for an arrow pointing at `end`, sides at ±30°.
fn arrowhead(start: Point, end: Point, size: f64) -> [Point; 3] {
    let angle = (end - start).atan2();
    let corner = |offset: f64| {
        let a = angle + offset;
        end - Vec2::new(a.cos(), a.sin()) * size
    };
    [end, corner(-PI / 6.0), corner(PI / 6.0)]
}

fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
