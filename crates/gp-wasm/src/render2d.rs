//! Canvas2D software renderer.
//!
//! Draws a `DisplayList` to an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! The background and grid are painted in screen space; everything else
//! under the viewport transform, so stroke widths and fonts scale with zoom.

use gp_core::display::{DisplayList, EdgeShape, NodeShape, PreviewEdge};
use gp_core::geometry::{Arrowhead, EdgeCurve};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub edge: &'static str,
    pub edge_label: &'static str,
    pub node_text: &'static str,
    pub node_outline: &'static str,
    pub selection: &'static str,
}

impl CanvasTheme {
    /// Light theme, warm white canvas.
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            edge: "#64748B",
            edge_label: "#334155",
            node_text: "#FFFFFF",
            node_outline: "#FFFFFF",
            selection: "#F59E0B",
        }
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            edge: "#94A3B8",
            edge_label: "#E2E8F0",
            node_text: "#FFFFFF",
            node_outline: "#1C1C1E",
            selection: "#FBBF24",
        }
    }
}

/// Render the display list to a Canvas2D context.
pub fn render_display_list(
    ctx: &CanvasRenderingContext2d,
    list: &DisplayList,
    canvas_width: f64,
    canvas_height: f64,
    theme: &CanvasTheme,
) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    draw_grid(ctx, canvas_width, canvas_height, theme);

    let vp = list.viewport;
    ctx.save();
    let _ = ctx.set_transform(vp.scale, 0.0, 0.0, vp.scale, vp.offset_x, vp.offset_y);

    for edge in &list.edges {
        draw_edge(ctx, edge, list.stroke_width, theme);
    }
    if let Some(preview) = &list.preview {
        draw_preview(ctx, preview, list.stroke_width, theme);
    }
    for node in &list.nodes {
        draw_node(ctx, node, theme);
    }
    // Labels last so nodes never cover them.
    for edge in &list.edges {
        draw_edge_label(ctx, edge, theme);
    }

    ctx.restore();
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn trace_curve(ctx: &CanvasRenderingContext2d, curve: &EdgeCurve) {
    ctx.begin_path();
    match curve {
        EdgeCurve::Quad(q) => {
            ctx.move_to(q.p0.x, q.p0.y);
            ctx.quadratic_curve_to(q.p1.x, q.p1.y, q.p2.x, q.p2.y);
        }
        EdgeCurve::Loop(c) => {
            ctx.move_to(c.p0.x, c.p0.y);
            ctx.bezier_curve_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y);
        }
    }
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeShape, stroke_width: f64, theme: &CanvasTheme) {
    let color = if edge.selected { theme.selection } else { theme.edge };
    ctx.save();
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(if edge.selected { stroke_width * 1.5 } else { stroke_width });
    ctx.set_line_cap("round");
    trace_curve(ctx, &edge.curve);
    ctx.stroke();

    if let Some(arrow) = &edge.arrow {
        ctx.set_fill_style_str(color);
        draw_arrowhead(ctx, arrow);
    }
    ctx.restore();
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, arrow: &Arrowhead) {
    ctx.begin_path();
    ctx.move_to(arrow.tip.x, arrow.tip.y);
    ctx.line_to(arrow.left.x, arrow.left.y);
    ctx.line_to(arrow.right.x, arrow.right.y);
    ctx.close_path();
    ctx.fill();
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, edge: &EdgeShape, theme: &CanvasTheme) {
    let Some(label) = &edge.label else {
        return;
    };
    ctx.save();
    ctx.set_font("12px Inter, system-ui, sans-serif");
    ctx.set_fill_style_str(if edge.selected { theme.selection } else { theme.edge_label });
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(&label.text, label.anchor.x, label.anchor.y);
    ctx.restore();
}

fn draw_preview(ctx: &CanvasRenderingContext2d, preview: &PreviewEdge, stroke_width: f64, theme: &CanvasTheme) {
    ctx.save();
    ctx.set_stroke_style_str(theme.edge);
    ctx.set_line_width(stroke_width);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(6.0),
        &JsValue::from_f64(4.0),
    ));
    ctx.begin_path();
    ctx.move_to(preview.start.x, preview.start.y);
    ctx.line_to(preview.end.x, preview.end.y);
    ctx.stroke();
    ctx.restore();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeShape, theme: &CanvasTheme) {
    let (x, y, r) = (node.center.x, node.center.y, node.radius);
    ctx.save();

    ctx.begin_path();
    let _ = ctx.arc(x, y, r, 0.0, std::f64::consts::TAU);
    ctx.set_fill_style_str(&node.color.to_hex());
    ctx.fill();

    if node.selected {
        ctx.set_stroke_style_str(theme.selection);
        ctx.set_line_width(3.0);
    } else {
        ctx.set_stroke_style_str(theme.node_outline);
        ctx.set_line_width(1.5);
    }
    ctx.stroke();

    if !node.label.is_empty() {
        let size = (r * 0.8).clamp(8.0, 16.0);
        ctx.set_font(&format!("600 {size}px Inter, system-ui, sans-serif"));
        ctx.set_fill_style_str(theme.node_text);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(&node.label, x, y);
    }

    ctx.restore();
}

fn draw_grid(ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &CanvasTheme) {
    ctx.set_fill_style_str(theme.grid);
    let spacing = 20.0;
    let mut x = 0.0;
    while x < width {
        let mut y = 0.0;
        while y < height {
            ctx.fill_rect(x, y, 1.0, 1.0);
            y += spacing;
        }
        x += spacing;
    }
}
