//! Display list → Vello drawing commands.
//!
//! Edges first, then the add-edge preview, then nodes on top. Shapes are
//! in content space; the viewport affine maps them to the screen.

use gp_core::display::{DisplayList, EdgeShape, NodeShape, PreviewEdge};
use gp_core::geometry::{Arrowhead, EdgeCurve};
use kurbo::{Affine, BezPath, Cap, Circle, Join, Stroke};
use peniko::{Color, Fill};
use vello::Scene;

const EDGE_RGB: (u8, u8, u8) = (0x64, 0x74, 0x8B);
const SELECTED_RGB: (u8, u8, u8) = (0xF5, 0x9E, 0x0B);
const NODE_OUTLINE_RGB: (u8, u8, u8) = (0xFF, 0xFF, 0xFF);
const PREVIEW_DASH: [f64; 2] = [6.0, 4.0];

/// Paint the whole display list into a Vello scene.
///
/// Call once per frame with a freshly-cleared `Scene`.
/// The caller presents the scene.
pub fn paint_scene(scene: &mut Scene, list: &DisplayList) {
    let view = Affine::translate((list.viewport.offset_x, list.viewport.offset_y)) * Affine::scale(list.viewport.scale);
    for edge in &list.edges {
        paint_edge(scene, view, edge, list.stroke_width);
    }
    if let Some(preview) = &list.preview {
        paint_preview(scene, view, preview, list.stroke_width);
    }
    for node in &list.nodes {
        paint_node(scene, view, node);
    }
}

// ─── Shape painters ──────────────────────────────────────────────────────────

fn paint_edge(scene: &mut Scene, view: Affine, edge: &EdgeShape, width: f64) {
    let color = rgb(if edge.selected { SELECTED_RGB } else { EDGE_RGB });
    let stroke = Stroke::new(if edge.selected { width * 1.5 } else { width })
        .with_caps(Cap::Round)
        .with_join(Join::Round);
    scene.stroke(&stroke, view, color, None, &curve_path(&edge.curve));

    if let Some(arrow) = &edge.arrow {
        scene.fill(Fill::NonZero, view, color, None, &arrow_path(arrow));
    }
    if let Some(label) = &edge.label {
        // Glyph runs need a font context owned by the host.
        log::trace!("edge label {:?} at ({:.1}, {:.1})", label.text, label.anchor.x, label.anchor.y);
    }
}

fn paint_preview(scene: &mut Scene, view: Affine, preview: &PreviewEdge, width: f64) {
    let stroke = Stroke::new(width).with_dashes(0.0, PREVIEW_DASH);
    let mut path = BezPath::new();
    path.move_to(preview.start);
    path.line_to(preview.end);
    scene.stroke(&stroke, view, rgb(EDGE_RGB), None, &path);
}

fn paint_node(scene: &mut Scene, view: Affine, node: &NodeShape) {
    let circle = Circle::new(node.center, node.radius);
    let c = node.color;
    scene.fill(Fill::NonZero, view, Color::from_rgba8(c.r, c.g, c.b, c.a), None, &circle);

    let (outline, width) = if node.selected {
        (SELECTED_RGB, 3.0)
    } else {
        (NODE_OUTLINE_RGB, 1.5)
    };
    scene.stroke(&Stroke::new(width), view, rgb(outline), None, &circle);
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::from_rgb8(r, g, b)
}

// ─── Paths ───────────────────────────────────────────────────────────────────

pub fn curve_path(curve: &EdgeCurve) -> BezPath {
    let mut path = BezPath::new();
    match curve {
        EdgeCurve::Quad(q) => {
            path.move_to(q.p0);
            path.quad_to(q.p1, q.p2);
        }
        EdgeCurve::Loop(c) => {
            path.move_to(c.p0);
            path.curve_to(c.p1, c.p2, c.p3);
        }
    }
    path
}

pub fn arrow_path(arrow: &Arrowhead) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(arrow.tip);
    path.line_to(arrow.left);
    path.line_to(arrow.right);
    path.close_path();
    path
}
