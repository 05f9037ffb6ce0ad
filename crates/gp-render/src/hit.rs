//! Hit testing: point → node / edge / empty canvas.
//!
//! Walks the display list front-to-back: nodes (painted last) before edges,
//! and within each list the last painted shape first. Points are in content
//! coordinates.

use gp_core::display::{DisplayList, EdgeShape};
use gp_core::geometry::EdgeCurve;
use gp_core::id::{EdgeId, NodeId};
use kurbo::{ParamCurveNearest, Point};

/// What sits under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Node(NodeId),
    Edge(EdgeId),
    Canvas,
}

const NEAREST_ACCURACY: f64 = 1e-3;

/// Find the topmost shape at `p`.
pub fn hit_test(list: &DisplayList, p: Point) -> PointerTarget {
    if let Some(node) = list
        .nodes
        .iter()
        .rev()
        .find(|n| (p - n.center).hypot2() <= n.radius * n.radius)
    {
        return PointerTarget::Node(node.id);
    }
    if let Some(edge) = list.edges.iter().rev().find(|e| edge_contains(e, p)) {
        return PointerTarget::Edge(edge.id);
    }
    PointerTarget::Canvas
}

/// Distance from `p` to the edge curve, in content units.
pub fn distance_to_edge(edge: &EdgeShape, p: Point) -> f64 {
    let nearest = match &edge.curve {
        EdgeCurve::Quad(q) => q.nearest(p, NEAREST_ACCURACY),
        EdgeCurve::Loop(c) => c.nearest(p, NEAREST_ACCURACY),
    };
    nearest.distance_sq.sqrt()
}

/// Whether `p` falls inside the edge's invisible hit stroke.
pub fn edge_contains(edge: &EdgeShape, p: Point) -> bool {
    distance_to_edge(edge, p) <= edge.hit_width / 2.0
}
