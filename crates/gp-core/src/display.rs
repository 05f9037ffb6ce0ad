//! Display list: the per-frame, renderer-agnostic description of the canvas.
//!
//! Rebuilt from scratch from the model, the viewport and the interaction
//! overlay on every change. Shapes are in content coordinates; renderers
//! apply `ViewportTransform::affine()` themselves.

use crate::geometry::{Arrowhead, EdgeCurve, GeometryEngine};
use crate::id::{EdgeId, NodeId};
use crate::model::{Color, Edge, GraphModel};
use crate::viewport::{ViewportState, ViewportTransform};
use kurbo::Point;

/// What the user currently has selected. At most one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: NodeId,
    pub center: Point,
    pub radius: f64,
    pub color: Color,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeShape {
    pub id: EdgeId,
    pub curve: EdgeCurve,
    pub arrow: Option<Arrowhead>,
    pub label: Option<EdgeLabel>,
    /// Invisible stroke width used for hit testing (content units).
    pub hit_width: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub text: String,
    pub anchor: Point,
}

/// Dashed segment drawn while an edge is being created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewEdge {
    pub source: NodeId,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub viewport: ViewportState,
    pub stroke_width: f64,
    /// Drawn first, below nodes.
    pub edges: Vec<EdgeShape>,
    pub nodes: Vec<NodeShape>,
    pub preview: Option<PreviewEdge>,
}

/// Text shown next to an edge: the label, the weight, both, or nothing.
pub fn edge_label_text(edge: &Edge) -> Option<String> {
    let weight = edge.weight.filter(|_| edge.show_weight);
    match (edge.label.is_empty(), weight) {
        (false, Some(w)) => Some(format!("{} ({w})", edge.label)),
        (false, None) => Some(edge.label.clone()),
        (true, Some(w)) => Some(format!("{w}")),
        (true, None) => None,
    }
}

impl DisplayList {
    /// Build the list for the current frame.
    ///
    /// `pending_edge` is the add-edge overlay: source node and cursor in
    /// content coordinates. It is dropped if the source no longer exists.
    pub fn build(
        model: &GraphModel,
        viewport: &ViewportTransform,
        engine: &GeometryEngine,
        selection: Selection,
        pending_edge: Option<(NodeId, Point)>,
    ) -> Self {
        let hit_width = engine.hit_width(viewport.scale());

        let edges: Vec<EdgeShape> = engine
            .layout_edges(model.nodes(), model.edges())
            .into_iter()
            .filter_map(|geo| {
                let edge = model.edge(geo.id)?;
                Some(EdgeShape {
                    id: geo.id,
                    curve: geo.curve,
                    arrow: geo.arrow,
                    label: edge_label_text(edge).map(|text| EdgeLabel {
                        text,
                        anchor: geo.label_anchor,
                    }),
                    hit_width,
                    selected: selection == Selection::Edge(geo.id),
                })
            })
            .collect();

        let nodes = model
            .nodes()
            .iter()
            .map(|n| NodeShape {
                id: n.id,
                center: n.center(),
                radius: n.size,
                color: n.color,
                label: n.label.clone(),
                selected: selection == Selection::Node(n.id),
            })
            .collect();

        let preview = pending_edge.and_then(|(source, cursor)| {
            let node = model.node(source)?;
            let (start, end) = engine.preview_segment(node, cursor);
            Some(PreviewEdge { source, start, end })
        });

        log::trace!(
            "display list: {} nodes, {} edges, hit width {:.2}",
            model.nodes().len(),
            edges.len(),
            hit_width
        );

        Self {
            viewport: viewport.state(),
            stroke_width: engine.config().stroke_width,
            edges,
            nodes,
            preview,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeShape> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeShape> {
        self.edges.iter().find(|e| e.id == id)
    }
}
