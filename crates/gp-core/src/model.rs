//! Graph data model: nodes, edges and the owning `GraphModel`.
//!
//! Nodes live in content space (`x`, `y` is the center, `size` the radius).
//! Edges reference nodes by id and may form self-loops. The model keeps both
//! collections in host order; geometry is derived elsewhere and never stored.
//!
//! Every operation is total: an id that is not present turns the call into a
//! no-op rather than an error.

use crate::config::CanvasConfig;
use crate::id::{EdgeId, IdSequence, NodeId};
use kurbo::Point;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// ─── Color ───────────────────────────────────────────────────────────────

/// 8-bit RGBA color, exchanged with hosts as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Self::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => None,
        }
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Nodes & edges ───────────────────────────────────────────────────────

/// A vertex drawn as a filled circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Content-space center.
    pub x: f64,
    pub y: f64,
    /// Radius in content units.
    pub size: f64,
    pub color: Color,
    pub label: String,
}

impl Node {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A connection between two nodes. `from == to` is a self-loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub directed: bool,
    pub weight: Option<f64>,
    pub show_weight: bool,
    #[serde(default)]
    pub label: String,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

// ─── Patches ─────────────────────────────────────────────────────────────

/// Attribute patch for a node, as sent by drag handling or property panels.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct NodePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub size: Option<f64>,
    pub color: Option<Color>,
    pub label: Option<String>,
}

impl NodePatch {
    pub fn position(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            ..Self::default()
        }
    }

    /// Reject values the geometry cannot draw.
    pub fn validate(&self) -> Result<(), PatchError> {
        for (field, value) in [("x", self.x), ("y", self.y)] {
            if let Some(v) = value
                && !v.is_finite()
            {
                return Err(PatchError::NotFinite { field });
            }
        }
        if let Some(size) = self.size
            && !(size.is_finite() && size > 0.0)
        {
            return Err(PatchError::InvalidSize(size));
        }
        Ok(())
    }
}

/// Attribute patch for an edge.
///
/// `weight` distinguishes "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EdgePatch {
    pub directed: Option<bool>,
    #[serde(deserialize_with = "present_or_null")]
    pub weight: Option<Option<f64>>,
    pub show_weight: Option<bool>,
    pub label: Option<String>,
}

impl EdgePatch {
    pub fn validate(&self) -> Result<(), PatchError> {
        if let Some(Some(w)) = self.weight
            && !w.is_finite()
        {
            return Err(PatchError::NotFinite { field: "weight" });
        }
        Ok(())
    }
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Why a property-panel patch was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("`{field}` must be a finite number")]
    NotFinite { field: &'static str },
    #[error("node size must be positive, got {0}")]
    InvalidSize(f64),
    #[error("malformed patch: {0}")]
    Malformed(String),
}

// ─── Graph model ─────────────────────────────────────────────────────────

/// Owner of the node and edge collections.
#[derive(Debug, Clone)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_ids: IdSequence,
    edge_ids: IdSequence,
    default_radius: f64,
    default_color: Color,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

impl GraphModel {
    /// Empty model whose new nodes use the configured defaults.
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_ids: IdSequence::new(),
            edge_ids: IdSequence::new(),
            default_radius: config.node_radius,
            default_color: config.node_color,
        }
    }

    /// Model seeded with host-provided lists. Edges that reference missing
    /// nodes are kept; they are only filtered at display time.
    pub fn from_parts(config: &CanvasConfig, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut model = Self::new(config);
        model.nodes = nodes;
        model.edges = edges;
        model
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Edges with `id` as either endpoint.
    pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Create a node centered at `at` with default radius, color and label.
    pub fn add_node(&mut self, at: Point) -> Node {
        let (id, seq) = loop {
            let (candidate, seq) = self.node_ids.next_with_prefix("node");
            let id = NodeId::intern(&candidate);
            if !self.contains_node(id) {
                break (id, seq);
            }
        };
        let node = Node {
            id,
            x: at.x,
            y: at.y,
            size: self.default_radius,
            color: self.default_color,
            label: seq.to_string(),
        };
        log::debug!("add node {id:?} at ({:.1}, {:.1})", at.x, at.y);
        self.nodes.push(node.clone());
        node
    }

    /// Create an undirected edge with weight 1. `from == to` makes a self-loop.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Edge {
        let id = loop {
            let (candidate, _) = self.edge_ids.next_with_prefix("edge");
            let id = EdgeId::intern(&candidate);
            if self.edge(id).is_none() {
                break id;
            }
        };
        let edge = Edge {
            id,
            from,
            to,
            directed: false,
            weight: Some(1.0),
            show_weight: true,
            label: String::new(),
        };
        log::debug!("add edge {id:?}: {from:?} -> {to:?}");
        self.edges.push(edge.clone());
        edge
    }

    /// Remove a node and every edge touching it. Returns whether the node existed.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.nodes.remove(pos);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        log::debug!(
            "delete node {id:?} (cascaded {} edges)",
            before - self.edges.len()
        );
        true
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        before != self.edges.len()
    }

    /// Apply a node patch. Returns whether the node existed.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if let Some(x) = patch.x {
            node.x = x;
        }
        if let Some(y) = patch.y {
            node.y = y;
        }
        if let Some(size) = patch.size {
            node.size = size;
        }
        if let Some(color) = patch.color {
            node.color = color;
        }
        if let Some(label) = &patch.label {
            node.label.clone_from(label);
        }
        true
    }

    /// Apply an edge patch. Returns whether the edge existed.
    pub fn update_edge(&mut self, id: EdgeId, patch: &EdgePatch) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if let Some(directed) = patch.directed {
            edge.directed = directed;
        }
        if let Some(weight) = patch.weight {
            edge.weight = weight;
        }
        if let Some(show) = patch.show_weight {
            edge.show_weight = show;
        }
        if let Some(label) = &patch.label {
            edge.label.clone_from(label);
        }
        true
    }

    /// Export the structure for algorithm runners.
    ///
    /// Undirected edges become a pair of opposing arcs. Edges whose
    /// endpoints are missing are skipped.
    pub fn to_petgraph(&self) -> (StableDiGraph<NodeId, EdgeId>, HashMap<NodeId, NodeIndex>) {
        let mut graph = StableDiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            index.insert(node.id, graph.add_node(node.id));
        }
        for edge in &self.edges {
            let (Some(&a), Some(&b)) = (index.get(&edge.from), index.get(&edge.to)) else {
                continue;
            };
            graph.add_edge(a, b, edge.id);
            if !edge.directed && a != b {
                graph.add_edge(b, a, edge.id);
            }
        }
        (graph, index)
    }
}
