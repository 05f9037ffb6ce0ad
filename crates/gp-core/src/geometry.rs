//! Edge geometry: boundary truncation, parallel-edge bundling, curves,
//! self-loops, labels, arrowheads and zoom-independent hit widths.
//!
//! Everything here is a pure function of node positions, the edge list and
//! the scale. Nothing is cached between frames, so the same input always
//! yields the same curves regardless of edge insertion order.
//!
//! ## Bundling
//!
//! Edges are grouped by their unordered endpoint pair. Inside a group the
//! *forward* list holds edges running `min → max`, the *backward* list the
//! reverse; both are sorted by edge id. Edge `i` of `n` gets
//!
//! ```text
//! offset_index = i - (n - 1) / 2  (± 0.5 if the opposite list is non-empty)
//! base_offset  = offset_index * gap
//! ```
//!
//! and is displaced along the perpendicular of the canonical `min → max`
//! direction, so mirrored edges bow to opposite sides.

use crate::config::CanvasConfig;
use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, Node};
use kurbo::{CubicBez, ParamCurve, Point, QuadBez, Vec2};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Rendered path of one edge, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeCurve {
    /// Quadratic segment between two distinct nodes. A zero bundle offset
    /// puts the control point on the chord, i.e. a straight line.
    Quad(QuadBez),
    /// Cubic loop above a node.
    Loop(CubicBez),
}

impl EdgeCurve {
    pub fn start(&self) -> Point {
        match self {
            Self::Quad(q) => q.p0,
            Self::Loop(c) => c.p0,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Self::Quad(q) => q.p2,
            Self::Loop(c) => c.p3,
        }
    }

    /// Direction of travel at the end point.
    pub fn end_tangent(&self) -> Vec2 {
        let (prev, end, first) = match self {
            Self::Quad(q) => (q.p1, q.p2, q.p0),
            Self::Loop(c) => (c.p2, c.p3, c.p0),
        };
        let tangent = end - prev;
        if tangent.hypot2() > 0.0 {
            tangent
        } else {
            end - first
        }
    }

    pub fn eval(&self, t: f64) -> Point {
        match self {
            Self::Quad(q) => q.eval(t),
            Self::Loop(c) => c.eval(t),
        }
    }
}

/// Filled triangle marking the head of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

/// Everything needed to draw and hit-test one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub id: EdgeId,
    pub curve: EdgeCurve,
    /// Where the label's baseline center goes.
    pub label_anchor: Point,
    pub arrow: Option<Arrowhead>,
    /// Signed distance from the chord, zero for self-loops.
    pub base_offset: f64,
}

/// `(min, max)` of the two endpoint ids.
pub type PairKey = (NodeId, NodeId);

pub fn pair_key(a: NodeId, b: NodeId) -> PairKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// Unit vector of `v`; a zero vector stays zero instead of dividing by zero.
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    let len = v.hypot();
    let len = if len == 0.0 { 1.0 } else { len };
    v / len
}

/// Pull both ends of the center-to-center segment back onto the node rims.
pub fn truncate_to_boundaries(a: Point, ra: f64, b: Point, rb: f64) -> (Point, Point) {
    let u = unit_or_zero(b - a);
    (a + u * ra, b - u * rb)
}

/// Left-hand normal of `from → to`.
pub fn perpendicular(from: Point, to: Point) -> Vec2 {
    let d = unit_or_zero(to - from);
    Vec2::new(-d.y, d.x)
}

/// Position of one edge inside its bundle, in multiples of the gap.
pub fn bundle_offset_index(index: usize, len: usize, opposite: usize, forward: bool) -> f64 {
    let mut offset = index as f64 - (len as f64 - 1.0) / 2.0;
    if opposite > 0 {
        offset += if forward { 0.5 } else { -0.5 };
    }
    offset
}

#[derive(Default)]
struct Bundle {
    forward: SmallVec<[EdgeId; 4]>,
    backward: SmallVec<[EdgeId; 4]>,
}

/// Base offsets for every non-loop edge, keyed by edge id.
pub fn bundle_offsets<'a>(edges: impl IntoIterator<Item = &'a Edge>, gap: f64) -> HashMap<EdgeId, f64> {
    let mut bundles: HashMap<PairKey, Bundle> = HashMap::new();
    for edge in edges {
        if edge.is_self_loop() {
            continue;
        }
        let key = pair_key(edge.from, edge.to);
        let bundle = bundles.entry(key).or_default();
        if edge.from == key.0 {
            bundle.forward.push(edge.id);
        } else {
            bundle.backward.push(edge.id);
        }
    }

    let mut offsets = HashMap::new();
    for bundle in bundles.values_mut() {
        bundle.forward.sort();
        bundle.backward.sort();
        for (list, opposite, forward) in [
            (&bundle.forward, bundle.backward.len(), true),
            (&bundle.backward, bundle.forward.len(), false),
        ] {
            for (i, id) in list.iter().enumerate() {
                let index = bundle_offset_index(i, list.len(), opposite, forward);
                offsets.insert(*id, index * gap);
            }
        }
    }
    offsets
}

/// Derives edge geometry from node positions using configured constants.
#[derive(Debug, Clone)]
pub struct GeometryEngine {
    config: CanvasConfig,
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl GeometryEngine {
    pub fn new(config: CanvasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Clickable edge thickness in content units: constant on screen,
    /// never thinner than the stroke.
    pub fn hit_width(&self, scale: f64) -> f64 {
        (self.config.hit_target_px / scale).max(self.config.stroke_width)
    }

    /// Curve between two distinct nodes, displaced by `base_offset`.
    ///
    /// `canonical` is the `(min, max)` node pair of the bundle; the
    /// perpendicular is taken from it, not from the edge's own direction.
    pub fn bundled_curve(&self, from: &Node, to: &Node, canonical: (&Node, &Node), base_offset: f64) -> QuadBez {
        let (start, end) = truncate_to_boundaries(from.center(), from.size, to.center(), to.size);
        let perp = perpendicular(canonical.0.center(), canonical.1.center());
        let shift = perp * base_offset;
        let (p0, p2) = (start + shift, end + shift);
        let control = p0.midpoint(p2) + perp * (base_offset * self.config.control_boost);
        QuadBez::new(p0, control, p2)
    }

    /// Label anchor of a quadratic edge: the curve midpoint, lifted.
    pub fn quad_label_anchor(&self, q: &QuadBez) -> Point {
        let mid = (q.p0.to_vec2() * 0.25 + q.p1.to_vec2() * 0.5 + q.p2.to_vec2() * 0.25).to_point();
        mid - Vec2::new(0.0, self.config.label_lift)
    }

    /// Loop above `node`, leaving and re-entering the rim at fixed angles.
    pub fn self_loop(&self, node: &Node) -> (CubicBez, Point) {
        let c = node.center();
        let r = node.size;
        let on_rim = |deg: f64| {
            let rad = deg.to_radians();
            c + Vec2::new(rad.cos(), rad.sin()) * r
        };
        let reach = r * self.config.loop_reach;
        let curve = CubicBez::new(
            on_rim(self.config.loop_start_deg),
            Point::new(c.x - reach, c.y - reach),
            Point::new(c.x + reach, c.y - reach),
            on_rim(self.config.loop_end_deg),
        );
        let label = Point::new(c.x, c.y - reach - self.config.label_lift);
        (curve, label)
    }

    pub fn arrowhead(&self, curve: &EdgeCurve) -> Arrowhead {
        let tip = curve.end();
        let dir = unit_or_zero(curve.end_tangent());
        let normal = Vec2::new(-dir.y, dir.x) * self.config.arrow_half_width;
        let base = tip - dir * self.config.arrow_length;
        Arrowhead {
            tip,
            left: base + normal,
            right: base - normal,
        }
    }

    /// Dashed segment shown while an edge is being drawn.
    pub fn preview_segment(&self, source: &Node, cursor: Point) -> (Point, Point) {
        let (start, _) = truncate_to_boundaries(source.center(), source.size, cursor, 0.0);
        (start, cursor)
    }

    /// Geometry for every edge whose endpoints both resolve.
    ///
    /// Edges that reference a missing node are dropped here, and only here;
    /// they do not take part in bundling either.
    pub fn layout_edges(&self, nodes: &[Node], edges: &[Edge]) -> Vec<EdgeGeometry> {
        let by_id: HashMap<NodeId, &Node> = nodes.iter().map(|n| (n.id, n)).collect();
        let drawable: Vec<&Edge> = edges
            .iter()
            .filter(|e| {
                let ok = by_id.contains_key(&e.from) && by_id.contains_key(&e.to);
                if !ok {
                    log::debug!("skipping edge {:?}: endpoint missing", e.id);
                }
                ok
            })
            .collect();
        let offsets = bundle_offsets(drawable.iter().copied(), self.config.bundle_gap);

        drawable
            .into_iter()
            .map(|edge| {
                let from = by_id[&edge.from];
                let to = by_id[&edge.to];
                let (curve, label_anchor, base_offset) = if edge.is_self_loop() {
                    let (cubic, label) = self.self_loop(from);
                    (EdgeCurve::Loop(cubic), label, 0.0)
                } else {
                    let (lo, hi) = pair_key(edge.from, edge.to);
                    let canonical = (by_id[&lo], by_id[&hi]);
                    let offset = offsets.get(&edge.id).copied().unwrap_or(0.0);
                    let quad = self.bundled_curve(from, to, canonical, offset);
                    (EdgeCurve::Quad(quad), self.quad_label_anchor(&quad), offset)
                };
                let arrow = edge.directed.then(|| self.arrowhead(&curve));
                EdgeGeometry {
                    id: edge.id,
                    curve,
                    label_anchor,
                    arrow,
                    base_offset,
                }
            })
            .collect()
    }
}
