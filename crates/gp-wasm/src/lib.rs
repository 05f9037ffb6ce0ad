//! WASM bridge for Graphpad: exposes the canvas engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host owns the `<canvas>`
//! element and DOM listeners; it forwards events here, repaints when told
//! to, and schedules `run_deferred` with `setTimeout(…, 0)` whenever an
//! update says so.
//!
//! Structured data crosses the boundary as JSON strings.

mod render2d;

use gp_core::config::CanvasConfig;
use gp_core::display::{DisplayList, Selection};
use gp_core::geometry::EdgeCurve;
use gp_core::id::{EdgeId, NodeId};
use gp_core::model::{Edge, EdgePatch, Node, NodePatch, PatchError};
use gp_editor::controller::{CanvasController, GraphMutation, Update};
use gp_editor::input::InputEvent;
use gp_editor::shortcuts::{ShortcutAction, ShortcutMap};
use gp_render::hit::PointerTarget;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// Host-facing graph document: `{"nodes": [...], "edges": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// The main WASM-facing canvas controller.
///
/// All interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct GraphCanvas {
    controller: CanvasController,
    width: f64,
    height: f64,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl GraphCanvas {
    /// Create a new canvas controller with the given dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self::build(width, height, CanvasConfig::default())
    }

    /// Like `new`, with a JSON `CanvasConfig` (camelCase keys, all optional).
    /// Malformed JSON falls back to the defaults.
    pub fn with_config(width: f64, height: f64, config_json: &str) -> Self {
        console_error_panic_hook_setup();
        let config = serde_json::from_str(config_json).unwrap_or_else(|e| {
            log::warn!("invalid canvas config, using defaults: {e}");
            CanvasConfig::default()
        });
        Self::build(width, height, config)
    }

    // ─── Graph data ──────────────────────────────────────────────────────

    /// Replace the graph with a JSON document. Returns `false` on malformed input.
    pub fn set_graph(&mut self, json: &str) -> bool {
        match serde_json::from_str::<GraphDocument>(json) {
            Ok(doc) => {
                self.controller.load_graph(doc.nodes, doc.edges);
                true
            }
            Err(e) => {
                log::warn!("set_graph: {e}");
                false
            }
        }
    }

    /// Current graph as a JSON document.
    pub fn get_graph(&self) -> String {
        let model = self.controller.model();
        let doc = GraphDocument {
            nodes: model.nodes().to_vec(),
            edges: model.edges().to_vec(),
        };
        serde_json::to_string(&doc).unwrap_or_else(|_| r#"{"nodes":[],"edges":[]}"#.to_string())
    }

    /// Neighbour lists for algorithm runners: `{"nodeId": ["neighbourId", ...]}`.
    /// Undirected edges appear in both lists; dangling edges are skipped.
    pub fn get_adjacency(&self) -> String {
        adjacency_json(&self.controller).to_string()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the display list to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        render2d::render_display_list(ctx, self.controller.display_list(), self.width, self.height, &theme);
    }

    /// The display list as JSON, for hosts that draw with SVG or their own canvas code.
    pub fn get_display_list(&self) -> String {
        display_list_json(self.controller.display_list()).to_string()
    }

    /// Set the canvas theme.
    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Resize the canvas. Only the zoom-button anchor depends on it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    // ─── Pointer API ─────────────────────────────────────────────────────
    //
    // Each handler returns an update JSON:
    // `{"redraw":bool,"graph":bool,"selection":bool,"viewport":bool,"deferred":bool}`.

    pub fn handle_pointer_down(&mut self, x: f64, y: f64, button: i16) -> String {
        self.input(InputEvent::pointer_down(x, y, button))
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> String {
        self.input(InputEvent::pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        self.input(InputEvent::pointer_up(x, y))
    }

    pub fn handle_click(&mut self, x: f64, y: f64) -> String {
        self.input(InputEvent::click(x, y))
    }

    /// The host should always `preventDefault()` the browser menu.
    pub fn handle_context_menu(&mut self, x: f64, y: f64) -> String {
        self.input(InputEvent::context_menu(x, y))
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        self.input(InputEvent::wheel(x, y, delta_y))
    }

    /// Call from `setTimeout(…, 0)` after an update with `"deferred":true`.
    pub fn run_deferred(&mut self) {
        self.controller.run_deferred();
    }

    /// What is under a screen point, for hover cursors:
    /// `{"kind":"node"|"edge"|"canvas","id":…}`.
    pub fn target_at(&self, x: f64, y: f64) -> String {
        let value = match self.controller.target_at(Point::new(x, y)) {
            PointerTarget::Node(id) => json!({ "kind": "node", "id": id.as_str() }),
            PointerTarget::Edge(id) => json!({ "kind": "edge", "id": id.as_str() }),
            PointerTarget::Canvas => json!({ "kind": "canvas" }),
        };
        value.to_string()
    }

    /// Name of the interaction state: `idle`, `panning`, `dragging`, `adding-edge`.
    pub fn get_mode(&self) -> String {
        self.controller.state().name().to_string()
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"action":"<action_name>", ...update}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            let mut out = update_json(Update::default());
            out["action"] = json!("none");
            return out.to_string();
        };
        let center = self.center();
        let mut out = update_json(self.controller.run_shortcut(action, center));
        out["action"] = json!(action_to_name(action));
        out.to_string()
    }

    /// Delete the selected node or edge. Returns true if anything was deleted.
    pub fn delete_selected(&mut self) -> bool {
        self.controller.delete_selected().graph
    }

    pub fn set_disabled(&mut self, disabled: bool) -> bool {
        self.controller.set_disabled(disabled).needs_redraw()
    }

    pub fn is_disabled(&self) -> bool {
        self.controller.is_disabled()
    }

    // ─── Zoom API ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        let center = self.center();
        self.controller.zoom_in(center).viewport
    }

    pub fn zoom_out(&mut self) -> bool {
        let center = self.center();
        self.controller.zoom_out(center).viewport
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.controller.reset_zoom().viewport
    }

    /// Apply zoom-box text; returns what the box should display.
    pub fn apply_zoom_input(&mut self, text: &str) -> String {
        let center = self.center();
        self.controller.apply_zoom_input(text, center).0
    }

    /// `round(scale * 100)` as text, for the zoom box.
    pub fn get_zoom_percent(&self) -> String {
        self.controller.viewport().percent_label()
    }

    /// `{"scale":…, "offsetX":…, "offsetY":…}`.
    pub fn get_viewport(&self) -> String {
        serde_json::to_string(&self.controller.viewport().state()).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Selection & properties ──────────────────────────────────────────

    /// `{"kind":"none"}`, `{"kind":"node","id":…}` or `{"kind":"edge","id":…}`.
    pub fn get_selection(&self) -> String {
        selection_json(self.controller.selection()).to_string()
    }

    /// Select a node by id; an empty id clears the selection.
    /// Returns `true` if the selection now matches the request.
    pub fn select_node(&mut self, id: &str) -> bool {
        let target = if id.is_empty() {
            Selection::None
        } else {
            Selection::Node(NodeId::intern(id))
        };
        self.controller.select(target);
        self.controller.selection() == target
    }

    pub fn select_edge(&mut self, id: &str) -> bool {
        let target = Selection::Edge(EdgeId::intern(id));
        self.controller.select(target);
        self.controller.selection() == target
    }

    /// The selected node or edge record as JSON, or `{}` if none.
    pub fn get_selected_props(&self) -> String {
        let model = self.controller.model();
        let value = match self.controller.selection() {
            Selection::None => None,
            Selection::Node(id) => model.node(id).and_then(|n| serde_json::to_value(n).ok()),
            Selection::Edge(id) => model.edge(id).and_then(|e| serde_json::to_value(e).ok()),
        };
        value.unwrap_or_else(|| json!({})).to_string()
    }

    /// Patch a node from a JSON object such as `{"label":"A","size":30}`.
    /// Returns `false` if the patch is malformed or the node is absent.
    pub fn set_node_props(&mut self, id: &str, json: &str) -> bool {
        match parse_node_patch(json) {
            Ok(patch) => self
                .controller
                .mutate(GraphMutation::UpdateNode {
                    id: NodeId::intern(id),
                    patch,
                })
                .graph,
            Err(e) => {
                log::warn!("set_node_props({id}): {e}");
                false
            }
        }
    }

    /// Patch an edge, e.g. `{"directed":true,"weight":null}`.
    pub fn set_edge_props(&mut self, id: &str, json: &str) -> bool {
        match parse_edge_patch(json) {
            Ok(patch) => self
                .controller
                .mutate(GraphMutation::UpdateEdge {
                    id: EdgeId::intern(id),
                    patch,
                })
                .graph,
            Err(e) => {
                log::warn!("set_edge_props({id}): {e}");
                false
            }
        }
    }
}

impl GraphCanvas {
    fn build(width: f64, height: f64, config: CanvasConfig) -> Self {
        Self {
            controller: CanvasController::new(config),
            width,
            height,
            dark_mode: false,
        }
    }

    fn input(&mut self, event: InputEvent) -> String {
        update_json(self.controller.handle_input(&event)).to_string()
    }

    fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

pub fn parse_node_patch(json: &str) -> Result<NodePatch, PatchError> {
    let patch: NodePatch = patch_object(json)?;
    patch.validate()?;
    Ok(patch)
}

pub fn parse_edge_patch(json: &str) -> Result<EdgePatch, PatchError> {
    let patch: EdgePatch = patch_object(json)?;
    patch.validate()?;
    Ok(patch)
}

/// Patches must be JSON objects; serde would otherwise accept arrays as
/// positional fields.
fn patch_object<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, PatchError> {
    let fields: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).map_err(|e| PatchError::Malformed(e.to_string()))?;
    serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| PatchError::Malformed(e.to_string()))
}

fn update_json(update: Update) -> serde_json::Value {
    json!({
        "redraw": update.needs_redraw(),
        "graph": update.graph,
        "selection": update.selection,
        "viewport": update.viewport,
        "deferred": update.schedule_deferred,
    })
}

fn selection_json(selection: Selection) -> serde_json::Value {
    match selection {
        Selection::None => json!({ "kind": "none" }),
        Selection::Node(id) => json!({ "kind": "node", "id": id.as_str() }),
        Selection::Edge(id) => json!({ "kind": "edge", "id": id.as_str() }),
    }
}

fn pt(p: Point) -> serde_json::Value {
    json!([p.x, p.y])
}

fn display_list_json(list: &DisplayList) -> serde_json::Value {
    let edges: Vec<serde_json::Value> = list
        .edges
        .iter()
        .map(|e| {
            let curve = match e.curve {
                EdgeCurve::Quad(q) => json!({ "kind": "quad", "points": [pt(q.p0), pt(q.p1), pt(q.p2)] }),
                EdgeCurve::Loop(c) => {
                    json!({ "kind": "cubic", "points": [pt(c.p0), pt(c.p1), pt(c.p2), pt(c.p3)] })
                }
            };
            json!({
                "id": e.id.as_str(),
                "curve": curve,
                "arrow": e.arrow.map(|a| json!([pt(a.tip), pt(a.left), pt(a.right)])),
                "label": e.label.as_ref().map(|l| json!({ "text": l.text, "at": pt(l.anchor) })),
                "hitWidth": e.hit_width,
                "selected": e.selected,
            })
        })
        .collect();
    let nodes: Vec<serde_json::Value> = list
        .nodes
        .iter()
        .map(|n| {
            json!({
                "id": n.id.as_str(),
                "center": pt(n.center),
                "radius": n.radius,
                "color": n.color,
                "label": n.label,
                "selected": n.selected,
            })
        })
        .collect();
    json!({
        "viewport": list.viewport,
        "strokeWidth": list.stroke_width,
        "edges": edges,
        "nodes": nodes,
        "preview": list.preview.map(|p| json!({ "source": p.source.as_str(), "from": pt(p.start), "to": pt(p.end) })),
    })
}

fn adjacency_json(controller: &CanvasController) -> serde_json::Value {
    let (graph, index) = controller.model().to_petgraph();
    let mut out = serde_json::Map::new();
    for node in controller.model().nodes() {
        let Some(&idx) = index.get(&node.id) else {
            continue;
        };
        let mut neighbours: Vec<&str> = graph.neighbors(idx).map(|n| graph[n].as_str()).collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        out.insert(node.id.as_str().to_string(), json!(neighbours));
    }
    serde_json::Value::Object(out)
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Delete => "delete",
        ShortcutAction::CancelEdge => "cancelEdge",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ZoomReset => "zoomReset",
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Graphpad WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r##"{
        "nodes": [
            {"id": "A", "x": 100, "y": 100, "size": 15, "color": "#4F46E5", "label": "A"},
            {"id": "B", "x": 300, "y": 100, "size": 15, "color": "#22C55E", "label": "B"}
        ],
        "edges": [
            {"id": "ab", "from": "A", "to": "B", "directed": true, "weight": 2.5, "showWeight": true},
            {"id": "bx", "from": "B", "to": "X", "directed": false, "weight": null, "showWeight": false}
        ]
    }"##;

    fn parsed(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn graph_json_roundtrip_keeps_dangling_edges() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        assert!(canvas.set_graph(DOC));
        let out: GraphDocument = serde_json::from_str(&canvas.get_graph()).unwrap();
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.edges.len(), 2);
        assert_eq!(out.edges[0].weight, Some(2.5));
        assert!(!canvas.set_graph("{not json"));
    }

    #[test]
    fn display_list_json_shape() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.set_graph(DOC);
        let v = parsed(&canvas.get_display_list());
        let edges = v["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0]["curve"]["kind"], "quad");
        assert_eq!(edges[0]["curve"]["points"][0], json!([115.0, 100.0]));
        assert_eq!(edges[0]["label"]["text"], "2.5");
        assert_eq!(edges[0]["label"]["at"], json!([200.0, 92.0]));
        assert_eq!(edges[0]["hitWidth"], 24.0);
        assert!(edges[0]["arrow"].is_array());
        assert_eq!(v["nodes"][1]["color"], "#22C55E");
        assert_eq!(v["viewport"]["scale"], 1.0);
        assert!(v["preview"].is_null());
    }

    #[test]
    fn click_adds_node_and_reports_update() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.handle_pointer_down(50.0, 60.0, 0);
        canvas.handle_pointer_up(50.0, 60.0);
        let update = parsed(&canvas.handle_click(50.0, 60.0));
        assert_eq!(update["graph"], true);
        assert_eq!(update["redraw"], true);
        assert_eq!(update["deferred"], false);
        let graph: GraphDocument = serde_json::from_str(&canvas.get_graph()).unwrap();
        assert_eq!(graph.nodes[0].id.as_str(), "node_1");
    }

    #[test]
    fn pan_asks_for_deferred_run() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.handle_pointer_down(10.0, 10.0, 0);
        canvas.handle_pointer_move(60.0, 10.0);
        let update = parsed(&canvas.handle_pointer_up(60.0, 10.0));
        assert_eq!(update["deferred"], true);
        assert_eq!(parsed(&canvas.get_viewport())["offsetX"], 50.0);
        canvas.run_deferred();
    }

    #[test]
    fn property_patches() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.set_graph(DOC);
        assert!(canvas.set_node_props("A", r#"{"label":"start","size":30}"#));
        assert!(!canvas.set_node_props("A", r#"{"size":-1}"#));
        assert!(!canvas.set_node_props("A", r#"{"bogus":1}"#));
        assert!(!canvas.set_node_props("ghost", r#"{"label":"x"}"#));
        assert!(canvas.set_edge_props("ab", r#"{"weight":null}"#));

        assert!(canvas.select_node("A"));
        let props = parsed(&canvas.get_selected_props());
        assert_eq!(props["label"], "start");
        assert_eq!(props["size"], 30.0);
        assert!(canvas.select_edge("ab"));
        assert_eq!(parsed(&canvas.get_selected_props())["weight"], serde_json::Value::Null);
        assert!(!canvas.select_edge("bx_missing"));
    }

    #[test]
    fn patch_errors_are_typed() {
        assert!(matches!(parse_node_patch("[]"), Err(PatchError::Malformed(_))));
        assert!(matches!(parse_node_patch("[1.0, 2.0]"), Err(PatchError::Malformed(_))));
        assert!(matches!(parse_edge_patch("[true]"), Err(PatchError::Malformed(_))));
        assert_eq!(parse_node_patch(r#"{"x":1.0,"y":2.0}"#).unwrap().y, Some(2.0));
        assert_eq!(parse_node_patch(r#"{"size":0}"#), Err(PatchError::InvalidSize(0.0)));
        assert_eq!(parse_edge_patch(r#"{"directed":true}"#).unwrap().directed, Some(true));
        assert_eq!(parse_edge_patch(r#"{"weight":null}"#).unwrap().weight, Some(None));
    }

    #[test]
    fn keyboard_and_zoom_controls() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.set_graph(DOC);
        canvas.select_node("B");
        let out = parsed(&canvas.handle_key("Delete", false, false, false, false));
        assert_eq!(out["action"], "delete");
        assert_eq!(out["graph"], true);
        assert_eq!(parsed(&canvas.get_selection())["kind"], "none");

        assert_eq!(parsed(&canvas.handle_key("q", false, false, false, false))["action"], "none");
        assert_eq!(canvas.apply_zoom_input("abc"), "100");
        assert_eq!(canvas.apply_zoom_input("300"), "300");
        assert!(canvas.reset_zoom());
        assert_eq!(canvas.get_zoom_percent(), "100");
    }

    #[test]
    fn adjacency_mirrors_undirected_edges() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.set_graph(DOC);
        canvas.set_edge_props("ab", r#"{"directed":false}"#);
        let adj = parsed(&canvas.get_adjacency());
        assert_eq!(adj["A"], json!(["B"]));
        assert_eq!(adj["B"], json!(["A"]));
    }

    #[test]
    fn target_at_reports_shape_under_pointer() {
        let mut canvas = GraphCanvas::new(800.0, 600.0);
        canvas.set_graph(DOC);
        assert_eq!(parsed(&canvas.target_at(100.0, 100.0)), json!({ "kind": "node", "id": "A" }));
        assert_eq!(parsed(&canvas.target_at(200.0, 100.0)), json!({ "kind": "edge", "id": "ab" }));
        assert_eq!(parsed(&canvas.target_at(500.0, 500.0)), json!({ "kind": "canvas" }));
    }

    #[test]
    fn config_json_overrides_defaults() {
        let mut canvas = GraphCanvas::with_config(800.0, 600.0, r#"{"hitTargetPx": 40}"#);
        canvas.set_graph(DOC);
        assert_eq!(parsed(&canvas.get_display_list())["edges"][0]["hitWidth"], 40.0);
        let fallback = GraphCanvas::with_config(800.0, 600.0, "nope");
        assert_eq!(fallback.controller.config().hit_target_px, 24.0);
    }
}
