//! Canvas controller: the single owner of model, viewport, selection and
//! interaction state.
//!
//! Hosts feed it input events and commands; every entry point reports what
//! changed in an `Update` so the host knows whether to repaint, notify
//! selection listeners, or schedule `run_deferred`. The display list is
//! rebuilt after each change and cached until the next one.

use crate::input::InputEvent;
use crate::interaction::{Action, InteractionMachine, InteractionState};
use crate::shortcuts::ShortcutAction;
use gp_core::config::CanvasConfig;
use gp_core::display::{DisplayList, Selection};
use gp_core::geometry::GeometryEngine;
use gp_core::id::{EdgeId, NodeId};
use gp_core::model::{Edge, EdgePatch, GraphModel, Node, NodePatch};
use gp_core::viewport::{ViewportTransform, WheelDirection};
use gp_render::hit::{PointerTarget, hit_test};
use kurbo::Point;

/// An edit to the graph, produced by interaction or requested by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    AddNode { at: Point },
    AddEdge { from: NodeId, to: NodeId },
    MoveNode { id: NodeId, dx: f64, dy: f64 },
    RemoveNode { id: NodeId },
    RemoveEdge { id: EdgeId },
    UpdateNode { id: NodeId, patch: NodePatch },
    UpdateEdge { id: EdgeId, patch: EdgePatch },
}

/// What an entry point changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update {
    /// Nodes or edges were added, removed or edited.
    pub graph: bool,
    pub selection: bool,
    pub viewport: bool,
    /// Something visible changed that is neither of the above (preview).
    pub overlay: bool,
    /// The host should call `run_deferred` from a zero-delay task.
    pub schedule_deferred: bool,
}

impl Update {
    pub fn needs_redraw(&self) -> bool {
        self.graph || self.selection || self.viewport || self.overlay
    }

    fn merge(&mut self, other: Update) {
        self.graph |= other.graph;
        self.selection |= other.selection;
        self.viewport |= other.viewport;
        self.overlay |= other.overlay;
        self.schedule_deferred |= other.schedule_deferred;
    }
}

pub struct CanvasController {
    model: GraphModel,
    viewport: ViewportTransform,
    engine: GeometryEngine,
    machine: InteractionMachine,
    selection: Selection,
    display: DisplayList,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasController {
    pub fn new(config: CanvasConfig) -> Self {
        let model = GraphModel::new(&config);
        Self::with_model(config, model)
    }

    /// Controller over host-provided nodes and edges.
    pub fn with_graph(config: CanvasConfig, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let model = GraphModel::from_parts(&config, nodes, edges);
        Self::with_model(config, model)
    }

    fn with_model(config: CanvasConfig, model: GraphModel) -> Self {
        let viewport = ViewportTransform::new(&config);
        let machine = InteractionMachine::new(config.drag_threshold_px);
        let engine = GeometryEngine::new(config);
        let display = DisplayList::build(&model, &viewport, &engine, Selection::None, None);
        Self {
            model,
            viewport,
            engine,
            machine,
            selection: Selection::None,
            display,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn state(&self) -> &InteractionState {
        self.machine.state()
    }

    pub fn config(&self) -> &CanvasConfig {
        self.engine.config()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.display
    }

    pub fn is_disabled(&self) -> bool {
        self.machine.is_disabled()
    }

    /// What sits under a screen point.
    pub fn target_at(&self, screen: Point) -> PointerTarget {
        hit_test(&self.display, self.viewport.to_content(screen))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route one input event through the state machine and apply the result.
    pub fn handle_input(&mut self, event: &InputEvent) -> Update {
        if let InputEvent::Wheel { at, delta_y } = *event {
            if self.machine.is_disabled() {
                return Update::default();
            }
            self.viewport.wheel(WheelDirection::from_delta(delta_y), at);
            return self.finish(Update {
                viewport: true,
                ..Update::default()
            });
        }

        let target = if event.needs_target() {
            self.target_at(event.position())
        } else {
            PointerTarget::Canvas
        };
        let actions = self.machine.handle(event, target, &self.viewport, &self.model);

        let mut update = Update::default();
        for action in actions {
            update.merge(self.apply_action(action));
        }
        self.finish(update)
    }

    /// Lift click suppression. Call from a zero-delay task after an
    /// `Update` asked for it.
    pub fn run_deferred(&mut self) {
        self.machine.run_deferred();
    }

    fn apply_action(&mut self, action: Action) -> Update {
        match action {
            Action::Mutate(mutation) => {
                let before = self.selection;
                let graph = self.apply_mutation(mutation);
                Update {
                    graph,
                    selection: before != self.selection,
                    ..Update::default()
                }
            }
            Action::PanBy(delta) => {
                self.viewport.pan_by(delta);
                Update {
                    viewport: true,
                    ..Update::default()
                }
            }
            Action::Select(selection) => Update {
                selection: self.set_selection(selection),
                ..Update::default()
            },
            Action::ScheduleDeferred => Update {
                schedule_deferred: true,
                ..Update::default()
            },
            Action::Redraw => Update {
                overlay: true,
                ..Update::default()
            },
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a graph mutation. Returns whether the graph changed.
    ///
    /// Removing a node or edge also drops it from the selection and from
    /// any gesture that references it.
    pub fn apply_mutation(&mut self, mutation: GraphMutation) -> bool {
        match mutation {
            GraphMutation::AddNode { at } => {
                self.model.add_node(at);
                true
            }
            GraphMutation::AddEdge { from, to } => {
                if !(self.model.contains_node(from) && self.model.contains_node(to)) {
                    log::debug!("add edge {from:?} -> {to:?} skipped: endpoint missing");
                    return false;
                }
                self.model.add_edge(from, to);
                true
            }
            GraphMutation::MoveNode { id, dx, dy } => {
                let Some(node) = self.model.node(id) else {
                    return false;
                };
                let patch = NodePatch::position(Point::new(node.x + dx, node.y + dy));
                self.model.update_node(id, &patch)
            }
            GraphMutation::RemoveNode { id } => {
                let removed = self.model.delete_node(id);
                if removed {
                    self.forget_missing();
                }
                removed
            }
            GraphMutation::RemoveEdge { id } => {
                let removed = self.model.delete_edge(id);
                if removed {
                    self.forget_missing();
                }
                removed
            }
            GraphMutation::UpdateNode { id, patch } => self.model.update_node(id, &patch),
            GraphMutation::UpdateEdge { id, patch } => self.model.update_edge(id, &patch),
        }
    }

    /// Apply a mutation from outside the pointer flow and refresh.
    pub fn mutate(&mut self, mutation: GraphMutation) -> Update {
        let before = self.selection;
        let graph = self.apply_mutation(mutation);
        self.finish(Update {
            graph,
            selection: before != self.selection,
            ..Update::default()
        })
    }

    /// Replace the whole graph with host-provided lists.
    pub fn load_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Update {
        self.model = GraphModel::from_parts(self.engine.config(), nodes, edges);
        let before = self.selection;
        self.forget_missing();
        self.finish(Update {
            graph: true,
            selection: before != self.selection,
            ..Update::default()
        })
    }

    /// Delete whatever is selected and clear the selection.
    pub fn delete_selected(&mut self) -> Update {
        if self.machine.is_disabled() {
            return Update::default();
        }
        let mutation = match self.selection {
            Selection::None => return Update::default(),
            Selection::Node(id) => GraphMutation::RemoveNode { id },
            Selection::Edge(id) => GraphMutation::RemoveEdge { id },
        };
        let before = self.selection;
        let graph = self.apply_mutation(mutation);
        self.set_selection(Selection::None);
        self.finish(Update {
            graph,
            selection: before != self.selection,
            ..Update::default()
        })
    }

    /// Select programmatically, e.g. from a side panel.
    pub fn select(&mut self, selection: Selection) -> Update {
        let valid = match selection {
            Selection::None => true,
            Selection::Node(id) => self.model.contains_node(id),
            Selection::Edge(id) => self.model.edge(id).is_some(),
        };
        if !valid {
            return Update::default();
        }
        let selection = self.set_selection(selection);
        self.finish(Update {
            selection,
            ..Update::default()
        })
    }

    fn set_selection(&mut self, selection: Selection) -> bool {
        if self.selection == selection {
            return false;
        }
        log::debug!("selection: {:?} -> {:?}", self.selection, selection);
        self.selection = selection;
        true
    }

    /// Drop selection and gesture state that point at removed items.
    fn forget_missing(&mut self) {
        let stale = match self.selection {
            Selection::None => false,
            Selection::Node(id) => !self.model.contains_node(id),
            Selection::Edge(id) => self.model.edge(id).is_none(),
        };
        if stale {
            self.selection = Selection::None;
        }
        let gesture_stale = match *self.machine.state() {
            InteractionState::DraggingNode { node, .. } => !self.model.contains_node(node),
            InteractionState::AddingEdge { from, .. } => !self.model.contains_node(from),
            InteractionState::Idle | InteractionState::Panning { .. } => false,
        };
        if gesture_stale {
            self.machine.reset();
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Enable or disable editing. In-flight gestures are abandoned.
    pub fn set_disabled(&mut self, disabled: bool) -> Update {
        let had_overlay = self.machine.pending_edge().is_some();
        self.machine.set_disabled(disabled);
        self.finish(Update {
            overlay: had_overlay,
            ..Update::default()
        })
    }

    pub fn cancel_edge(&mut self) -> Update {
        let overlay = self.machine.cancel_edge();
        self.finish(Update {
            overlay,
            ..Update::default()
        })
    }

    pub fn zoom_in(&mut self, canvas_center: Point) -> Update {
        self.viewport.zoom_in(canvas_center);
        self.viewport_changed()
    }

    pub fn zoom_out(&mut self, canvas_center: Point) -> Update {
        self.viewport.zoom_out(canvas_center);
        self.viewport_changed()
    }

    pub fn reset_zoom(&mut self) -> Update {
        self.viewport.reset();
        self.viewport_changed()
    }

    /// Apply zoom-box text; returns the text the box should show.
    pub fn apply_zoom_input(&mut self, text: &str, canvas_center: Point) -> (String, Update) {
        let before = self.viewport.state();
        let shown = self.viewport.apply_percent_input(text, canvas_center);
        let update = if before == self.viewport.state() {
            Update::default()
        } else {
            self.viewport_changed()
        };
        (shown, update)
    }

    /// Run a resolved keyboard shortcut.
    pub fn run_shortcut(&mut self, action: ShortcutAction, canvas_center: Point) -> Update {
        match action {
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::CancelEdge => self.cancel_edge(),
            ShortcutAction::ZoomIn => self.zoom_in(canvas_center),
            ShortcutAction::ZoomOut => self.zoom_out(canvas_center),
            ShortcutAction::ZoomReset => self.reset_zoom(),
        }
    }

    fn viewport_changed(&mut self) -> Update {
        self.finish(Update {
            viewport: true,
            ..Update::default()
        })
    }

    fn finish(&mut self, update: Update) -> Update {
        if update.needs_redraw() {
            self.rebuild();
        }
        update
    }

    /// Recompute the cached display list.
    pub fn rebuild(&mut self) {
        self.display = DisplayList::build(
            &self.model,
            &self.viewport,
            &self.engine,
            self.selection,
            self.machine.pending_edge(),
        );
    }
}
