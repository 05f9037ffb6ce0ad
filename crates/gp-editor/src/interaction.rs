//! Pointer interaction state machine.
//!
//! One dispatch, `handle`, turns a normalized `InputEvent` plus the shape
//! under the pointer into a list of `Action`s for the controller to apply.
//! The machine never touches the model or viewport itself.
//!
//! | From | Event | To |
//! |------|-------|----|
//! | Idle | press on empty canvas | Panning |
//! | Idle | press on node | DraggingNode |
//! | Idle | context menu on node | AddingEdge |
//! | Panning / DraggingNode | release | Idle |
//! | AddingEdge | click on node | Idle (edge added) |
//! | AddingEdge | click on empty canvas | Idle (cancelled) |
//!
//! A press that moved more than the drag threshold suppresses the click the
//! browser fires right after the release. The suppression outlives the
//! release and is lifted by `run_deferred`, which the host calls once the
//! current event queue has drained.

use crate::controller::GraphMutation;
use crate::input::{InputEvent, PointerButton};
use gp_core::display::Selection;
use gp_core::id::NodeId;
use gp_core::model::GraphModel;
use gp_core::viewport::ViewportTransform;
use gp_render::hit::PointerTarget;
use kurbo::{Point, Vec2};
use smallvec::{SmallVec, smallvec};

/// Mutually exclusive interaction modes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        start_screen: Point,
        start_offset: Vec2,
        last_screen: Point,
        moved: bool,
    },
    DraggingNode {
        node: NodeId,
        start_screen: Point,
        last_screen: Point,
        moved: bool,
    },
    AddingEdge {
        from: NodeId,
        /// Preview end, in content coordinates.
        cursor: Point,
    },
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::DraggingNode { .. } => "dragging",
            Self::AddingEdge { .. } => "adding-edge",
        }
    }

    /// Whether this state holds a reference to `id`.
    pub fn refers_to(&self, id: NodeId) -> bool {
        match *self {
            Self::DraggingNode { node, .. } => node == id,
            Self::AddingEdge { from, .. } => from == id,
            Self::Idle | Self::Panning { .. } => false,
        }
    }
}

/// Something the controller must do in response to an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Mutate(GraphMutation),
    PanBy(Vec2),
    Select(Selection),
    /// Ask the host to call `run_deferred` from a zero-delay task.
    ScheduleDeferred,
    /// The add-edge preview moved; only a redraw is needed.
    Redraw,
}

pub type Actions = SmallVec<[Action; 2]>;

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    suppress_click: bool,
    disabled: bool,
    drag_threshold: f64,
}

impl InteractionMachine {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            state: InteractionState::Idle,
            suppress_click: false,
            disabled: false,
            drag_threshold,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn click_suppressed(&self) -> bool {
        self.suppress_click
    }

    /// Source node and cursor while an edge is being drawn.
    pub fn pending_edge(&self) -> Option<(NodeId, Point)> {
        match self.state {
            InteractionState::AddingEdge { from, cursor } => Some((from, cursor)),
            _ => None,
        }
    }

    /// Toggle the disabled flag. Any gesture in flight is abandoned.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.reset();
    }

    /// Force the machine back to `Idle`. Returns whether anything changed.
    pub fn reset(&mut self) -> bool {
        let was = self.state;
        self.state = InteractionState::Idle;
        if was != InteractionState::Idle {
            log::debug!("interaction: {} -> idle (reset)", was.name());
            return true;
        }
        false
    }

    /// Abandon edge creation. Returns whether an edge was pending.
    pub fn cancel_edge(&mut self) -> bool {
        if matches!(self.state, InteractionState::AddingEdge { .. }) {
            self.reset()
        } else {
            false
        }
    }

    /// Work queued for after the current event queue drains.
    pub fn run_deferred(&mut self) {
        self.suppress_click = false;
    }

    /// Feed one event. `target` is what sits under the pointer.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        target: PointerTarget,
        viewport: &ViewportTransform,
        model: &GraphModel,
    ) -> Actions {
        if self.disabled {
            return Actions::new();
        }
        let before = self.state.name();
        let actions = self.dispatch(event, target, viewport, model);
        if before != self.state.name() {
            log::debug!("interaction: {before} -> {}", self.state.name());
        }
        actions
    }

    fn dispatch(
        &mut self,
        event: &InputEvent,
        target: PointerTarget,
        viewport: &ViewportTransform,
        model: &GraphModel,
    ) -> Actions {
        use InteractionState as S;

        match (self.state, *event) {
            // ─── Idle ────────────────────────────────────────────────────
            (S::Idle, InputEvent::PointerDown { at, button: PointerButton::Primary }) => {
                match target {
                    PointerTarget::Canvas => {
                        self.state = S::Panning {
                            start_screen: at,
                            start_offset: viewport.offset(),
                            last_screen: at,
                            moved: false,
                        };
                    }
                    PointerTarget::Node(node) => {
                        self.state = S::DraggingNode {
                            node,
                            start_screen: at,
                            last_screen: at,
                            moved: false,
                        };
                    }
                    PointerTarget::Edge(_) => {}
                }
                Actions::new()
            }
            (S::Idle, InputEvent::Click { at }) => {
                if self.suppress_click {
                    log::trace!("click suppressed after drag");
                    return Actions::new();
                }
                match target {
                    PointerTarget::Canvas => smallvec![
                        Action::Mutate(GraphMutation::AddNode {
                            at: viewport.to_content(at),
                        }),
                        Action::Select(Selection::None),
                    ],
                    PointerTarget::Node(id) => smallvec![Action::Select(Selection::Node(id))],
                    PointerTarget::Edge(id) => smallvec![Action::Select(Selection::Edge(id))],
                }
            }
            (S::Idle, InputEvent::ContextMenu { .. }) => {
                let PointerTarget::Node(from) = target else {
                    return Actions::new();
                };
                let Some(node) = model.node(from) else {
                    return Actions::new();
                };
                self.state = S::AddingEdge {
                    from,
                    cursor: node.center(),
                };
                smallvec![Action::Select(Selection::Node(from))]
            }

            // ─── Panning ─────────────────────────────────────────────────
            (
                S::Panning {
                    start_screen,
                    start_offset,
                    last_screen,
                    moved,
                },
                InputEvent::PointerMove { at },
            ) => {
                self.state = S::Panning {
                    start_screen,
                    start_offset,
                    last_screen: at,
                    moved: moved || self.past_threshold(start_screen, at),
                };
                smallvec![Action::PanBy(at - last_screen)]
            }
            (S::Panning { moved, .. }, InputEvent::PointerUp { .. }) => {
                self.state = S::Idle;
                self.finish_press(moved)
            }

            // ─── DraggingNode ────────────────────────────────────────────
            (
                S::DraggingNode {
                    node,
                    start_screen,
                    last_screen,
                    moved,
                },
                InputEvent::PointerMove { at },
            ) => {
                self.state = S::DraggingNode {
                    node,
                    start_screen,
                    last_screen: at,
                    moved: moved || self.past_threshold(start_screen, at),
                };
                let delta = (at - last_screen) / viewport.scale();
                smallvec![Action::Mutate(GraphMutation::MoveNode {
                    id: node,
                    dx: delta.x,
                    dy: delta.y,
                })]
            }
            (S::DraggingNode { moved, .. }, InputEvent::PointerUp { .. }) => {
                self.state = S::Idle;
                self.finish_press(moved)
            }

            // ─── AddingEdge ──────────────────────────────────────────────
            (S::AddingEdge { from, .. }, InputEvent::PointerMove { at }) => {
                self.state = S::AddingEdge {
                    from,
                    cursor: viewport.to_content(at),
                };
                smallvec![Action::Redraw]
            }
            (S::AddingEdge { from, .. }, InputEvent::Click { .. }) => match target {
                PointerTarget::Node(to) => {
                    self.state = S::Idle;
                    smallvec![Action::Mutate(GraphMutation::AddEdge { from, to })]
                }
                PointerTarget::Canvas => {
                    self.state = S::Idle;
                    log::debug!("edge creation from {from:?} cancelled");
                    smallvec![Action::Redraw]
                }
                PointerTarget::Edge(_) => Actions::new(),
            },

            _ => Actions::new(),
        }
    }

    fn past_threshold(&self, start: Point, now: Point) -> bool {
        (now - start).hypot() > self.drag_threshold
    }

    fn finish_press(&mut self, moved: bool) -> Actions {
        if moved {
            self.suppress_click = true;
            smallvec![Action::ScheduleDeferred]
        } else {
            Actions::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Rig {
        machine: InteractionMachine,
        viewport: ViewportTransform,
        model: GraphModel,
        a: NodeId,
        b: NodeId,
    }

    fn rig() -> Rig {
        let mut model = GraphModel::default();
        let a = model.add_node(Point::new(100.0, 100.0)).id;
        let b = model.add_node(Point::new(300.0, 100.0)).id;
        Rig {
            machine: InteractionMachine::new(2.0),
            viewport: ViewportTransform::default(),
            model,
            a,
            b,
        }
    }

    impl Rig {
        fn send(&mut self, event: InputEvent, target: PointerTarget) -> Actions {
            self.machine.handle(&event, target, &self.viewport, &self.model)
        }
    }

    #[test]
    fn click_on_canvas_adds_node_in_content_space() {
        let mut r = rig();
        r.viewport.zoom_at(2.0, Point::ZERO);
        let actions = r.send(InputEvent::click(50.0, 80.0), PointerTarget::Canvas);
        assert_eq!(
            actions.to_vec(),
            vec![
                Action::Mutate(GraphMutation::AddNode {
                    at: Point::new(25.0, 40.0)
                }),
                Action::Select(Selection::None),
            ]
        );
    }

    #[test]
    fn pan_moves_offset_and_suppresses_click() {
        let mut r = rig();
        r.send(InputEvent::pointer_down(10.0, 10.0, 0), PointerTarget::Canvas);
        assert!(matches!(r.machine.state(), InteractionState::Panning { .. }));
        let actions = r.send(InputEvent::pointer_move(30.0, 15.0), PointerTarget::Canvas);
        assert_eq!(actions.to_vec(), vec![Action::PanBy(Vec2::new(20.0, 5.0))]);
        let actions = r.send(InputEvent::pointer_up(30.0, 15.0), PointerTarget::Canvas);
        assert_eq!(actions.to_vec(), vec![Action::ScheduleDeferred]);
        assert_eq!(*r.machine.state(), InteractionState::Idle);

        // The trailing click is swallowed until the deferred task runs.
        assert!(r.send(InputEvent::click(30.0, 15.0), PointerTarget::Canvas).is_empty());
        r.machine.run_deferred();
        assert_eq!(r.send(InputEvent::click(30.0, 15.0), PointerTarget::Canvas).len(), 2);
    }

    #[test]
    fn jitter_below_threshold_still_clicks() {
        let mut r = rig();
        r.send(InputEvent::pointer_down(10.0, 10.0, 0), PointerTarget::Canvas);
        r.send(InputEvent::pointer_move(11.0, 11.0), PointerTarget::Canvas);
        assert!(r.send(InputEvent::pointer_up(11.0, 11.0), PointerTarget::Canvas).is_empty());
        assert!(!r.machine.click_suppressed());
        assert_eq!(r.send(InputEvent::click(11.0, 11.0), PointerTarget::Canvas).len(), 2);
    }

    #[test]
    fn dragging_converts_screen_delta_to_content() {
        let mut r = rig();
        r.viewport.zoom_at(2.0, Point::ZERO);
        let a = r.a;
        r.send(InputEvent::pointer_down(200.0, 200.0, 0), PointerTarget::Node(a));
        let actions = r.send(InputEvent::pointer_move(220.0, 210.0), PointerTarget::Node(a));
        assert_eq!(
            actions.to_vec(),
            vec![Action::Mutate(GraphMutation::MoveNode {
                id: a,
                dx: 10.0,
                dy: 5.0
            })]
        );
        r.send(InputEvent::pointer_up(220.0, 210.0), PointerTarget::Node(a));
        // No selection from the click that ends a drag.
        assert!(r.send(InputEvent::click(220.0, 210.0), PointerTarget::Node(a)).is_empty());
    }

    #[test]
    fn small_node_drag_moves_and_then_selects() {
        let mut r = rig();
        let a = r.a;
        r.send(InputEvent::pointer_down(100.0, 100.0, 0), PointerTarget::Node(a));
        let actions = r.send(InputEvent::pointer_move(101.0, 101.0), PointerTarget::Node(a));
        assert_eq!(
            actions.to_vec(),
            vec![Action::Mutate(GraphMutation::MoveNode {
                id: a,
                dx: 1.0,
                dy: 1.0
            })]
        );
        assert!(r.send(InputEvent::pointer_up(101.0, 101.0), PointerTarget::Node(a)).is_empty());
        assert!(!r.machine.click_suppressed());
        assert_eq!(
            r.send(InputEvent::click(101.0, 101.0), PointerTarget::Node(a)).to_vec(),
            vec![Action::Select(Selection::Node(a))]
        );
        assert_eq!(*r.machine.state(), InteractionState::Idle);
    }

    #[test]
    fn add_edge_scenario() {
        let mut r = rig();
        let (a, b) = (r.a, r.b);
        let actions = r.send(InputEvent::context_menu(100.0, 100.0), PointerTarget::Node(a));
        assert_eq!(actions.to_vec(), vec![Action::Select(Selection::Node(a))]);
        assert_eq!(r.machine.pending_edge(), Some((a, Point::new(100.0, 100.0))));

        r.send(InputEvent::pointer_move(200.0, 150.0), PointerTarget::Canvas);
        assert_eq!(r.machine.pending_edge(), Some((a, Point::new(200.0, 150.0))));

        let actions = r.send(InputEvent::click(300.0, 100.0), PointerTarget::Node(b));
        assert_eq!(
            actions.to_vec(),
            vec![Action::Mutate(GraphMutation::AddEdge { from: a, to: b })]
        );
        assert_eq!(*r.machine.state(), InteractionState::Idle);
    }

    #[test]
    fn adding_edge_ignores_presses_and_cancels_on_canvas() {
        let mut r = rig();
        let a = r.a;
        r.send(InputEvent::context_menu(100.0, 100.0), PointerTarget::Node(a));
        assert!(r.send(InputEvent::pointer_down(5.0, 5.0, 0), PointerTarget::Canvas).is_empty());
        assert!(r.send(InputEvent::pointer_up(5.0, 5.0), PointerTarget::Canvas).is_empty());
        let actions = r.send(InputEvent::click(5.0, 5.0), PointerTarget::Canvas);
        assert_eq!(actions.to_vec(), vec![Action::Redraw]);
        assert_eq!(r.machine.pending_edge(), None);
    }

    #[test]
    fn clicking_the_source_makes_a_self_loop() {
        let mut r = rig();
        let a = r.a;
        r.send(InputEvent::context_menu(100.0, 100.0), PointerTarget::Node(a));
        let actions = r.send(InputEvent::click(100.0, 100.0), PointerTarget::Node(a));
        assert_eq!(
            actions.to_vec(),
            vec![Action::Mutate(GraphMutation::AddEdge { from: a, to: a })]
        );
    }

    #[test]
    fn secondary_button_does_not_pan() {
        let mut r = rig();
        r.send(InputEvent::pointer_down(10.0, 10.0, 2), PointerTarget::Canvas);
        assert_eq!(*r.machine.state(), InteractionState::Idle);
    }

    #[test]
    fn disabled_ignores_everything_and_resets() {
        let mut r = rig();
        let a = r.a;
        r.send(InputEvent::pointer_down(100.0, 100.0, 0), PointerTarget::Node(a));
        r.machine.set_disabled(true);
        assert_eq!(*r.machine.state(), InteractionState::Idle);
        assert!(r.send(InputEvent::click(5.0, 5.0), PointerTarget::Canvas).is_empty());
        assert!(r.send(InputEvent::context_menu(100.0, 100.0), PointerTarget::Node(a)).is_empty());
        assert!(r.send(InputEvent::pointer_down(5.0, 5.0, 0), PointerTarget::Canvas).is_empty());
        assert_eq!(*r.machine.state(), InteractionState::Idle);
    }

    #[test]
    fn edge_click_selects_edge() {
        let mut r = rig();
        let e = r.model.add_edge(r.a, r.b).id;
        let actions = r.send(InputEvent::click(200.0, 100.0), PointerTarget::Edge(e));
        assert_eq!(actions.to_vec(), vec![Action::Select(Selection::Edge(e))]);
    }
}
