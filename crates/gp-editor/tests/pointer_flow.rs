//! Integration tests: pointer events → controller → model, viewport and
//! display list (gp-editor ↔ gp-render ↔ gp-core).
//!
//! Events are fed exactly as a browser fires them: press, moves, release,
//! then the trailing click.

use gp_core::{NodeId, Selection};
use gp_editor::{CanvasController, GraphMutation, InputEvent, InteractionState, ShortcutMap};
use kurbo::Point;
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Controller with A at (100,100) and B at (300,100), identity viewport.
fn two_nodes() -> (CanvasController, NodeId, NodeId) {
    init_logger();
    let mut c = CanvasController::default();
    c.mutate(GraphMutation::AddNode {
        at: Point::new(100.0, 100.0),
    });
    c.mutate(GraphMutation::AddNode {
        at: Point::new(300.0, 100.0),
    });
    let a = c.model().nodes()[0].id;
    let b = c.model().nodes()[1].id;
    (c, a, b)
}

fn tap(c: &mut CanvasController, x: f64, y: f64) {
    c.handle_input(&InputEvent::pointer_down(x, y, 0));
    c.handle_input(&InputEvent::pointer_up(x, y));
    c.handle_input(&InputEvent::click(x, y));
}

// ─── Add-edge mode ───────────────────────────────────────────────────────

#[test]
fn context_menu_then_click_creates_an_edge() {
    let (mut c, a, b) = two_nodes();

    let update = c.handle_input(&InputEvent::context_menu(100.0, 100.0));
    assert!(update.selection);
    assert_eq!(c.selection(), Selection::Node(a));
    assert!(matches!(c.state(), InteractionState::AddingEdge { from, .. } if *from == a));

    c.handle_input(&InputEvent::pointer_move(220.0, 140.0));
    let preview = c.display_list().preview.expect("preview while adding an edge");
    assert_eq!(preview.end, Point::new(220.0, 140.0));

    let update = c.handle_input(&InputEvent::click(300.0, 100.0));
    assert!(update.graph);
    assert_eq!(*c.state(), InteractionState::Idle);
    let edge = &c.model().edges()[0];
    assert_eq!((edge.from, edge.to), (a, b));
    assert!(!edge.directed);
    assert_eq!(edge.weight, Some(1.0));
    assert_eq!(c.display_list().preview, None);
    assert_eq!(c.display_list().edges[0].label.as_ref().unwrap().text, "1");
}

#[test]
fn clicking_empty_canvas_cancels_edge_creation() {
    let (mut c, _, _) = two_nodes();
    c.handle_input(&InputEvent::context_menu(100.0, 100.0));
    c.handle_input(&InputEvent::click(600.0, 500.0));
    assert_eq!(*c.state(), InteractionState::Idle);
    assert!(c.model().edges().is_empty());
    // Cancelling does not add a node either.
    assert_eq!(c.model().nodes().len(), 2);
}

#[test]
fn escape_cancels_edge_creation() {
    let (mut c, _, _) = two_nodes();
    c.handle_input(&InputEvent::context_menu(100.0, 100.0));
    let action = ShortcutMap::resolve("Escape", false, false, false, false).unwrap();
    let update = c.run_shortcut(action, Point::new(400.0, 300.0));
    assert!(update.overlay);
    assert_eq!(c.display_list().preview, None);
}

// ─── Selection & delete ──────────────────────────────────────────────────

#[test]
fn click_edge_then_delete_removes_only_the_edge() {
    let (mut c, a, b) = two_nodes();
    c.mutate(GraphMutation::AddEdge { from: a, to: b });
    let e = c.model().edges()[0].id;

    tap(&mut c, 200.0, 105.0);
    assert_eq!(c.selection(), Selection::Edge(e));
    assert!(c.display_list().edge(e).unwrap().selected);

    let action = ShortcutMap::resolve("Delete", false, false, false, false).unwrap();
    let update = c.run_shortcut(action, Point::ZERO);
    assert!(update.graph && update.selection);
    assert!(c.model().edges().is_empty());
    assert_eq!(c.model().nodes().len(), 2);
}

#[test]
fn deleting_a_node_cascades_to_its_edges() {
    let (mut c, a, b) = two_nodes();
    c.mutate(GraphMutation::AddEdge { from: a, to: b });
    c.mutate(GraphMutation::AddEdge { from: b, to: b });
    tap(&mut c, 300.0, 100.0);
    assert_eq!(c.selection(), Selection::Node(b));
    c.delete_selected();
    assert!(c.model().edges().is_empty());
    assert_eq!(c.model().nodes().iter().map(|n| n.id).collect::<Vec<_>>(), vec![a]);
}

#[test]
fn deleting_the_edge_source_ends_edge_creation() {
    let (mut c, a, _) = two_nodes();
    c.handle_input(&InputEvent::context_menu(100.0, 100.0));
    c.delete_selected();
    assert!(!c.model().contains_node(a));
    assert_eq!(*c.state(), InteractionState::Idle);
    assert_eq!(c.display_list().preview, None);
}

// ─── Click vs drag ───────────────────────────────────────────────────────

#[test]
fn clicking_empty_canvas_adds_a_node_and_clears_selection() {
    let (mut c, a, _) = two_nodes();
    c.select(Selection::Node(a));
    tap(&mut c, 500.0, 400.0);
    assert_eq!(c.model().nodes().len(), 3);
    let added = &c.model().nodes()[2];
    assert_eq!(added.center(), Point::new(500.0, 400.0));
    assert_eq!(added.label, "3");
    assert_eq!(c.selection(), Selection::None);
}

#[test]
fn panning_suppresses_the_trailing_click_until_deferred_runs() {
    let (mut c, _, _) = two_nodes();
    c.handle_input(&InputEvent::pointer_down(500.0, 400.0, 0));
    c.handle_input(&InputEvent::pointer_move(520.0, 400.0));
    c.handle_input(&InputEvent::pointer_move(540.0, 400.0));
    let update = c.handle_input(&InputEvent::pointer_up(540.0, 400.0));
    assert!(update.schedule_deferred);
    assert_eq!(c.viewport().state().offset_x, 40.0);

    c.handle_input(&InputEvent::click(540.0, 400.0));
    assert_eq!(c.model().nodes().len(), 2);

    c.run_deferred();
    tap(&mut c, 540.0, 400.0);
    assert_eq!(c.model().nodes().len(), 3);
    assert_eq!(c.model().nodes()[2].center(), Point::new(500.0, 400.0));
}

#[test]
fn dragging_a_node_moves_it_without_selecting() {
    let (mut c, a, _) = two_nodes();
    c.handle_input(&InputEvent::pointer_down(100.0, 100.0, 0));
    assert!(matches!(c.state(), InteractionState::DraggingNode { node, .. } if *node == a));
    c.handle_input(&InputEvent::pointer_move(130.0, 110.0));
    c.handle_input(&InputEvent::pointer_move(150.0, 120.0));
    c.handle_input(&InputEvent::pointer_up(150.0, 120.0));
    c.handle_input(&InputEvent::click(150.0, 120.0));

    assert_eq!(c.model().node(a).unwrap().center(), Point::new(150.0, 120.0));
    assert_eq!(c.selection(), Selection::None);
    assert_eq!(c.display_list().node(a).unwrap().center, Point::new(150.0, 120.0));
}

// ─── Zoom & disabled ─────────────────────────────────────────────────────

#[test]
fn wheel_zooms_around_the_pointer() {
    let (mut c, _, _) = two_nodes();
    let anchor = Point::new(300.0, 100.0);
    let update = c.handle_input(&InputEvent::wheel(anchor.x, anchor.y, -100.0));
    assert!(update.viewport);
    assert!((c.viewport().scale() - 1.1).abs() < 1e-9);
    let back = c.viewport().to_content(anchor);
    assert!((back - anchor).hypot() < 1e-9);
    assert_eq!(c.display_list().viewport.scale, c.viewport().scale());
}

#[test]
fn disabled_canvas_ignores_pointer_input() {
    let (mut c, a, _) = two_nodes();
    c.select(Selection::Node(a));
    c.set_disabled(true);

    tap(&mut c, 500.0, 400.0);
    c.handle_input(&InputEvent::context_menu(100.0, 100.0));
    c.handle_input(&InputEvent::pointer_down(100.0, 100.0, 0));
    c.handle_input(&InputEvent::pointer_move(200.0, 200.0));
    let wheel = c.handle_input(&InputEvent::wheel(0.0, 0.0, -1.0));

    assert!(!wheel.needs_redraw());
    assert_eq!(c.model().nodes().len(), 2);
    assert_eq!(c.model().node(a).unwrap().center(), Point::new(100.0, 100.0));
    assert_eq!(*c.state(), InteractionState::Idle);
    assert_eq!(c.viewport().scale(), 1.0);

    // Keyboard delete is blocked too.
    c.delete_selected();
    assert_eq!(c.model().nodes().len(), 2);

    // Explicit zoom controls still work.
    assert!(c.zoom_in(Point::new(400.0, 300.0)).viewport);

    c.set_disabled(false);
    tap(&mut c, 500.0, 400.0);
    assert_eq!(c.model().nodes().len(), 3);
}
