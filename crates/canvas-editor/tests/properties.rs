//! Integration tests: invariants that must hold across arbitrary edit
//! sequences (canvas-editor).

use canvas_core::kurbo::{Point, Size, Vec2};
use canvas_core::schema::{FaultConfig, FilterConfig, FilterKind, Severity};
use canvas_core::{
    Category, Edge, EdgeId, EdgePatch, GraphDocument, GraphModel, MAX_ZOOM, MIN_ZOOM, Node,
    NodeConfig, NodeId, NodePatch, NodeStatus, PortSide, RelationType, SubType, Viewport,
};
use canvas_editor::{
    ConnectionState, Effect, GraphEditorSession, InputEvent, MenuAction, Modifiers, PointerButton,
};
use pretty_assertions::assert_eq;

fn session() -> GraphEditorSession {
    let _ = env_logger::builder().is_test(true).try_init();
    GraphEditorSession::default()
}

fn screen(s: &GraphEditorSession, canvas: Point) -> Point {
    s.viewport().canvas_to_screen(s.surface(), canvas)
}

fn port(s: &GraphEditorSession, id: NodeId, side: PortSide) -> Point {
    screen(s, s.model().node(id).unwrap().port(side))
}

fn body(s: &GraphEditorSession, id: NodeId) -> Point {
    screen(s, s.model().node(id).unwrap().center())
}

fn click(s: &mut GraphEditorSession, at: Point) -> Vec<Effect> {
    s.handle(InputEvent::click(at.x, at.y))
}

fn connect(s: &mut GraphEditorSession, from: NodeId, to: NodeId, relation: RelationType) {
    let out = port(s, from, PortSide::Output);
    click(s, out);
    s.handle(InputEvent::PickRelation { relation });
    let inp = port(s, to, PortSide::Input);
    click(s, inp);
}

fn assert_closed(model: &GraphModel) {
    for edge in model.edges() {
        assert!(
            model.contains_node(edge.source_node_id) && model.contains_node(edge.target_node_id),
            "edge {:?} dangles",
            edge.id
        );
    }
}

/// Five knowledge-graph nodes laid out on a grid, no edges.
fn grid_session() -> (GraphEditorSession, Vec<NodeId>) {
    let mut s = session();
    let ids = [
        (Category::Equipment, SubType::Conveyor),
        (Category::Component, SubType::Motor),
        (Category::Fault, SubType::ElectricalFault),
        (Category::Symptom, SubType::Temperature),
        (Category::Solution, SubType::Replacement),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (cat, st))| {
        let x = 40.0 + 260.0 * (i % 3) as f64;
        let y = 40.0 + 160.0 * (i / 3) as f64;
        s.drop_palette_item(cat, st, st.id_prefix().as_str(), Point::new(x, y))
            .unwrap()
    })
    .collect();
    s.take_effects();
    (s, ids)
}

// ─── Closure ────────────────────────────────────────────────────────────

#[test]
fn edges_never_dangle() {
    let (mut s, n) = grid_session();
    connect(&mut s, n[0], n[1], RelationType::HasPart);
    connect(&mut s, n[1], n[2], RelationType::Causes);
    connect(&mut s, n[2], n[3], RelationType::HasSymptom);
    connect(&mut s, n[2], n[4], RelationType::ResolvedBy);
    connect(&mut s, n[0], n[2], RelationType::RelatedTo);
    assert_eq!(s.model().edge_count(), 5);
    assert_closed(s.model());

    // Keyboard delete of a hub node.
    let at = body(&s, n[2]);
    click(&mut s, at);
    s.handle(InputEvent::PointerUp { x: at.x, y: at.y });
    s.handle(InputEvent::key("Delete"));
    assert_closed(s.model());
    assert_eq!(s.model().edge_count(), 1);

    // Context-menu delete.
    let at = body(&s, n[1]);
    s.handle(InputEvent::pointer_down(at.x, at.y, PointerButton::Secondary, Modifiers::NONE));
    s.handle(InputEvent::MenuAction {
        action: MenuAction::Delete,
    });
    assert_closed(s.model());
    assert_eq!(s.model().edge_count(), 0);

    // External removal, then operations on the stale ids.
    assert!(s.remove_node(n[0]));
    assert!(!s.remove_node(n[2]));
    assert!(!s.update_node(n[1], NodePatch::default()));
    assert_closed(s.model());
    assert_eq!(s.model().node_count(), 2);
}

#[test]
fn removing_source_mid_gesture_cancels_draft() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    s.handle(InputEvent::PickRelation {
        relation: RelationType::Causes,
    });
    assert!(s.connection().draft().is_some());

    s.remove_node(n[0]);
    assert!(s.connection().is_idle());

    let inp = port(&s, n[1], PortSide::Input);
    click(&mut s, inp);
    assert_eq!(s.model().edge_count(), 0);
    assert_closed(s.model());
}

// ─── Round trip ─────────────────────────────────────────────────────────

fn rich_document() -> GraphDocument {
    let mut wear = Node::new(
        NodeId::intern("wear"),
        SubType::MechanicalFault,
        "Gear wear",
        Point::new(320.5, -40.25),
    );
    wear.status = NodeStatus::PendingConfirm;
    wear.hit_count = 17;
    wear.config = NodeConfig::Fault(FaultConfig {
        fault_code: "MF-204".into(),
        severity: Severity::High,
    });
    let crane = Node::new(NodeId::intern("crane"), SubType::Crane, "STS crane 3", Point::ZERO);
    let mut lp = Node::new(NodeId::intern("lp"), SubType::Filter, "Low pass", Point::new(0.0, 400.0));
    lp.config = NodeConfig::Filter(FilterConfig {
        kind: FilterKind::BandPass,
        cutoff_hz: Some(12.5),
    });
    lp.status = NodeStatus::Deprecated;

    let mut causes = Edge::new(
        EdgeId::intern("c1"),
        crane.id,
        wear.id,
        RelationType::Causes,
    );
    causes.weight = 7.25;
    causes.hit_count = 3;
    let mut related = Edge::new(EdgeId::intern("r1"), wear.id, crane.id, RelationType::RelatedTo);
    related.label = None;

    GraphDocument {
        nodes: vec![crane, wear, lp],
        edges: vec![causes, related],
        viewport: Some(Viewport {
            zoom: 0.75,
            pan_x: 120.0,
            pan_y: -35.5,
        }),
    }
}

#[test]
fn serialize_load_serialize_is_stable() {
    let mut s = session();
    s.load(rich_document());
    let first = s.serialize();

    let mut again = session();
    again.load(first.clone());
    let second = again.serialize();
    assert_eq!(second, first);
    assert_eq!(second.to_json().unwrap(), first.to_json().unwrap());

    // Through JSON as well.
    let mut from_json = session();
    from_json.load(GraphDocument::from_json(&first.to_json().unwrap()).unwrap());
    assert_eq!(from_json.serialize(), first);
}

#[test]
fn round_trip_after_interactive_edits() {
    let (mut s, n) = grid_session();
    connect(&mut s, n[0], n[1], RelationType::HasPart);
    let edge = s.model().edges().next().unwrap().id;
    s.update_edge(
        edge,
        EdgePatch {
            weight: Some(4.0),
            label: Some("drives".into()),
            ..Default::default()
        },
    );
    let first = s.serialize();

    let mut again = session();
    again.load(first.clone());
    assert_eq!(again.serialize(), first);
}

// ─── Zoom clamp ─────────────────────────────────────────────────────────

#[test]
fn zoom_stays_in_range_for_any_input() {
    let mut s = session();
    let inputs = [
        10.0,
        -5.0,
        0.0,
        -0.0,
        1.0,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        0.15,
        2.5,
        2.5000001,
        0.1499999,
        1e-300,
        -1e300,
    ];
    for z in inputs {
        s.set_zoom(z);
        let zoom = s.viewport().zoom;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom), "setZoom({z}) gave {zoom}");
    }
    for delta_y in [-1.0, 1.0, -1.0, f64::NAN, 100.0] {
        s.handle(InputEvent::Wheel {
            x: 10.0,
            y: 10.0,
            delta_y,
        });
        let zoom = s.viewport().zoom;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
    }
}

// ─── Group drag invariance ──────────────────────────────────────────────

#[test]
fn group_drag_preserves_relative_offsets_under_zoom_and_pan() {
    let (mut s, n) = grid_session();
    s.set_surface(Point::new(16.0, 64.0), Size::new(1200.0, 800.0));
    s.set_zoom(2.0);
    s.set_pan(30.0, -10.0);

    for k in 2..=n.len() {
        let members = &n[..k];
        s.handle(InputEvent::Key {
            key: "Escape".into(),
            modifiers: Modifiers::NONE,
        });
        let empty = screen(&s, Point::new(-1000.0, -1000.0));
        click(&mut s, empty);
        s.handle(InputEvent::PointerUp { x: empty.x, y: empty.y });
        for id in members {
            let at = body(&s, *id);
            s.handle(InputEvent::pointer_down(
                at.x,
                at.y,
                PointerButton::Primary,
                Modifiers::CTRL,
            ));
            s.handle(InputEvent::PointerUp { x: at.x, y: at.y });
        }
        assert_eq!(s.selection().multi(), members);

        let before: Vec<Point> = n.iter().map(|id| s.model().node(*id).unwrap().position).collect();
        let grab = body(&s, members[k - 1]);
        click(&mut s, grab);
        // 2× zoom: 40 × -30 screen pixels is 20 × -15 canvas units.
        s.handle(InputEvent::PointerMove {
            x: grab.x + 40.0,
            y: grab.y - 30.0,
        });
        s.handle(InputEvent::PointerLeave);

        for (i, id) in n.iter().enumerate() {
            let moved = s.model().node(*id).unwrap().position - before[i];
            let expected = if i < k { Vec2::new(20.0, -15.0) } else { Vec2::ZERO };
            assert_eq!(moved, expected, "k={k}, node {i}");
        }
    }
}

// ─── Connection FSM ─────────────────────────────────────────────────────

#[test]
fn full_gesture_yields_exactly_one_edge() {
    let (mut s, n) = grid_session();
    connect(&mut s, n[2], n[3], RelationType::HasSymptom);
    let edges: Vec<&Edge> = s.model().edges().collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(
        (edges[0].source_node_id, edges[0].target_node_id, edges[0].relation_type),
        (n[2], n[3], RelationType::HasSymptom)
    );
    assert_eq!(*s.connection().state(), ConnectionState::Idle);
}

#[test]
fn escape_while_drawing_creates_nothing() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    s.handle(InputEvent::PickRelation {
        relation: RelationType::Causes,
    });
    s.handle(InputEvent::PointerMove { x: 500.0, y: 500.0 });
    assert!(s.scene().rubber_band.is_some());

    s.handle(InputEvent::key("Escape"));
    assert!(s.connection().is_idle());
    assert!(s.connection().draft().is_none());
    assert!(s.scene().rubber_band.is_none());

    let inp = port(&s, n[1], PortSide::Input);
    click(&mut s, inp);
    assert_eq!(s.model().edge_count(), 0);
}

#[test]
fn dismissing_picker_cancels() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    assert!(s.scene().relation_picker.is_some());
    let fx = s.handle(InputEvent::DismissPicker);
    assert!(fx.contains(&Effect::CloseRelationPicker));
    assert!(s.connection().is_idle());
    assert!(s.scene().relation_picker.is_none());
}

#[test]
fn input_port_click_while_idle_is_a_no_op() {
    let (mut s, n) = grid_session();
    let inp = port(&s, n[1], PortSide::Input);
    let fx = click(&mut s, inp);
    assert!(fx.is_empty(), "unexpected effects {fx:?}");
    assert_eq!(s.model().edge_count(), 0);
    assert!(!s.is_dragging());
}

#[test]
fn self_loop_is_refused() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    s.handle(InputEvent::PickRelation {
        relation: RelationType::RelatedTo,
    });
    let own = port(&s, n[0], PortSide::Input);
    click(&mut s, own);
    assert_eq!(s.model().edge_count(), 0);
    assert!(s.connection().draft().is_some(), "draft survives the refusal");

    let other = port(&s, n[1], PortSide::Input);
    click(&mut s, other);
    assert_eq!(s.model().edge_count(), 1);
}

#[test]
fn pipeline_relation_not_offered_in_knowledge_graph() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    s.handle(InputEvent::PickRelation {
        relation: RelationType::FeedsInto,
    });
    assert!(s.connection().draft().is_none());
    assert!(s.connection().picker().is_some(), "picker stays open");
}

#[test]
fn connection_source_highlight_yields_to_focus() {
    let (mut s, n) = grid_session();
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    let scene = s.scene();
    assert_eq!(
        scene.nodes[0].highlight,
        canvas_render::Highlight::ConnectionSource
    );

    // Focusing the source node outranks the connection highlight.
    let at = body(&s, n[0]);
    click(&mut s, at);
    s.handle(InputEvent::PointerUp { x: at.x, y: at.y });
    assert_eq!(s.scene().nodes[0].highlight, canvas_render::Highlight::Selected);
}

// ─── Id lifetime ────────────────────────────────────────────────────────

/// Counter value embedded in a generated id such as `crane_41`.
fn counter_of(id: &str) -> u64 {
    id.rsplit('_').next().unwrap().parse().unwrap()
}

#[test]
fn generated_ids_skip_loaded_then_deleted_ids() {
    let mut s = session();
    let prefix = SubType::Crane.id_prefix();
    let last = counter_of(NodeId::with_prefix(&prefix).as_str());
    let upcoming = last + 1..=last + 200;

    let left = Node::new(NodeId::intern("left_crane"), SubType::Crane, "L", Point::new(0.0, 0.0));
    let right = Node::new(NodeId::intern("right_crane"), SubType::Crane, "R", Point::new(400.0, 0.0));
    let (l, r) = (left.id, right.id);
    let mut nodes = vec![left, right];
    nodes.extend(upcoming.clone().map(|k| {
        Node::new(
            NodeId::intern(&format!("{prefix}_{k}")),
            SubType::Crane,
            "saved crane",
            Point::new(0.0, 400.0),
        )
    }));
    let edges = upcoming
        .clone()
        .map(|k| Edge::new(EdgeId::intern(&format!("edge_{k}")), l, r, RelationType::RelatedTo))
        .collect();
    s.load(GraphDocument {
        nodes,
        edges,
        viewport: Some(Viewport::default()),
    });

    let retired_nodes: Vec<NodeId> = s
        .model()
        .nodes()
        .map(|n| n.id)
        .filter(|id| *id != l && *id != r)
        .collect();
    let retired_edges: Vec<EdgeId> = s.model().edges().map(|e| e.id).collect();
    assert_eq!((retired_nodes.len(), retired_edges.len()), (200, 200));
    for id in &retired_nodes {
        assert!(s.remove_node(*id));
    }
    for id in &retired_edges {
        assert!(s.remove_edge(*id));
    }

    let fresh = s
        .drop_palette_item(Category::Equipment, SubType::Crane, "new", Point::new(0.0, 700.0))
        .unwrap();
    assert!(!retired_nodes.contains(&fresh), "{fresh:?} was reissued");

    connect(&mut s, l, r, RelationType::RelatedTo);
    let edges: Vec<EdgeId> = s.model().edges().map(|e| e.id).collect();
    assert_eq!(edges.len(), 1);
    assert!(!retired_edges.contains(&edges[0]), "{:?} was reissued", edges[0]);
}

#[test]
fn generated_ids_survive_clear() {
    let (mut s, n) = grid_session();
    s.clear();
    assert!(s.model().is_empty());
    let again = s
        .drop_palette_item(Category::Equipment, SubType::Conveyor, "again", Point::ZERO)
        .unwrap();
    assert!(!n.contains(&again));
}

// ─── Lifecycle: load and clear reset interaction ────────────────────────

/// Multi-select of `n[1..3]`, a drawing connection from `n[0]`, and a drag
/// of the focused `n[1]`, all live at once.
fn busy_session() -> (GraphEditorSession, Vec<NodeId>) {
    let (mut s, n) = grid_session();
    for id in &n[1..3] {
        let at = body(&s, *id);
        s.handle(InputEvent::pointer_down(at.x, at.y, PointerButton::Primary, Modifiers::CTRL));
        s.handle(InputEvent::PointerUp { x: at.x, y: at.y });
    }
    let out = port(&s, n[0], PortSide::Output);
    click(&mut s, out);
    s.handle(InputEvent::PickRelation {
        relation: RelationType::Causes,
    });
    let grab = body(&s, n[1]);
    click(&mut s, grab);

    assert_eq!(s.selection().multi(), &n[1..3]);
    assert_eq!(s.selection().focused_node(), Some(n[1]));
    assert!(s.is_dragging());
    assert!(s.connection().draft().is_some());
    (s, n)
}

fn assert_interaction_reset(s: &GraphEditorSession) {
    assert_eq!(s.selection().focused_node(), None);
    assert_eq!(s.selection().focused_edge(), None);
    assert!(s.selection().multi().is_empty());
    assert!(s.connection().is_idle());
    assert!(s.connection().draft().is_none());
    assert!(!s.is_dragging());
    assert!(!s.is_panning());
    assert!(s.scene().rubber_band.is_none());
}

#[test]
fn clear_resets_selection_drag_and_draft() {
    let (mut s, n) = busy_session();
    s.clear();
    assert!(s.model().is_empty());
    assert_interaction_reset(&s);

    // A stale drag must not move anything dropped afterwards.
    let id = s
        .drop_palette_item(Category::Equipment, SubType::Crane, "c", Point::new(50.0, 50.0))
        .unwrap();
    s.handle(InputEvent::PointerMove { x: 300.0, y: 300.0 });
    assert_eq!(s.model().node(id).unwrap().position, Point::new(50.0, 50.0));
    assert!(!n.contains(&id));
}

#[test]
fn load_resets_selection_drag_and_draft() {
    let (mut s, n) = busy_session();
    let doc = s.serialize();
    s.load(doc);
    assert_eq!(s.model().node_count(), n.len());
    assert_interaction_reset(&s);

    let before = s.model().node(n[1]).unwrap().position;
    s.handle(InputEvent::PointerMove { x: 900.0, y: 900.0 });
    assert_eq!(s.model().node(n[1]).unwrap().position, before);
    let inp = port(&s, n[3], PortSide::Input);
    click(&mut s, inp);
    assert_eq!(s.model().edge_count(), 0);
}

fn open_picker(s: &mut GraphEditorSession, from: NodeId) {
    let out = port(s, from, PortSide::Output);
    let fx = click(s, out);
    assert!(fx.iter().any(|e| matches!(e, Effect::OpenRelationPicker { .. })));
}

#[test]
fn removing_picker_source_closes_picker() {
    let (mut s, n) = grid_session();
    open_picker(&mut s, n[0]);
    assert!(s.remove_node(n[0]));
    let fx = s.take_effects();
    assert!(fx.contains(&Effect::CloseRelationPicker), "{fx:?}");
    assert!(s.connection().is_idle());
    assert!(s.scene().relation_picker.is_none());
}

#[test]
fn load_and_clear_close_an_open_picker() {
    let (mut s, n) = grid_session();
    open_picker(&mut s, n[0]);
    let doc = s.serialize();
    s.load(doc);
    assert!(s.take_effects().contains(&Effect::CloseRelationPicker));
    assert_interaction_reset(&s);

    open_picker(&mut s, n[0]);
    s.clear();
    assert!(s.take_effects().contains(&Effect::CloseRelationPicker));
    assert_interaction_reset(&s);

    // Nothing to close the second time round.
    s.clear();
    assert!(!s.take_effects().contains(&Effect::CloseRelationPicker));
}

// ─── Auto-fit ───────────────────────────────────────────────────────────

#[test]
fn loaded_viewport_cancels_pending_fit() {
    let (s, _) = grid_session();
    let doc = GraphDocument {
        viewport: None,
        ..s.serialize()
    };
    let mut fresh = session();
    fresh.load(doc.clone());
    assert!(fresh.needs_frame());

    let saved = Viewport {
        zoom: 1.5,
        pan_x: 10.0,
        pan_y: 20.0,
    };
    fresh.load(GraphDocument {
        viewport: Some(saved),
        ..doc
    });
    assert!(!fresh.needs_frame());
    let fx = fresh.handle(InputEvent::Frame);
    assert!(!fx.contains(&Effect::RequestFrame));
    assert_eq!(fresh.viewport(), &saved);
}

#[test]
fn clear_cancels_pending_fit() {
    let (s, _) = grid_session();
    let doc = GraphDocument {
        viewport: None,
        ..s.serialize()
    };
    let mut fresh = session();
    fresh.load(doc);
    assert!(fresh.needs_frame());
    fresh.clear();
    assert!(!fresh.needs_frame());
    fresh.handle(InputEvent::Frame);
    assert_eq!(fresh.viewport(), &Viewport::default());
}
