//! Pure projection from (model, viewport, interaction state) to a flat,
//! paint-ready scene.
//!
//! Nothing here mutates; the same inputs always produce the same `Scene`.
//! Geometry is in canvas space except the overlay anchors (menu, picker),
//! which are screen-space so the host can place DOM popovers directly.

use crate::path::{edge_geometry, edge_curve, label_anchor};
use crate::theme::CanvasTheme;
use canvas_core::kurbo::{CubicBez, Point, Rect};
use canvas_core::{
    DEFAULT_WEIGHT, Edge, EdgeId, EditorConfig, GraphModel, Node, NodeId, NodeStatus, PortSide,
    RelationType, Viewport,
};
use serde::Serialize;
use smallvec::SmallVec;

/// Node emphasis. Declaration order is precedence: a later variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Default,
    MultiSelected,
    ConnectionSource,
    Selected,
}

/// One entry of an open context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    /// Stable action name the host sends back (`"edit"`, `"delete"`).
    pub action: &'static str,
    pub label: &'static str,
    pub enabled: bool,
}

/// An open context menu, anchored in screen space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuView {
    pub anchor: Point,
    pub items: SmallVec<[MenuItemView; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOption {
    pub relation: RelationType,
    pub label: &'static str,
}

/// The relation picker shown while a connection waits for its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerView {
    pub anchor: Point,
    pub source: NodeId,
    pub options: Vec<RelationOption>,
}

/// Borrowed interaction state the scene is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionView<'a> {
    pub selected_node: Option<NodeId>,
    pub selected_edge: Option<EdgeId>,
    pub multi_select: &'a [NodeId],
    /// Source node of an in-progress connection, if any.
    pub connection_source: Option<NodeId>,
    /// Canvas-space pointer while a connection is being drawn.
    pub rubber_band_to: Option<Point>,
    /// Picker source and its screen-space anchor.
    pub picker: Option<(NodeId, Point)>,
    pub menu: Option<&'a MenuView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVisual {
    pub id: NodeId,
    pub label: String,
    /// Subtype display name, drawn under the label.
    pub caption: &'static str,
    pub rect: Rect,
    pub fill: &'static str,
    pub accent: &'static str,
    pub stroke: &'static str,
    pub text: &'static str,
    pub highlight: Highlight,
    pub status: NodeStatus,
    pub opacity: f64,
    /// Pending-confirm nodes draw a dashed outline.
    pub dashed: bool,
    pub input_port: Point,
    pub output_port: Point,
    pub port_radius: f64,
    pub hit_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVisual {
    pub id: EdgeId,
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
    pub label: String,
    pub label_pos: Point,
    /// Only present when the weight differs from the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_label: Option<String>,
    pub selected: bool,
    pub stroke: &'static str,
}

/// Dashed draft curve from the connection source to the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubberBand {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
    pub stroke: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub viewport: Viewport,
    pub bg: &'static str,
    pub grid: &'static str,
    /// Bottom first.
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubber_band: Option<RubberBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_menu: Option<MenuView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_picker: Option<PickerView>,
}

/// Build the scene for one frame.
pub fn build_scene(
    model: &GraphModel,
    viewport: &Viewport,
    view: &InteractionView<'_>,
    config: &EditorConfig,
    theme: &CanvasTheme,
) -> Scene {
    let nodes = model
        .nodes()
        .map(|node| node_visual(node, view, config, theme))
        .collect();
    let edges = model
        .edges()
        .filter_map(|edge| edge_visual(model, edge, view, config, theme))
        .collect();
    let rubber_band = view
        .connection_source
        .and_then(|id| model.node(id))
        .zip(view.rubber_band_to)
        .map(|(source, pointer)| {
            let curve = edge_curve(source.port(PortSide::Output), pointer, config.control_ratio);
            RubberBand {
                from: curve.p0,
                ctrl1: curve.p1,
                ctrl2: curve.p2,
                to: curve.p3,
                stroke: theme.rubber_band,
            }
        });
    let relation_picker = view.picker.and_then(|(source, anchor)| {
        let node = model.node(source)?;
        let options = RelationType::offered_in(node.category.editor())
            .iter()
            .map(|relation| RelationOption {
                relation: *relation,
                label: relation.display_label(),
            })
            .collect();
        Some(PickerView {
            anchor,
            source,
            options,
        })
    });

    log::trace!(
        "scene: {} nodes, {} edges",
        model.node_count(),
        model.edge_count()
    );
    Scene {
        viewport: *viewport,
        bg: theme.bg,
        grid: theme.grid,
        nodes,
        edges,
        rubber_band,
        context_menu: view.menu.cloned(),
        relation_picker,
    }
}

/// Highest-precedence emphasis that applies to `id`.
pub fn highlight_for(id: NodeId, view: &InteractionView<'_>) -> Highlight {
    [
        (view.multi_select.contains(&id), Highlight::MultiSelected),
        (view.connection_source == Some(id), Highlight::ConnectionSource),
        (view.selected_node == Some(id), Highlight::Selected),
    ]
    .into_iter()
    .filter_map(|(applies, highlight)| applies.then_some(highlight))
    .max()
    .unwrap_or(Highlight::Default)
}

fn node_visual(
    node: &Node,
    view: &InteractionView<'_>,
    config: &EditorConfig,
    theme: &CanvasTheme,
) -> NodeVisual {
    let highlight = highlight_for(node.id, view);
    let stroke = match highlight {
        Highlight::Selected => theme.selected_stroke,
        Highlight::ConnectionSource => theme.connection_source_stroke,
        Highlight::MultiSelected => theme.multi_select_stroke,
        Highlight::Default => theme.node_stroke,
    };
    NodeVisual {
        id: node.id,
        label: node.label.clone(),
        caption: node.sub_type.spec().display_name,
        rect: node.rect(),
        fill: theme.node_fill,
        accent: theme.category_accent(node.category),
        stroke,
        text: theme.node_text,
        highlight,
        status: node.status,
        opacity: if node.status == NodeStatus::Deprecated { 0.5 } else { 1.0 },
        dashed: node.status == NodeStatus::PendingConfirm,
        input_port: node.port(PortSide::Input),
        output_port: node.port(PortSide::Output),
        port_radius: config.port_radius,
        hit_count: node.hit_count,
    }
}

fn edge_visual(
    model: &GraphModel,
    edge: &Edge,
    view: &InteractionView<'_>,
    config: &EditorConfig,
    theme: &CanvasTheme,
) -> Option<EdgeVisual> {
    let Some(curve) = edge_geometry(model, edge, config.control_ratio) else {
        log::debug!("skipping edge {:?}: endpoint missing", edge.id);
        return None;
    };
    let CubicBez { p0, p1, p2, p3 } = curve;
    let selected = view.selected_edge == Some(edge.id);
    Some(EdgeVisual {
        id: edge.id,
        from: p0,
        ctrl1: p1,
        ctrl2: p2,
        to: p3,
        label: edge.display_label().to_string(),
        label_pos: label_anchor(&curve, config.label_offset),
        weight_label: (edge.weight != DEFAULT_WEIGHT).then(|| format!("w={}", edge.weight)),
        selected,
        stroke: if selected {
            theme.edge_selected_stroke
        } else {
            theme.edge_stroke
        },
    })
}
