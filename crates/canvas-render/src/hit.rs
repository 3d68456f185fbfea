//! Hit testing: canvas point → port, node, edge, or empty space.
//!
//! Priority is fixed: ports first (they straddle node boundaries), then node
//! bodies, then edges. Within each class the topmost (last painted) entity
//! wins.

use crate::path::edge_geometry;
use canvas_core::kurbo::{ParamCurveExtrema, ParamCurveNearest, Point, Rect};
use canvas_core::{EdgeId, EditorConfig, GraphModel, NodeId, PortSide, Viewport};

/// Curve-distance tolerance for `ParamCurveNearest`, canvas units.
const NEAREST_ACCURACY: f64 = 1e-3;

/// What is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Port { node: NodeId, side: PortSide },
    Node(NodeId),
    Edge(EdgeId),
    Empty,
}

impl HitTarget {
    /// The node hit, through its body or one of its ports.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Port { node, .. } | Self::Node(node) => Some(*node),
            _ => None,
        }
    }
}

/// Resolve the target under `pt` (canvas space).
pub fn hit_test(
    model: &GraphModel,
    viewport: &Viewport,
    config: &EditorConfig,
    pt: Point,
) -> HitTarget {
    let target = if let Some((node, side)) = hit_port(model, config.port_radius, pt) {
        HitTarget::Port { node, side }
    } else if let Some(node) = hit_node(model, pt) {
        HitTarget::Node(node)
    } else if let Some(edge) = hit_edge(
        model,
        viewport.screen_dist_to_canvas(config.edge_tolerance_px),
        config.control_ratio,
        pt,
    ) {
        HitTarget::Edge(edge)
    } else {
        HitTarget::Empty
    };
    log::trace!("hit ({:.1}, {:.1}) -> {target:?}", pt.x, pt.y);
    target
}

/// Topmost port whose circle contains `pt`.
pub fn hit_port(model: &GraphModel, radius: f64, pt: Point) -> Option<(NodeId, PortSide)> {
    let r2 = radius * radius;
    model.nodes().rev().find_map(|node| {
        [PortSide::Output, PortSide::Input]
            .into_iter()
            .find(|side| (pt - node.port(*side)).hypot2() <= r2)
            .map(|side| (node.id, side))
    })
}

/// Topmost node whose footprint contains `pt` (edges inclusive).
pub fn hit_node(model: &GraphModel, pt: Point) -> Option<NodeId> {
    model
        .nodes()
        .rev()
        .find(|node| contains(&node.rect(), pt))
        .map(|node| node.id)
}

/// Topmost edge whose curve passes within `tolerance` of `pt`.
/// Edges with a missing endpoint are skipped.
pub fn hit_edge(model: &GraphModel, tolerance: f64, ratio: f64, pt: Point) -> Option<EdgeId> {
    let tol2 = tolerance * tolerance;
    model.edges().rev().find_map(|edge| {
        let curve = edge_geometry(model, edge, ratio)?;
        if !contains(&curve.bounding_box().inflate(tolerance, tolerance), pt) {
            return None;
        }
        (curve.nearest(pt, NEAREST_ACCURACY).distance_sq <= tol2).then_some(edge.id)
    })
}

fn contains(rect: &Rect, pt: Point) -> bool {
    pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}
