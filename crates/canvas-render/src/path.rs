//! Edge geometry shared by hit testing and the scene builder.

use canvas_core::kurbo::{CubicBez, ParamCurve, Point};
use canvas_core::{Edge, GraphModel, PortSide};

/// Cubic from an output port to an input port.
///
/// Control points sit `ratio × |Δx|` to the right of `from` and to the left
/// of `to`, so the curve always leaves rightwards and arrives from the left,
/// whatever the relative node positions.
pub fn edge_curve(from: Point, to: Point, ratio: f64) -> CubicBez {
    let offset = (to.x - from.x).abs() * ratio;
    CubicBez::new(
        from,
        Point::new(from.x + offset, from.y),
        Point::new(to.x - offset, to.y),
        to,
    )
}

/// The curve for `edge`, or `None` if either endpoint has left the model.
pub fn edge_geometry(model: &GraphModel, edge: &Edge, ratio: f64) -> Option<CubicBez> {
    let source = model.node(edge.source_node_id)?;
    let target = model.node(edge.target_node_id)?;
    Some(edge_curve(
        source.port(PortSide::Output),
        target.port(PortSide::Input),
        ratio,
    ))
}

/// Where an edge label goes: the curve midpoint, lifted by `lift`.
pub fn label_anchor(curve: &CubicBez, lift: f64) -> Point {
    let mid = curve.eval(0.5);
    Point::new(mid.x, mid.y - lift)
}
