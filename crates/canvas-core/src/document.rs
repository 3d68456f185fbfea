//! Plain-data boundary with persistence and collaboration.
//!
//! `GraphDocument` is what crosses the boundary in both directions: the
//! loader hands one to the editor, `serialize` hands one back. Loading is
//! forgiving. Entries that would break the model invariants are dropped and
//! counted in a [`LoadReport`] instead of failing the whole document.

use crate::error::DocumentError;
use crate::model::{Edge, GraphModel, Node};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

/// `{nodes, edges, viewport}` as plain data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Missing → keep the editor's current viewport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

impl GraphDocument {
    /// # Errors
    /// Returns [`DocumentError::Json`] for malformed JSON or wrongly typed fields.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Serialization of model types cannot fail in practice; the error is
    /// surfaced rather than unwrapped.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What `load` had to drop to keep the model consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub nodes_loaded: usize,
    pub edges_loaded: usize,
    /// Non-finite position, category mismatch, or duplicate id.
    pub nodes_dropped: usize,
    /// Dangling endpoint or duplicate id.
    pub edges_dropped: usize,
}

impl GraphModel {
    /// Build a model from a document, dropping invalid entries.
    pub fn from_document(nodes: Vec<Node>, edges: Vec<Edge>) -> (Self, LoadReport) {
        let mut model = GraphModel::new();
        let mut report = LoadReport::default();
        for node in nodes {
            let id = node.id;
            match model.add_node(node) {
                Ok(_) => report.nodes_loaded += 1,
                Err(err) => {
                    log::warn!("load: dropping node {id:?}: {err}");
                    report.nodes_dropped += 1;
                }
            }
        }
        for edge in edges {
            if model.add_edge(edge) {
                report.edges_loaded += 1;
            } else {
                report.edges_dropped += 1;
            }
        }
        log::debug!("load: {report:?}");
        (model, report)
    }

    /// Snapshot the model (render order preserved) with the given viewport.
    pub fn to_document(&self, viewport: Viewport) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            viewport: Some(viewport),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{EdgeId, NodeId};
    use crate::schema::{RelationType, SubType};
    use kurbo::Point;
    use pretty_assertions::assert_eq;

    fn sample() -> GraphDocument {
        let a = Node::new(NodeId::intern("A"), SubType::Crane, "Crane A", Point::new(100.0, 100.0));
        let b = Node::new(
            NodeId::intern("B"),
            SubType::MechanicalFault,
            "Gear wear",
            Point::new(400.0, 100.0),
        );
        let mut e = Edge::new(EdgeId::intern("e1"), a.id, b.id, RelationType::Causes);
        e.weight = 3.5;
        GraphDocument {
            nodes: vec![a, b],
            edges: vec![e],
            viewport: Some(Viewport {
                zoom: 1.25,
                pan_x: -20.0,
                pan_y: 10.0,
            }),
        }
    }

    #[test]
    fn document_roundtrips_through_model() {
        let doc = sample();
        let (model, report) = GraphModel::from_document(doc.nodes.clone(), doc.edges.clone());
        assert_eq!(report.nodes_dropped + report.edges_dropped, 0);
        let again = model.to_document(doc.viewport.unwrap());
        assert_eq!(again, doc);
    }

    #[test]
    fn document_roundtrips_through_json() {
        let doc = sample();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"sourceNodeId\":\"A\""));
        assert!(json.contains("\"relationType\":\"CAUSES\""));
        assert_eq!(GraphDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn load_drops_dangling_edges_and_bad_nodes() {
        let mut doc = sample();
        doc.nodes.push(Node::new(
            NodeId::intern("broken"),
            SubType::Motor,
            "broken",
            Point::new(f64::NAN, 0.0),
        ));
        doc.nodes.push(doc.nodes[0].clone());
        doc.edges.push(Edge::new(
            EdgeId::intern("e2"),
            NodeId::intern("A"),
            NodeId::intern("broken"),
            RelationType::HasPart,
        ));
        let (model, report) = GraphModel::from_document(doc.nodes, doc.edges);
        assert_eq!(
            report,
            LoadReport {
                nodes_loaded: 2,
                edges_loaded: 1,
                nodes_dropped: 2,
                edges_dropped: 1,
            }
        );
        assert_eq!(model.node_count(), 2);
        assert_eq!(model.edge_count(), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(GraphDocument::from_json("{\"nodes\": 3}").is_err());
        let empty = GraphDocument::from_json("{}").unwrap();
        assert!(empty.nodes.is_empty() && empty.viewport.is_none());
    }
}
