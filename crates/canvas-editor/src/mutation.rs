//! Graph mutations: the only way interaction code changes the model.
//!
//! Controllers return `GraphMutation`s; the session applies them in order
//! and reports each applied one to the host as an effect, so persistence or
//! collaboration layers can mirror the edit.

use canvas_core::kurbo::Vec2;
use canvas_core::{Edge, EdgeId, EdgePatch, GraphModel, Node, NodeId, NodePatch};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GraphMutation {
    AddNode {
        node: Box<Node>,
    },
    MoveNode {
        id: NodeId,
        dx: f64,
        dy: f64,
    },
    UpdateNode {
        id: NodeId,
        patch: NodePatch,
    },
    /// Also removes every edge touching the node.
    RemoveNode {
        id: NodeId,
    },
    AddEdge {
        edge: Edge,
    },
    UpdateEdge {
        id: EdgeId,
        patch: EdgePatch,
    },
    RemoveEdge {
        id: EdgeId,
    },
}

impl GraphMutation {
    /// Apply to `model`. Returns `false` when the mutation was a no-op
    /// (stale id, rejected node, dangling edge).
    pub fn apply(&self, model: &mut GraphModel) -> bool {
        match self {
            Self::AddNode { node } => match model.add_node(node.as_ref().clone()) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("add node rejected: {err}");
                    false
                }
            },
            Self::MoveNode { id, dx, dy } => model.translate_node(*id, Vec2::new(*dx, *dy)),
            Self::UpdateNode { id, patch } => model.update_node(*id, patch),
            Self::RemoveNode { id } => model.remove_node(*id).is_some(),
            Self::AddEdge { edge } => model.add_edge(edge.clone()),
            Self::UpdateEdge { id, patch } => model.update_edge(*id, patch),
            Self::RemoveEdge { id } => model.remove_edge(*id).is_some(),
        }
    }
}
