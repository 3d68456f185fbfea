//! Node drag sessions.
//!
//! A drag remembers where inside the node the pointer grabbed it. Each move
//! places the node so the grab point sits under the pointer again; when the
//! node belongs to the multi-select set, every member gets the same delta.

use crate::mutation::GraphMutation;
use canvas_core::kurbo::{Point, Vec2};
use canvas_core::{GraphModel, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    node_id: NodeId,
    /// Pointer minus node position at grab time, canvas units.
    grab_offset: Vec2,
}

impl DragSession {
    pub fn begin(node: &Node, pointer: Point) -> Self {
        Self {
            node_id: node.id,
            grab_offset: pointer - node.position,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn grab_offset(&self) -> Vec2 {
        self.grab_offset
    }

    /// Mutations for a pointer move to `pointer` (canvas space).
    ///
    /// `group` is the current multi-select set. Empty when the dragged node
    /// has vanished or the pointer has not moved it.
    pub fn step(&self, model: &GraphModel, pointer: Point, group: &[NodeId]) -> Vec<GraphMutation> {
        let Some(node) = model.node(self.node_id) else {
            return vec![];
        };
        let delta = (pointer - self.grab_offset) - node.position;
        if delta == Vec2::ZERO || !delta.is_finite() {
            return vec![];
        }
        let move_node = |id: NodeId| GraphMutation::MoveNode {
            id,
            dx: delta.x,
            dy: delta.y,
        };
        if group.contains(&self.node_id) {
            group
                .iter()
                .filter(|id| model.contains_node(**id))
                .map(|id| move_node(*id))
                .collect()
        } else {
            vec![move_node(self.node_id)]
        }
    }
}
