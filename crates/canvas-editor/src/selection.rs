//! Focused selection (node xor edge) plus the multi-select working set.
//!
//! The focus drives external property panels. The multi-select set is
//! orthogonal: it only feeds group drag and bulk highlight, and changing it
//! never moves the focus.

use canvas_core::{EdgeId, GraphModel, NodeId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    node: Option<NodeId>,
    edge: Option<EdgeId>,
    /// Insertion-ordered, no duplicates.
    multi: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn focused_edge(&self) -> Option<EdgeId> {
        self.edge
    }

    pub fn multi(&self) -> &[NodeId] {
        &self.multi
    }

    pub fn is_multi(&self, id: NodeId) -> bool {
        self.multi.contains(&id)
    }

    /// Focus a node; clears the edge focus.
    pub fn select_node(&mut self, id: NodeId) {
        self.node = Some(id);
        self.edge = None;
    }

    /// Focus an edge; clears the node focus.
    pub fn select_edge(&mut self, id: EdgeId) {
        self.edge = Some(id);
        self.node = None;
    }

    /// Drop the focus, leaving the multi-select set alone.
    pub fn clear_focus(&mut self) {
        self.node = None;
        self.edge = None;
    }

    /// Add `id` to the multi-select set, or remove it if present.
    /// Returns whether it is a member afterwards.
    pub fn toggle_multi(&mut self, id: NodeId) -> bool {
        if let Some(pos) = self.multi.iter().position(|n| *n == id) {
            self.multi.remove(pos);
            false
        } else {
            self.multi.push(id);
            true
        }
    }

    pub fn clear_multi(&mut self) {
        self.multi.clear();
    }

    pub fn set_multi(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.multi.clear();
        for id in ids {
            if !self.multi.contains(&id) {
                self.multi.push(id);
            }
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drop ids that are no longer in `model`. Returns `true` if anything
    /// was dropped.
    pub fn retain_existing(&mut self, model: &GraphModel) -> bool {
        let before = (self.node, self.edge, self.multi.len());
        self.node = self.node.filter(|id| model.contains_node(*id));
        self.edge = self.edge.filter(|id| model.contains_edge(*id));
        self.multi.retain(|id| model.contains_node(*id));
        before != (self.node, self.edge, self.multi.len())
    }
}
