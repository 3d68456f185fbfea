//! Graph data model for the diagnostics canvas.
//!
//! Nodes are typed, fixed-footprint vertices (equipment, faults, pipeline
//! stages); edges are directed, typed, weighted relations between them. The
//! model lives in a petgraph `StableDiGraph` so node removal cascades to
//! incident edges, with id indexes and explicit render order kept alongside.

use crate::error::EditError;
use crate::id::{EdgeId, NodeId};
use crate::schema::{Category, NodeConfig, RelationType, SubType};
use kurbo::{Point, Rect, Size, Vec2};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 10.0;
pub const DEFAULT_WEIGHT: f64 = 1.0;

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

/// Clamp an edge weight into `[MIN_WEIGHT, MAX_WEIGHT]`; NaN becomes the default.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        DEFAULT_WEIGHT
    } else {
        weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Review state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Normal,
    PendingConfirm,
    Deprecated,
}

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSide {
    /// Left edge; connection target.
    Input,
    /// Right edge; connection source.
    Output,
}

/// A vertex on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub category: Category,
    pub sub_type: SubType,
    pub label: String,
    /// Top-left corner, canvas space.
    pub position: Point,
    /// Fixed per subtype; rewritten from the catalogue when the node enters a model.
    pub size: Size,
    /// Missing on the wire → `Normal`.
    #[serde(default)]
    pub status: NodeStatus,
    pub config: NodeConfig,
    /// Missing on the wire → 0.
    #[serde(default)]
    pub hit_count: u64,
}

impl Node {
    /// A fresh node of `sub_type` with its catalogue size and an empty config.
    pub fn new(id: NodeId, sub_type: SubType, label: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            category: sub_type.category(),
            sub_type,
            label: label.into(),
            position,
            size: sub_type.size(),
            status: NodeStatus::Normal,
            config: NodeConfig::for_sub_type(sub_type),
            hit_count: 0,
        }
    }

    /// Canvas-space footprint.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Port centre: vertical midpoint of the left (input) or right (output) edge.
    pub fn port(&self, side: PortSide) -> Point {
        let y = self.position.y + self.size.height / 2.0;
        match side {
            PortSide::Input => Point::new(self.position.x, y),
            PortSide::Output => Point::new(self.position.x + self.size.width, y),
        }
    }
}

/// Partial node update from a property panel. `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub label: Option<String>,
    pub position: Option<Point>,
    pub status: Option<NodeStatus>,
    pub config: Option<NodeConfig>,
    pub hit_count: Option<u64>,
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A directed, typed, weighted relation between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub relation_type: RelationType,
    /// `None` renders as the relation's display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// In `[0, 10]`. Missing on the wire → 1.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Missing on the wire → 0.
    #[serde(default)]
    pub hit_count: u64,
}

impl Edge {
    /// An edge as committed by a connection gesture: labelled with the
    /// relation's display name, weight 1.
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, relation: RelationType) -> Self {
        Self {
            id,
            source_node_id: source,
            target_node_id: target,
            relation_type: relation,
            label: Some(relation.display_label().to_string()),
            weight: DEFAULT_WEIGHT,
            hit_count: 0,
        }
    }

    /// Label to draw: the explicit label, else the relation's display name.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.relation_type.display_label())
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source_node_id == node || self.target_node_id == node
    }
}

/// Partial edge update from a property panel. `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgePatch {
    pub label: Option<String>,
    /// Drop the explicit label so the relation name shows. Wins over `label`.
    pub clear_label: bool,
    pub relation_type: Option<RelationType>,
    /// Clamped into `[0, 10]`.
    pub weight: Option<f64>,
    pub hit_count: Option<u64>,
}

/// A node removed from the model together with the edges that went with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

// ─── Graph model ─────────────────────────────────────────────────────────

/// The owned node/edge store.
///
/// Every edge's endpoints are nodes in the model: `add_edge` refuses
/// dangling endpoints and `remove_node` removes incident edges in the same
/// call.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    graph: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    /// Render order, bottom first. Kept apart from `graph` because
    /// `StableGraph` recycles vacated indices.
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    /// Every id that has ever been inserted, including removed ones.
    /// Survives `clear` and `adopt` so generated ids are never reissued.
    seen_nodes: HashSet<NodeId>,
    seen_edges: HashSet<EdgeId>,
}

impl GraphModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Nodes in render order (last = topmost).
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.node(*id))
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edge(*id))
    }

    /// Ids of edges whose source or target is `node`.
    pub fn edges_touching(&self, node: NodeId) -> SmallVec<[EdgeId; 4]> {
        let Some(&idx) = self.node_index.get(&node) else {
            return SmallVec::new();
        };
        let mut ids: SmallVec<[EdgeId; 4]> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        // Self-loops show up in both directions.
        ids.sort_by_key(|id| self.edge_order.iter().position(|e| e == id));
        ids.dedup();
        ids
    }

    /// Whether `id` was ever inserted, even if it has since been removed.
    pub fn has_seen_node(&self, id: NodeId) -> bool {
        self.seen_nodes.contains(&id)
    }

    pub fn has_seen_edge(&self, id: EdgeId) -> bool {
        self.seen_edges.contains(&id)
    }

    /// Generate a node id starting with `prefix` that this model has never held.
    pub fn fresh_node_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::with_prefix(prefix);
            if !self.has_seen_node(id) {
                return id;
            }
        }
    }

    /// Generate an edge id this model has never held.
    pub fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = EdgeId::with_prefix("edge");
            if !self.has_seen_edge(id) {
                return id;
            }
        }
    }

    /// Insert a node on top of the render order.
    ///
    /// The node's size is reset to its subtype's fixed size, and a config that
    /// does not fit the subtype is replaced by the subtype's empty config.
    ///
    /// # Errors
    /// - [`EditError::NonFiniteGeometry`] for NaN/infinite positions.
    /// - [`EditError::CategoryMismatch`] when the subtype refines another category.
    /// - [`EditError::DuplicateId`] when the id is already present.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, EditError> {
        if !is_finite(node.position) {
            return Err(EditError::NonFiniteGeometry {
                x: node.position.x,
                y: node.position.y,
            });
        }
        if !node.sub_type.refines(node.category) {
            return Err(EditError::CategoryMismatch {
                category: node.category,
                sub_type: node.sub_type,
            });
        }
        if self.contains_node(node.id) {
            return Err(EditError::DuplicateId(node.id));
        }
        node.size = node.sub_type.size();
        if !node.config.fits(node.sub_type) {
            log::warn!(
                "node {:?}: {:?} config does not fit {:?}, resetting",
                node.id,
                node.config.schema(),
                node.sub_type
            );
            node.config = NodeConfig::for_sub_type(node.sub_type);
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.seen_nodes.insert(id);
        self.node_index.insert(id, idx);
        self.node_order.push(id);
        Ok(id)
    }

    /// Insert an edge. Returns `false` (and leaves the model untouched) if
    /// either endpoint is missing or the id is taken. The weight is clamped.
    pub fn add_edge(&mut self, mut edge: Edge) -> bool {
        let (Some(&from), Some(&to)) = (
            self.node_index.get(&edge.source_node_id),
            self.node_index.get(&edge.target_node_id),
        ) else {
            log::warn!(
                "edge {:?}: endpoint missing ({:?} -> {:?})",
                edge.id,
                edge.source_node_id,
                edge.target_node_id
            );
            return false;
        };
        if self.contains_edge(edge.id) {
            log::warn!("edge {:?}: duplicate id", edge.id);
            return false;
        }
        edge.weight = clamp_weight(edge.weight);
        let id = edge.id;
        let idx = self.graph.add_edge(from, to, edge);
        self.seen_edges.insert(id);
        self.edge_index.insert(id, idx);
        self.edge_order.push(id);
        true
    }

    /// Remove a node and, atomically, every edge referencing it.
    /// Missing ids are a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> Option<RemovedNode> {
        let edge_ids = self.edges_touching(id);
        let idx = self.node_index.remove(&id)?;
        let mut edges = Vec::with_capacity(edge_ids.len());
        for eid in self.edge_order.iter().filter(|e| edge_ids.contains(e)) {
            if let Some(eidx) = self.edge_index.get(eid) {
                edges.push(self.graph[*eidx].clone());
            }
        }
        for eid in &edge_ids {
            self.edge_index.remove(eid);
        }
        self.edge_order.retain(|e| !edge_ids.contains(e));
        self.node_order.retain(|n| *n != id);
        // petgraph drops the incident edges along with the node.
        let node = self.graph.remove_node(idx)?;
        Some(RemovedNode { node, edges })
    }

    /// Remove an edge. Missing ids are a no-op.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let idx = self.edge_index.remove(&id)?;
        self.edge_order.retain(|e| *e != id);
        self.graph.remove_edge(idx)
    }

    /// Drop every node and edge. Retired ids stay retired.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.node_order.clear();
        self.edge_order.clear();
    }

    /// Replace the contents with `loaded`, keeping the id history of both.
    pub fn adopt(&mut self, loaded: GraphModel) {
        let mut seen_nodes = std::mem::take(&mut self.seen_nodes);
        let mut seen_edges = std::mem::take(&mut self.seen_edges);
        *self = loaded;
        seen_nodes.extend(self.seen_nodes.drain());
        seen_edges.extend(self.seen_edges.drain());
        self.seen_nodes = seen_nodes;
        self.seen_edges = seen_edges;
    }

    /// Move a node by `delta`. Returns `false` for missing ids or a
    /// non-finite result.
    pub fn translate_node(&mut self, id: NodeId, delta: Vec2) -> bool {
        let Some(&idx) = self.node_index.get(&id) else {
            return false;
        };
        let node = &mut self.graph[idx];
        let moved = node.position + delta;
        if !is_finite(moved) {
            return false;
        }
        node.position = moved;
        true
    }

    /// Apply a partial node update. Returns `false` for missing ids.
    ///
    /// A non-finite position or a config for another schema is ignored;
    /// the remaining fields still apply.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        let Some(&idx) = self.node_index.get(&id) else {
            return false;
        };
        let node = &mut self.graph[idx];
        if let Some(label) = &patch.label {
            node.label.clone_from(label);
        }
        if let Some(position) = patch.position {
            if is_finite(position) {
                node.position = position;
            } else {
                log::warn!("node {id:?}: ignoring non-finite position {position:?}");
            }
        }
        if let Some(status) = patch.status {
            node.status = status;
        }
        if let Some(config) = &patch.config {
            if config.fits(node.sub_type) {
                node.config = config.clone();
            } else {
                log::warn!(
                    "node {id:?}: ignoring {:?} config for {:?}",
                    config.schema(),
                    node.sub_type
                );
            }
        }
        if let Some(hits) = patch.hit_count {
            node.hit_count = hits;
        }
        true
    }

    /// Apply a partial edge update. Returns `false` for missing ids.
    pub fn update_edge(&mut self, id: EdgeId, patch: &EdgePatch) -> bool {
        let Some(&idx) = self.edge_index.get(&id) else {
            return false;
        };
        let edge = &mut self.graph[idx];
        if patch.clear_label {
            edge.label = None;
        } else if let Some(label) = &patch.label {
            edge.label = Some(label.clone());
        }
        if let Some(relation) = patch.relation_type {
            edge.relation_type = relation;
        }
        if let Some(weight) = patch.weight {
            edge.weight = clamp_weight(weight);
        }
        if let Some(hits) = patch.hit_count {
            edge.hit_count = hits;
        }
        true
    }

    /// Union of every node footprint, or `None` for an empty model.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.nodes().map(Node::rect).reduce(|acc, r| acc.union(r))
    }
}
