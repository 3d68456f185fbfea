//! The connection gesture as a finite-state machine.
//!
//! ```text
//! Idle ──click output port──▶ ChoosingRelation ──pick──▶ Drawing ──click input port──▶ Idle (commit)
//!   ▲                               │                        │
//!   └──────── Escape / picker dismissed (cancel) ────────────┘
//! ```
//!
//! The controller only tracks the gesture. Checking that a relation is
//! offered for the source's editor and building the edge is the session's
//! job.

use canvas_core::kurbo::Point;
use canvas_core::{GraphModel, NodeId, RelationType};
use serde::Serialize;

/// The transient edge-to-be. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDraft {
    pub from_node_id: NodeId,
    pub relation_type: RelationType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ConnectionState {
    #[default]
    Idle,
    /// Picker open, anchored at `anchor` (screen space).
    ChoosingRelation { from: NodeId, anchor: Point },
    /// Rubber band from the source's output port to `pointer` (canvas space).
    Drawing {
        draft: ConnectionDraft,
        pointer: Point,
    },
}

/// A completed gesture, ready to become an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionCommit {
    pub source: NodeId,
    pub target: NodeId,
    pub relation: RelationType,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionController {
    state: ConnectionState,
}

impl ConnectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ConnectionState::Idle
    }

    /// Source node of the gesture in progress.
    pub fn source(&self) -> Option<NodeId> {
        match self.state {
            ConnectionState::Idle => None,
            ConnectionState::ChoosingRelation { from, .. } => Some(from),
            ConnectionState::Drawing { draft, .. } => Some(draft.from_node_id),
        }
    }

    pub fn draft(&self) -> Option<ConnectionDraft> {
        match self.state {
            ConnectionState::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Picker source and anchor while choosing a relation.
    pub fn picker(&self) -> Option<(NodeId, Point)> {
        match self.state {
            ConnectionState::ChoosingRelation { from, anchor } => Some((from, anchor)),
            _ => None,
        }
    }

    /// Live rubber-band end while drawing.
    pub fn rubber_band_to(&self) -> Option<Point> {
        match self.state {
            ConnectionState::Drawing { pointer, .. } => Some(pointer),
            _ => None,
        }
    }

    /// Output port of `from` clicked at screen point `anchor`.
    ///
    /// Opens the picker. A gesture already in progress is abandoned and the
    /// new one starts from `from`.
    pub fn click_output_port(&mut self, from: NodeId, anchor: Point) {
        log::debug!("connection: {:?} -> choosing relation from {from:?}", self.state);
        self.state = ConnectionState::ChoosingRelation { from, anchor };
    }

    /// Relation chosen in the picker. Only meaningful while choosing; the
    /// rubber band starts at `pointer` (canvas space). Returns whether the
    /// machine advanced.
    pub fn pick_relation(&mut self, relation: RelationType, pointer: Point) -> bool {
        let ConnectionState::ChoosingRelation { from, .. } = self.state else {
            log::debug!("connection: relation pick ignored in {:?}", self.state);
            return false;
        };
        self.state = ConnectionState::Drawing {
            draft: ConnectionDraft {
                from_node_id: from,
                relation_type: relation,
            },
            pointer,
        };
        log::debug!("connection: drawing {relation:?} from {from:?}");
        true
    }

    /// Track the pointer while drawing. Returns whether the rubber band moved.
    pub fn pointer_moved(&mut self, to: Point) -> bool {
        match &mut self.state {
            ConnectionState::Drawing { pointer, .. } if *pointer != to => {
                *pointer = to;
                true
            }
            _ => false,
        }
    }

    /// Input port of `target` clicked.
    ///
    /// Commits while drawing, unless `target` is the source itself: a
    /// self-loop is refused and the draft stays up so the user can pick
    /// another target. Outside `Drawing` this is a no-op.
    pub fn click_input_port(&mut self, target: NodeId) -> Option<ConnectionCommit> {
        let ConnectionState::Drawing { draft, .. } = self.state else {
            return None;
        };
        if draft.from_node_id == target {
            log::warn!("connection: refusing self-loop on {target:?}");
            return None;
        }
        self.state = ConnectionState::Idle;
        let commit = ConnectionCommit {
            source: draft.from_node_id,
            target,
            relation: draft.relation_type,
        };
        log::debug!("connection: commit {commit:?}");
        Some(commit)
    }

    /// Abandon any gesture. Returns `true` if one was in progress.
    pub fn cancel(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        log::debug!("connection: cancel from {:?}", self.state);
        self.state = ConnectionState::Idle;
        true
    }

    /// Cancel if the source node has left the model.
    pub fn retain_existing(&mut self, model: &GraphModel) -> bool {
        match self.source() {
            Some(from) if !model.contains_node(from) => self.cancel(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a() -> NodeId {
        NodeId::intern("a")
    }

    fn b() -> NodeId {
        NodeId::intern("b")
    }

    fn drawing() -> ConnectionController {
        let mut c = ConnectionController::new();
        c.click_output_port(a(), Point::new(10.0, 10.0));
        assert!(c.pick_relation(RelationType::Causes, Point::new(160.0, 28.0)));
        c
    }

    #[test]
    fn full_gesture_commits_once() {
        let mut c = ConnectionController::new();
        c.click_output_port(a(), Point::new(10.0, 10.0));
        assert_eq!(c.picker(), Some((a(), Point::new(10.0, 10.0))));
        assert_eq!(c.draft(), None);

        assert!(c.pick_relation(RelationType::Causes, Point::new(160.0, 28.0)));
        assert_eq!(
            c.draft(),
            Some(ConnectionDraft {
                from_node_id: a(),
                relation_type: RelationType::Causes
            })
        );
        assert_eq!(c.picker(), None);

        let commit = c.click_input_port(b()).unwrap();
        assert_eq!(
            commit,
            ConnectionCommit {
                source: a(),
                target: b(),
                relation: RelationType::Causes
            }
        );
        assert!(c.is_idle());
        assert_eq!(c.click_input_port(b()), None);
    }

    #[test]
    fn input_port_outside_drawing_is_a_no_op() {
        let mut c = ConnectionController::new();
        assert_eq!(c.click_input_port(b()), None);
        c.click_output_port(a(), Point::ZERO);
        assert_eq!(c.click_input_port(b()), None);
        assert_eq!(c.source(), Some(a()));
    }

    #[test]
    fn escape_cancels_from_any_active_state() {
        let mut c = drawing();
        assert!(c.cancel());
        assert!(c.is_idle() && c.draft().is_none());

        c.click_output_port(a(), Point::ZERO);
        assert!(c.cancel());
        assert!(!c.cancel(), "already idle");
    }

    #[test]
    fn self_loop_is_refused_and_draft_kept() {
        let mut c = drawing();
        assert_eq!(c.click_input_port(a()), None);
        assert!(c.draft().is_some());
    }

    #[test]
    fn pick_outside_choosing_is_ignored() {
        let mut c = ConnectionController::new();
        assert!(!c.pick_relation(RelationType::Causes, Point::ZERO));
        let mut c = drawing();
        assert!(!c.pick_relation(RelationType::HasPart, Point::ZERO));
        assert_eq!(c.draft().unwrap().relation_type, RelationType::Causes);
    }

    #[test]
    fn rubber_band_tracks_pointer() {
        let mut c = drawing();
        assert!(c.pointer_moved(Point::new(300.0, 90.0)));
        assert!(!c.pointer_moved(Point::new(300.0, 90.0)));
        assert_eq!(c.rubber_band_to(), Some(Point::new(300.0, 90.0)));
    }

    #[test]
    fn new_output_click_restarts() {
        let mut c = drawing();
        c.click_output_port(b(), Point::new(1.0, 1.0));
        assert_eq!(c.source(), Some(b()));
        assert_eq!(c.draft(), None);
    }

    #[test]
    fn vanished_source_cancels() {
        let model = GraphModel::new();
        let mut c = drawing();
        assert!(c.retain_existing(&model));
        assert!(c.is_idle());
    }
}
