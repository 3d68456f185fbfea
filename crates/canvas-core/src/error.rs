//! Error types for the few operations that report failure to the caller.
//!
//! Interaction handlers never return these: stale ids and malformed gestures
//! are absorbed as no-ops. Only node creation and document decoding hand a
//! failure back.

use crate::id::NodeId;
use crate::schema::{Category, SubType};
use thiserror::Error;

/// Why a node could not be added to the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("non-finite position ({x}, {y})")]
    NonFiniteGeometry { x: f64, y: f64 },

    #[error("subtype {sub_type:?} does not refine category {category:?}")]
    CategoryMismatch {
        category: Category,
        sub_type: SubType,
    },

    #[error("node id {0} already exists")]
    DuplicateId(NodeId),
}

/// Failure decoding a graph document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}
