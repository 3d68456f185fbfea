pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod model;
pub mod schema;
pub mod viewport;

pub use config::EditorConfig;
pub use document::{GraphDocument, LoadReport};
pub use error::{DocumentError, EditError};
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use schema::{Category, EditorKind, NodeConfig, RelationType, SubType};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, PanSession, Surface, Viewport};

// Re-export kurbo geometry so downstream crates agree on one version.
pub use kurbo;
