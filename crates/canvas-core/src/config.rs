//! Editor tunables.
//!
//! Defaults match the console's canvases; hosts may override any subset
//! through JSON (`{"zoomStep": 0.05}`). The zoom range itself is fixed in
//! [`crate::viewport`] and is not configurable.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

/// Configuration for an editor session and the render/hit-test layers it drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Zoom change per wheel tick or zoom shortcut. Default: **0.08**.
    pub zoom_step: f64,

    /// Radius of input/output port circles, canvas units. Default: **6**.
    pub port_radius: f64,

    /// Width of the edge hit band, in *screen* pixels. Divided by zoom
    /// before testing in canvas space. Default: **12**.
    pub edge_tolerance_px: f64,

    /// Padding around the node bounding box for `fit_to_view`. Default: **40**.
    pub fit_padding: f64,

    /// Vertical lift of edge labels above the path midpoint. Default: **6**.
    pub label_offset: f64,

    /// Horizontal Bezier control offset as a share of the horizontal span
    /// between ports. Default: **0.4**.
    pub control_ratio: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.08,
            port_radius: 6.0,
            edge_tolerance_px: 12.0,
            fit_padding: 40.0,
            label_offset: 6.0,
            control_ratio: 0.4,
        }
    }
}

impl EditorConfig {
    /// Parse a partial JSON override on top of the defaults.
    ///
    /// # Errors
    /// Returns [`DocumentError::Json`] when the payload is not valid JSON or
    /// a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}
