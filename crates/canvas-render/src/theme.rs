//! Colour palette the scene builder resolves visuals against.

use canvas_core::Category;
use serde::Serialize;

/// Theme-dependent colours. CSS colour strings so a Canvas2D or SVG host can
/// use them directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub node_fill: &'static str,
    pub node_text: &'static str,
    pub node_stroke: &'static str,
    pub selected_stroke: &'static str,
    pub connection_source_stroke: &'static str,
    pub multi_select_stroke: &'static str,
    pub edge_stroke: &'static str,
    pub edge_selected_stroke: &'static str,
    pub edge_label: &'static str,
    pub rubber_band: &'static str,
    pub port_fill: &'static str,
}

impl CanvasTheme {
    /// Light theme, warm white canvas.
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.05)",
            node_fill: "#FFFFFF",
            node_text: "#1D1D1F",
            node_stroke: "#C7C7CC",
            selected_stroke: "#0A84FF",
            connection_source_stroke: "#FF9F0A",
            multi_select_stroke: "#5E5CE6",
            edge_stroke: "#8E8E93",
            edge_selected_stroke: "#0A84FF",
            edge_label: "#636366",
            rubber_band: "rgba(255, 159, 10, 0.8)",
            port_fill: "#FFFFFF",
        }
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.04)",
            node_fill: "#2C2C2E",
            node_text: "#F5F5F7",
            node_stroke: "#48484A",
            selected_stroke: "#0A84FF",
            connection_source_stroke: "#FF9F0A",
            multi_select_stroke: "#7D7AFF",
            edge_stroke: "#8E8E93",
            edge_selected_stroke: "#0A84FF",
            edge_label: "#98989D",
            rubber_band: "rgba(255, 159, 10, 0.8)",
            port_fill: "#3A3A3C",
        }
    }

    /// Accent bar colour per category. Same in both themes.
    pub fn category_accent(&self, category: Category) -> &'static str {
        match category {
            Category::Equipment => "#0A84FF",
            Category::Component => "#64D2FF",
            Category::Fault => "#FF453A",
            Category::Symptom => "#FF9F0A",
            Category::DiagnosisStep => "#BF5AF2",
            Category::Solution => "#30D158",
            Category::Source => "#5AC8FA",
            Category::Processor => "#FFD60A",
            Category::Model => "#5E5CE6",
            Category::Sink => "#AC8E68",
        }
    }
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}
