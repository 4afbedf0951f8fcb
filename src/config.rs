use serde::Deserialize;

use crate::graph::EdgeShape;

/// Size mapping parameters applied by `rescale` and `translate`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizingConfig {
    pub min_node_size: f64,
    pub max_node_size: f64,
    pub min_edge_size: f64,
    pub max_edge_size: f64,
    /// Exponent applied to the zoom ratio for node sizes.
    pub nodes_pow_ratio: f64,
    /// Exponent applied to the zoom ratio for edge thickness.
    pub edges_pow_ratio: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_node_size: 0.0,
            max_node_size: 0.0,
            min_edge_size: 0.0,
            max_edge_size: 0.0,
            nodes_pow_ratio: 0.5,
            edges_pow_ratio: 0.0,
        }
    }
}

/// How label font sizes are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSize {
    /// Every label uses the configured default size.
    #[default]
    Fixed,
    /// The font size follows the item's display size times a ratio.
    Proportional,
}

/// Per-tick quotas and label filters used by the layer tasks.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotterConfig {
    pub edges_speed: usize,
    pub nodes_speed: usize,
    pub labels_speed: usize,
    pub edge_labels_speed: usize,
    pub label_threshold: f64,
    pub edge_label_threshold: f64,
    pub default_label_size: f64,
    pub default_edge_label_size: f64,
    pub label_size: LabelSize,
    pub edge_label_size: LabelSize,
    pub label_size_ratio: f64,
    pub edge_label_size_ratio: f64,
    pub default_edge_type: EdgeShape,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            edges_speed: 200,
            nodes_speed: 200,
            labels_speed: 200,
            edge_labels_speed: 200,
            label_threshold: 6.0,
            edge_label_threshold: 6.0,
            default_label_size: 12.0,
            default_edge_label_size: 12.0,
            label_size: LabelSize::Fixed,
            edge_label_size: LabelSize::Fixed,
            label_size_ratio: 2.0,
            edge_label_size_ratio: 1.0,
            default_edge_type: EdgeShape::Line,
        }
    }
}

/// Draw intensities and overlay switches of one view instance.
///
/// Intensities use the integer encoding of [`crate::DrawMode`]:
/// -1 keeps the layer untouched, 0 skips it, 1 draws it progressively and
/// 2 draws it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub auto: bool,
    pub draw_nodes: i32,
    pub draw_edges: i32,
    pub draw_labels: i32,
    pub draw_edge_labels: i32,
    pub draw_hover_nodes: bool,
    pub draw_active_nodes: bool,
    pub draw_hover_edges: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            auto: true,
            draw_nodes: 2,
            draw_edges: 1,
            draw_labels: 2,
            draw_edge_labels: 2,
            draw_hover_nodes: true,
            draw_active_nodes: true,
            draw_hover_edges: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub graph: SizingConfig,
    pub plotter: PlotterConfig,
    pub view: ViewConfig,
}

impl Settings {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.graph.nodes_pow_ratio, 0.5);
        assert_eq!(settings.plotter.nodes_speed, 200);
        assert_eq!(settings.view.draw_edges, 1);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings = Settings::from_json(
            r#"{
                "graph": { "minNodeSize": 2, "maxNodeSize": 8 },
                "plotter": { "nodesSpeed": 50, "defaultEdgeType": "curve" },
                "view": { "drawHoverEdges": true }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.graph.min_node_size, 2.0);
        assert_eq!(settings.graph.max_node_size, 8.0);
        assert_eq!(settings.graph.edges_pow_ratio, 0.0);
        assert_eq!(settings.plotter.nodes_speed, 50);
        assert_eq!(settings.plotter.edges_speed, 200);
        assert_eq!(settings.plotter.default_edge_type, EdgeShape::Curve);
        assert!(settings.view.draw_hover_edges);
        assert!(settings.view.auto);
    }

    #[test]
    fn label_size_modes_parse_in_lowercase() {
        let settings = Settings::from_json(
            r#"{ "plotter": { "edgeLabelSize": "proportional", "edgeLabelSizeRatio": 4 } }"#,
        )
        .unwrap();

        assert_eq!(settings.plotter.label_size, LabelSize::Fixed);
        assert_eq!(settings.plotter.edge_label_size, LabelSize::Proportional);
        assert_eq!(settings.plotter.edge_label_size_ratio, 4.0);
        assert_eq!(settings.plotter.label_size_ratio, 2.0);
        assert!(Settings::from_json(r#"{ "plotter": { "labelSize": "huge" } }"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Settings::from_json("{ \"graph\": ").is_err());
    }
}
