//! Incremental layer drawing.
//!
//! Each layer keeps a cursor into the graph's draw order. A layer task draws
//! at most `speed` items per call and reports whether it has more to do, so a
//! scheduler can spread a large graph over several frames.

use crate::config::{LabelSize, PlotterConfig};
use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeShape, GraphStore, Node};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Nodes,
    Edges,
    Labels,
    EdgeLabels,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Nodes, Layer::Edges, Layer::Labels, Layer::EdgeLabels];

    pub fn name(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Edges => "edges",
            Self::Labels => "labels",
            Self::EdgeLabels => "edge labels",
        }
    }
}

/// Receives the draw calls of the layer tasks and the hover pass.
///
/// Implementors own the actual surfaces; the plotter only decides what is
/// drawn and in which order.
pub trait LayerPainter {
    fn clear_layer(&mut self, layer: Layer);
    /// Clears the hover and active overlays.
    fn clear_hover(&mut self);

    fn draw_node(&mut self, node: &Node);
    fn draw_edge(&mut self, edge: &Edge, source: &Node, target: &Node, shape: EdgeShape);
    fn draw_label(&mut self, node: &Node, font_size: f64);
    fn draw_edge_label(
        &mut self,
        edge: &Edge,
        source: &Node,
        target: &Node,
        shape: EdgeShape,
        font_size: f64,
    );

    fn draw_hover_node(&mut self, node: &Node);
    fn draw_hover_edge(&mut self, edge: &Edge, source: &Node, target: &Node, shape: EdgeShape);
    fn draw_active_node(&mut self, node: &Node);
}

#[derive(Clone, Debug)]
pub struct Plotter {
    pub current_node_index: usize,
    pub current_edge_index: usize,
    pub current_label_index: usize,
    pub current_edge_label_index: usize,
    config: PlotterConfig,
    width: f64,
    height: f64,
}

impl Plotter {
    pub fn new(config: PlotterConfig, width: f64, height: f64) -> Self {
        Self {
            current_node_index: 0,
            current_edge_index: 0,
            current_label_index: 0,
            current_edge_label_index: 0,
            config,
            width,
            height,
        }
    }

    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PlotterConfig) {
        self.config = config;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn reset_cursors(&mut self) {
        self.current_node_index = 0;
        self.current_edge_index = 0;
        self.current_label_index = 0;
        self.current_edge_label_index = 0;
    }

    pub fn label_font_size(&self, node: &Node) -> f64 {
        match self.config.label_size {
            LabelSize::Fixed => self.config.default_label_size,
            LabelSize::Proportional => self.config.label_size_ratio * node.display_size,
        }
    }

    pub fn edge_label_font_size(&self, edge: &Edge) -> f64 {
        match self.config.edge_label_size {
            LabelSize::Fixed => self.config.default_edge_label_size,
            LabelSize::Proportional => self.config.edge_label_size_ratio * edge.display_size,
        }
    }

    /// Items drawn per task call; never below one.
    pub fn speed(&self, layer: Layer) -> usize {
        let speed = match layer {
            Layer::Nodes => self.config.nodes_speed,
            Layer::Edges => self.config.edges_speed,
            Layer::Labels => self.config.labels_speed,
            Layer::EdgeLabels => self.config.edge_labels_speed,
        };
        speed.max(1)
    }

    pub fn cursor(&self, layer: Layer) -> usize {
        match layer {
            Layer::Nodes => self.current_node_index,
            Layer::Edges => self.current_edge_index,
            Layer::Labels => self.current_label_index,
            Layer::EdgeLabels => self.current_edge_label_index,
        }
    }

    /// True when the node is visible and within the viewport grown by a
    /// third of the viewport size on every side.
    pub fn is_on_screen(&self, node: &Node) -> Result<bool> {
        if !node.x.is_finite() || !node.y.is_finite() {
            return Err(Error::InvalidGeometry {
                id: node.id.clone(),
            });
        }

        let (width, height) = (self.width, self.height);
        Ok(!node.hidden
            && node.display_x + node.display_size > -width / 3.0
            && node.display_x - node.display_size < width * 4.0 / 3.0
            && node.display_y + node.display_size > -height / 3.0
            && node.display_y - node.display_size < height * 4.0 / 3.0)
    }

    /// Runs one step of the given layer. Returns whether items remain.
    pub fn task(
        &mut self,
        layer: Layer,
        graph: &GraphStore,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        match layer {
            Layer::Nodes => self.task_draw_nodes(graph, painter),
            Layer::Edges => self.task_draw_edges(graph, painter),
            Layer::Labels => self.task_draw_labels(graph, painter),
            Layer::EdgeLabels => self.task_draw_edge_labels(graph, painter),
        }
    }

    pub fn task_draw_nodes(
        &mut self,
        graph: &GraphStore,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        let nodes = graph.nodes();
        let end = self.current_node_index.saturating_add(self.speed(Layer::Nodes));

        while self.current_node_index < end && self.current_node_index < nodes.len() {
            let node = &nodes[self.current_node_index];
            self.current_node_index += 1;
            if self.is_on_screen(node)? {
                painter.draw_node(node);
            }
        }

        Ok(self.current_node_index < nodes.len())
    }

    pub fn task_draw_labels(
        &mut self,
        graph: &GraphStore,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        let nodes = graph.nodes();
        let end = self.current_label_index.saturating_add(self.speed(Layer::Labels));

        while self.current_label_index < end && self.current_label_index < nodes.len() {
            let node = &nodes[self.current_label_index];
            self.current_label_index += 1;
            if !self.is_on_screen(node)? {
                continue;
            }
            if node.display_size >= self.config.label_threshold || node.force_label {
                painter.draw_label(node, self.label_font_size(node));
            }
        }

        Ok(self.current_label_index < nodes.len())
    }

    pub fn task_draw_edges(
        &mut self,
        graph: &GraphStore,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        let edges = graph.edges();
        let end = self.current_edge_index.saturating_add(self.speed(Layer::Edges));

        while self.current_edge_index < end && self.current_edge_index < edges.len() {
            let edge = &edges[self.current_edge_index];
            self.current_edge_index += 1;
            let Some((source, target)) = graph.endpoints(edge) else {
                continue;
            };
            if edge.hidden || source.hidden || target.hidden {
                continue;
            }
            if self.is_on_screen(source)? || self.is_on_screen(target)? {
                painter.draw_edge(edge, source, target, edge.shape(self.config.default_edge_type));
            }
        }

        Ok(self.current_edge_index < edges.len())
    }

    pub fn task_draw_edge_labels(
        &mut self,
        graph: &GraphStore,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        let edges = graph.edges();
        let end = self
            .current_edge_label_index
            .saturating_add(self.speed(Layer::EdgeLabels));

        while self.current_edge_label_index < end && self.current_edge_label_index < edges.len() {
            let edge = &edges[self.current_edge_label_index];
            self.current_edge_label_index += 1;
            let Some((source, target)) = graph.endpoints(edge) else {
                continue;
            };
            if edge.hidden || !(self.is_on_screen(source)? || self.is_on_screen(target)?) {
                continue;
            }
            if edge.is_self_loop() || edge.label.is_empty() {
                continue;
            }
            let font_size = self.edge_label_font_size(edge);
            if font_size >= self.config.edge_label_threshold {
                let shape = edge.shape(self.config.default_edge_type);
                painter.draw_edge_label(edge, source, target, shape, font_size);
            }
        }

        Ok(self.current_edge_label_index < edges.len())
    }

    /// Active nodes are left to [`Plotter::draw_active_nodes`].
    pub fn draw_hover_nodes(&self, graph: &GraphStore, painter: &mut dyn LayerPainter) {
        for node in graph.hovered_nodes() {
            if !node.active {
                painter.draw_hover_node(node);
            }
        }
    }

    pub fn draw_hover_edges(&self, graph: &GraphStore, painter: &mut dyn LayerPainter) {
        for edge in graph.hovered_edges() {
            if let Some((source, target)) = graph.endpoints(edge) {
                painter.draw_hover_edge(edge, source, target, edge.shape(self.config.default_edge_type));
            }
        }
    }

    pub fn draw_active_nodes(&self, graph: &GraphStore, painter: &mut dyn LayerPainter) -> Result<()> {
        for node in graph.nodes().iter().filter(|node| node.active) {
            if self.is_on_screen(node)? {
                painter.draw_active_node(node);
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::recording::{Call, RecordingPainter};
    use super::*;
    use crate::graph::Params;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn line_of_nodes(count: usize) -> GraphStore {
        let mut graph = GraphStore::new();
        for index in 0..count {
            graph
                .add_node(&format!("n{index}"), &params(json!({ "x": index * 10, "y": 10 })))
                .unwrap();
        }
        graph.rescale(100.0, 100.0, true, true);
        graph
    }

    fn plotter_with_speed(speed: usize) -> Plotter {
        let config = PlotterConfig {
            nodes_speed: speed,
            edges_speed: speed,
            labels_speed: speed,
            edge_labels_speed: speed,
            ..PlotterConfig::default()
        };
        Plotter::new(config, 100.0, 100.0)
    }

    #[test]
    fn node_task_draws_in_batches() {
        let graph = line_of_nodes(5);
        let mut plotter = plotter_with_speed(2);
        let mut painter = RecordingPainter::default();

        assert!(plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());
        assert!(plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());
        assert!(!plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());
        assert_eq!(plotter.current_node_index, 5);
        assert_eq!(painter.drawn(Layer::Nodes), vec!["n0", "n1", "n2", "n3", "n4"]);

        plotter.reset_cursors();
        assert_eq!(plotter.cursor(Layer::Nodes), 0);
    }

    #[test]
    fn zero_speed_still_makes_progress() {
        let graph = line_of_nodes(2);
        let mut plotter = plotter_with_speed(0);
        let mut painter = RecordingPainter::default();

        assert_eq!(plotter.speed(Layer::Edges), 1);
        assert!(plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());
        assert!(!plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());
    }

    #[test]
    fn hidden_and_far_away_nodes_are_skipped() {
        let mut graph = GraphStore::new();
        graph.add_node("near", &params(json!({ "x": 50, "y": 50 }))).unwrap();
        graph.add_node("hidden", &params(json!({ "x": 50, "y": 50, "hidden": true }))).unwrap();
        graph.add_node("edge_of_view", &params(json!({ "x": -30, "y": 130 }))).unwrap();
        graph.add_node("far", &params(json!({ "x": -500, "y": 50 }))).unwrap();
        graph.rescale(100.0, 100.0, true, true);
        let mut plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        assert!(!plotter.task(Layer::Nodes, &graph, &mut painter).unwrap());

        assert_eq!(painter.drawn(Layer::Nodes), vec!["near", "edge_of_view"]);
    }

    #[test]
    fn labels_respect_threshold_unless_forced() {
        let mut graph = GraphStore::new();
        graph.add_node("small", &params(json!({ "x": 10, "y": 10 }))).unwrap();
        graph
            .add_node("forced", &params(json!({ "x": 20, "y": 10, "forceLabel": true })))
            .unwrap();
        graph.add_node("big", &params(json!({ "x": 30, "y": 10, "size": 400 }))).unwrap();
        graph.rescale(100.0, 100.0, true, true);
        let mut plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::Labels, &graph, &mut painter).unwrap();

        assert_eq!(painter.drawn(Layer::Labels), vec!["forced", "big"]);
    }

    #[test]
    fn edges_skip_hidden_endpoints_and_use_their_shape() {
        let mut graph = line_of_nodes(3);
        graph.iter_nodes_by_id(["n2"], |node| node.hidden = true);
        graph.add_edge("e01", "n0", "n1", &params(json!({ "type": "curve" }))).unwrap();
        graph.add_edge("e12", "n1", "n2", &Params::new()).unwrap();
        graph.add_edge("e10", "n1", "n0", &params(json!({ "hidden": true }))).unwrap();
        let mut plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::Edges, &graph, &mut painter).unwrap();

        assert_eq!(painter.calls, vec![Call::Edge("e01".into(), EdgeShape::Curve)]);
    }

    #[test]
    fn edge_labels_skip_self_loops_and_blank_labels() {
        let mut graph = line_of_nodes(2);
        graph.add_edge("loop", "n0", "n0", &Params::new()).unwrap();
        graph.add_edge("blank", "n0", "n1", &params(json!({ "label": "" }))).unwrap();
        graph.add_edge("named", "n0", "n1", &Params::new()).unwrap();
        let mut plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::EdgeLabels, &graph, &mut painter).unwrap();

        assert_eq!(painter.drawn(Layer::EdgeLabels), vec!["named"]);
    }

    #[test]
    fn edge_labels_follow_the_resolved_edge_shape() {
        let mut graph = line_of_nodes(2);
        graph.add_edge("plain", "n0", "n1", &Params::new()).unwrap();
        graph.add_edge("straight", "n0", "n1", &params(json!({ "type": "line" }))).unwrap();
        let mut plotter = Plotter::new(
            PlotterConfig {
                default_edge_type: EdgeShape::Curve,
                ..PlotterConfig::default()
            },
            100.0,
            100.0,
        );
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::EdgeLabels, &graph, &mut painter).unwrap();

        assert_eq!(
            painter.calls,
            vec![
                Call::EdgeLabel("plain".into(), EdgeShape::Curve, 12.0),
                Call::EdgeLabel("straight".into(), EdgeShape::Line, 12.0),
            ]
        );
    }

    #[test]
    fn proportional_label_sizes_filter_thin_edges() {
        let mut graph = line_of_nodes(2);
        graph.add_edge("thin", "n0", "n1", &Params::new()).unwrap();
        graph.add_edge("thick", "n0", "n1", &Params::new()).unwrap();
        graph.iter_edges_by_id(["thin"], |edge| edge.display_size = 1.0);
        graph.iter_edges_by_id(["thick"], |edge| edge.display_size = 8.0);
        let mut plotter = Plotter::new(
            PlotterConfig {
                edge_label_size: LabelSize::Proportional,
                edge_label_size_ratio: 1.0,
                edge_label_threshold: 6.0,
                ..PlotterConfig::default()
            },
            100.0,
            100.0,
        );
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::EdgeLabels, &graph, &mut painter).unwrap();

        assert_eq!(
            painter.calls,
            vec![Call::EdgeLabel("thick".into(), EdgeShape::Line, 8.0)]
        );
    }

    #[test]
    fn proportional_node_labels_scale_with_display_size() {
        let mut graph = line_of_nodes(1);
        graph.iter_nodes(|node| node.display_size = 7.0);
        let mut plotter = Plotter::new(
            PlotterConfig {
                label_size: LabelSize::Proportional,
                label_size_ratio: 2.0,
                ..PlotterConfig::default()
            },
            100.0,
            100.0,
        );
        let mut painter = RecordingPainter::default();

        plotter.task(Layer::Labels, &graph, &mut painter).unwrap();

        assert_eq!(painter.calls, vec![Call::Label("n0".into(), 14.0)]);
    }

    #[test]
    fn non_finite_coordinates_are_an_error() {
        let mut graph = GraphStore::new();
        graph.add_node("bad", &params(json!({ "x": "not a number" }))).unwrap();
        let mut plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        let error = plotter.task(Layer::Nodes, &graph, &mut painter).unwrap_err();

        assert_eq!(error, Error::InvalidGeometry { id: "bad".into() });
        assert!(!error.is_contract_violation());
    }

    #[test]
    fn active_overlay_only_covers_visible_nodes() {
        let mut graph = GraphStore::new();
        graph.add_node("on", &params(json!({ "x": 10, "y": 10, "active": true }))).unwrap();
        graph.add_node("off", &params(json!({ "x": 900, "y": 10, "active": true }))).unwrap();
        graph.add_node("idle", &params(json!({ "x": 10, "y": 10 }))).unwrap();
        graph.rescale(100.0, 100.0, true, true);
        let plotter = plotter_with_speed(10);
        let mut painter = RecordingPainter::default();

        plotter.draw_active_nodes(&graph, &mut painter).unwrap();

        assert_eq!(painter.calls, vec![Call::ActiveNode("on".into())]);
    }
}
