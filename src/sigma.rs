//! One graph view: store, plotter, scheduler and camera wired into the draw
//! cycle.

use crate::config::{Settings, ViewConfig};
use crate::error::Result;
use crate::events::{GraphEvent, SubscriberId};
use crate::geometry::Point;
use crate::graph::GraphStore;
use crate::plotter::{Layer, LayerPainter, Plotter};
use crate::scheduler::Scheduler;

/// How a layer is handled by one draw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Not redrawn and not cleared.
    Keep,
    /// Cleared and left empty.
    Skip,
    /// Drawn a chunk per scheduler tick.
    Progressive,
    /// Drawn completely before `draw` returns.
    Direct,
}

impl DrawMode {
    pub fn from_intensity(intensity: i32) -> Self {
        match intensity {
            i32::MIN..=-1 => Self::Keep,
            0 => Self::Skip,
            1 => Self::Progressive,
            _ => Self::Direct,
        }
    }

    pub fn as_intensity(self) -> i32 {
        match self {
            Self::Keep => -1,
            Self::Skip => 0,
            Self::Progressive => 1,
            Self::Direct => 2,
        }
    }

    /// Whether the layer surface is cleared at the start of the draw.
    pub fn clears(self) -> bool {
        self != Self::Keep
    }

    /// Whether display values for this layer are recomputed.
    pub fn draws(self) -> bool {
        matches!(self, Self::Progressive | Self::Direct)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRequest {
    pub nodes: DrawMode,
    pub edges: DrawMode,
    pub labels: DrawMode,
    pub edge_labels: DrawMode,
}

impl DrawRequest {
    pub fn new(nodes: DrawMode, edges: DrawMode, labels: DrawMode, edge_labels: DrawMode) -> Self {
        Self {
            nodes,
            edges,
            labels,
            edge_labels,
        }
    }

    pub fn from_config(view: &ViewConfig) -> Self {
        Self::new(
            DrawMode::from_intensity(view.draw_nodes),
            DrawMode::from_intensity(view.draw_edges),
            DrawMode::from_intensity(view.draw_labels),
            DrawMode::from_intensity(view.draw_edge_labels),
        )
    }

    /// Used while the user drags or a layout runs: with `auto`, nodes and
    /// labels are redrawn at once and edges are dropped.
    pub fn interacting(view: &ViewConfig) -> Self {
        if view.auto {
            Self::new(DrawMode::Direct, DrawMode::Skip, DrawMode::Direct, DrawMode::Skip)
        } else {
            Self::from_config(view)
        }
    }

    /// Used once an interaction ends: with `auto`, nodes and labels are kept
    /// and edges are brought back progressively.
    pub fn settled(view: &ViewConfig) -> Self {
        if view.auto {
            Self::new(DrawMode::Keep, DrawMode::Progressive, DrawMode::Keep, DrawMode::Progressive)
        } else {
            Self::from_config(view)
        }
    }

    /// Used when a camera drag or zoom ends: with `auto`, nodes and labels
    /// are redrawn at once and edges come back progressively.
    pub fn stopped_drag(view: &ViewConfig) -> Self {
        if view.auto {
            Self::new(
                DrawMode::Direct,
                DrawMode::Progressive,
                DrawMode::Direct,
                DrawMode::Progressive,
            )
        } else {
            Self::from_config(view)
        }
    }

    pub fn mode(&self, layer: Layer) -> DrawMode {
        match layer {
            Layer::Nodes => self.nodes,
            Layer::Edges => self.edges,
            Layer::Labels => self.labels,
            Layer::EdgeLabels => self.edge_labels,
        }
    }
}

/// Pan and zoom applied by `translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub stage_x: f64,
    pub stage_y: f64,
    pub ratio: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            stage_x: 0.0,
            stage_y: 0.0,
            ratio: 1.0,
        }
    }
}

/// Records under the pointer, nodes first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Targeted {
    Nodes(Vec<String>),
    Edges(Vec<String>),
    Nothing,
}

/// Order in which layers are scheduled by a draw request.
const DRAW_ORDER: [Layer; 4] = [Layer::EdgeLabels, Layer::Nodes, Layer::Labels, Layer::Edges];

#[derive(Debug)]
pub struct Sigma {
    graph: GraphStore,
    plotter: Plotter,
    scheduler: Scheduler<Layer>,
    view: ViewConfig,
    camera: Camera,
    pointer: Point,
    width: f64,
    height: f64,
    last_request: Option<DrawRequest>,
    /// `draw_hover_edges` as it was before a generator disabled it.
    saved_hover_edges: Option<bool>,
}

impl Sigma {
    pub fn new(settings: &Settings, width: f64, height: f64) -> Self {
        Self {
            graph: GraphStore::with_sizing(settings.graph),
            plotter: Plotter::new(settings.plotter, width, height),
            scheduler: Scheduler::new(),
            view: settings.view,
            camera: Camera::default(),
            pointer: Point::default(),
            width,
            height,
            last_request: None,
            saved_hover_edges: None,
        }
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut GraphStore {
        &mut self.graph
    }

    pub fn plotter(&self) -> &Plotter {
        &self.plotter
    }

    pub fn scheduler(&self) -> &Scheduler<Layer> {
        &self.scheduler
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn last_request(&self) -> Option<DrawRequest> {
        self.last_request
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GraphEvent) + 'static) -> SubscriberId {
        self.graph.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.graph.unsubscribe(id)
    }

    /// Replaces sizing, quotas and view switches. Takes effect on the next draw.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.graph.set_sizing(settings.graph);
        self.plotter.set_config(settings.plotter);
        self.view = settings.view;
        if self.saved_hover_edges.is_some() {
            self.saved_hover_edges = Some(self.view.draw_hover_edges);
            self.view.draw_hover_edges = false;
        }
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Pointer position in display space.
    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Point::new(x, y);
    }

    /// Starts a draw cycle. Returns `false` when `safe` is set and a generator
    /// is running, in which case nothing is touched.
    pub fn draw(
        &mut self,
        request: DrawRequest,
        safe: bool,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool> {
        if safe && self.scheduler.has_generators() {
            log::trace!("draw skipped: generators running");
            return Ok(false);
        }

        self.last_request = Some(request);
        self.clear_schedule();

        let do_nodes = request.nodes.draws();
        let do_edges = request.edges.draws();
        self.graph
            .rescale(self.width, self.height, do_nodes, do_edges)
            .set_borders();
        self.graph.translate(
            self.camera.stage_x,
            self.camera.stage_y,
            self.camera.ratio,
            do_nodes,
            do_edges,
        );
        self.graph.dispatch(GraphEvent::GraphScaled);

        for layer in Layer::ALL {
            if request.mode(layer).clears() {
                painter.clear_layer(layer);
            }
        }
        painter.clear_hover();
        self.plotter.reset_cursors();

        let mut previous = None;
        for layer in DRAW_ORDER {
            match request.mode(layer) {
                DrawMode::Direct => {
                    while self.plotter.task(layer, &self.graph, painter)? {}
                }
                DrawMode::Progressive => {
                    match previous {
                        Some(after) if layer != Layer::Nodes => {
                            self.scheduler.queue_task(layer, after)
                        }
                        _ => self.scheduler.add_task(layer),
                    }
                    previous = Some(layer);
                }
                DrawMode::Keep | DrawMode::Skip => {}
            }
        }
        log::debug!(
            "draw {:?}: {} progressive layers scheduled",
            request,
            self.scheduler.len()
        );

        self.graph.dispatch(GraphEvent::Drawn);
        self.refresh(painter)?;
        Ok(true)
    }

    /// Redraws with the view's configured modes.
    pub fn redraw(&mut self, painter: &mut dyn LayerPainter) -> Result<bool> {
        self.draw(DrawRequest::from_config(&self.view), false, painter)
    }

    /// Removes every pending layer task.
    pub fn clear_schedule(&mut self) {
        self.scheduler.clear();
    }

    /// Advances the progressive layers by one step. Returns whether work
    /// remains.
    pub fn tick(&mut self, painter: &mut dyn LayerPainter) -> Result<bool> {
        let Self {
            scheduler,
            plotter,
            graph,
            ..
        } = self;
        scheduler.tick(|layer| plotter.task(*layer, graph, painter))
    }

    /// Reruns the hover pass at the current pointer and repaints the hover
    /// and active overlays.
    pub fn refresh(&mut self, painter: &mut dyn LayerPainter) -> Result<()> {
        painter.clear_hover();

        if self.view.draw_hover_nodes {
            self.graph.check_hover(self.pointer.x, self.pointer.y);
        }

        if self.view.draw_hover_edges {
            self.graph.check_hover_edge(
                self.pointer.x,
                self.pointer.y,
                self.camera.ratio,
                self.plotter.config().default_edge_type,
            );
            self.plotter.draw_hover_edges(&self.graph, painter);
        }

        if self.view.draw_hover_nodes {
            self.plotter.draw_hover_nodes(&self.graph, painter);
        }

        if self.view.draw_active_nodes {
            self.plotter.draw_active_nodes(&self.graph, painter)?;
        }

        Ok(())
    }

    /// Applies a new viewport size and redraws with the last request when it
    /// changed.
    pub fn resize(&mut self, width: f64, height: f64, painter: &mut dyn LayerPainter) -> Result<bool> {
        if width == self.width && height == self.height {
            return Ok(false);
        }

        self.width = width;
        self.height = height;
        self.plotter.resize(width, height);

        let request = self
            .last_request
            .unwrap_or_else(|| DrawRequest::from_config(&self.view));
        self.draw(request, true, painter)
    }

    /// Registers a generator (an iterative layout, for example). While any
    /// generator runs, edge hover is disabled and safe draws are refused.
    pub fn start_generator(&mut self, id: &str, painter: &mut dyn LayerPainter) -> Result<bool> {
        if !self.scheduler.start_generator(id) {
            return Ok(false);
        }
        log::debug!("generator \"{id}\" started");

        if self.saved_hover_edges.is_none() {
            self.saved_hover_edges = Some(self.view.draw_hover_edges);
            self.view.draw_hover_edges = false;
            self.graph.reset_edge_hover();
        }

        self.draw(DrawRequest::interacting(&self.view), false, painter)?;
        Ok(true)
    }

    pub fn stop_generator(&mut self, id: &str, painter: &mut dyn LayerPainter) -> Result<bool> {
        if !self.scheduler.stop_generator(id) {
            return Ok(false);
        }
        log::debug!("generator \"{id}\" stopped");

        if !self.scheduler.has_generators() {
            if let Some(saved) = self.saved_hover_edges.take() {
                self.view.draw_hover_edges = saved;
            }
        }

        self.redraw(painter)?;
        Ok(true)
    }

    pub fn generators_running(&self) -> bool {
        self.scheduler.has_generators()
    }

    /// Moves the given nodes by a screen-space delta and redraws in
    /// interaction mode.
    pub fn drag_nodes<I, S>(
        &mut self,
        ids: I,
        dx: f64,
        dy: f64,
        painter: &mut dyn LayerPainter,
    ) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Camera {
            stage_x,
            stage_y,
            ratio,
        } = self.camera;
        self.graph
            .translate_nodes(ids, dx, dy, stage_x, stage_y, ratio);
        painter.clear_hover();
        self.draw(DrawRequest::interacting(&self.view), false, painter)
    }

    pub fn targeted(&self) -> Targeted {
        let nodes = self
            .graph
            .hovered_nodes()
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();
        if !nodes.is_empty() {
            return Targeted::Nodes(nodes);
        }

        let edges = self
            .graph
            .hovered_edges()
            .map(|edge| edge.id.clone())
            .collect::<Vec<_>>();
        if !edges.is_empty() {
            return Targeted::Edges(edges);
        }

        Targeted::Nothing
    }
}
