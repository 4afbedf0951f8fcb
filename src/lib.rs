//! In-memory graph store with a zoomable display transform, pointer hit
//! testing and a cooperative per-layer drawing schedule.

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod graph;
pub mod plotter;
pub mod scheduler;
pub mod sigma;

pub use config::{LabelSize, PlotterConfig, Settings, SizingConfig, ViewConfig};
pub use error::{EndpointRole, Error, Result};
pub use events::{EventBus, GraphEvent, SubscriberId};
pub use graph::{Borders, Edge, EdgeShape, GraphStore, Node, Params};
pub use plotter::{Layer, LayerPainter, Plotter};
pub use scheduler::Scheduler;
pub use sigma::{Camera, DrawMode, DrawRequest, Sigma, Targeted};
