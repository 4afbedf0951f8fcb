use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use nodescope::{Settings, Sigma, SubscriberId};

use crate::layout::ForceLayout;

use self::canvas::LayerCanvas;
use self::demo::DemoGraph;

mod canvas;
mod demo;
mod graph;
mod ui;

pub use demo::DemoOptions;

pub struct GraphViewerApp {
    demo: DemoOptions,
    settings: Settings,
    state: AppState,
    reload_rx: Option<Receiver<DemoGraph>>,
}

enum AppState {
    Loading { rx: Receiver<DemoGraph> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    sigma: Sigma,
    canvas: LayerCanvas,
    settings: Settings,
    search: String,
    search_matches: usize,
    selected: Option<String>,
    layout: Option<ForceLayout>,
    dragging: Vec<String>,
    interacting: bool,
    /// Set when the current interaction moved the camera.
    camera_moved: bool,
    camera_fitted: bool,
    last_error: Option<String>,
    recent_events: Rc<RefCell<VecDeque<String>>>,
    event_subscription: Option<SubscriberId>,
    show_fps_bar: bool,
    fps_show_average: bool,
    fps_show_frame_time: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl GraphViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, demo: DemoOptions, settings: Settings) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(demo.clone()),
        };
        Self {
            demo,
            settings,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(options: DemoOptions) -> Receiver<DemoGraph> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let _ = tx.send(demo::generate(&options));
        });

        rx
    }

    fn ready(&self, demo: DemoGraph) -> AppState {
        match ViewModel::new(&demo, self.settings) {
            Ok(model) => AppState::Ready(Box::new(model)),
            Err(error) => {
                log::error!("failed to load generated graph: {error}");
                AppState::Error(error.to_string())
            }
        }
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(demo) => transition = Some(Ok(demo)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("graph generator disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Generating graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        self.reload_rx = Some(Self::spawn_load(self.demo.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.settings = model.settings;
                    self.reload_rx = Some(Self::spawn_load(self.demo.clone()));
                }
            }
        }

        if let Some(rx) = self.reload_rx.take() {
            match rx.try_recv() {
                Ok(demo) => transition = Some(Ok(demo)),
                Err(TryRecvError::Empty) => {
                    self.reload_rx = Some(rx);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Disconnected) => {
                    transition = Some(Err("graph generator disconnected".to_owned()));
                }
            }
        }

        if let Some(next) = transition {
            self.reload_rx = None;
            self.state = match next {
                Ok(demo) => self.ready(demo),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
