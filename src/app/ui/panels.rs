use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout};
use nodescope::{Settings, Sigma};

use super::super::canvas::LayerCanvas;
use super::super::demo::{self, DemoGraph};
use super::super::ViewModel;

const RECENT_EVENT_LIMIT: usize = 12;

impl ViewModel {
    pub(in crate::app) fn new(demo: &DemoGraph, settings: Settings) -> nodescope::Result<Self> {
        // The viewport size is unknown until the first frame lays out the
        // central panel; `draw_graph` resizes before anything is painted.
        let mut sigma = Sigma::new(&settings, 0.0, 0.0);
        demo::populate(&mut sigma, demo)?;

        let mut model = Self {
            sigma,
            canvas: LayerCanvas::default(),
            settings,
            search: String::new(),
            search_matches: 0,
            selected: None,
            layout: None,
            dragging: Vec::new(),
            interacting: false,
            camera_moved: false,
            camera_fitted: false,
            last_error: None,
            recent_events: Rc::new(RefCell::new(VecDeque::new())),
            event_subscription: None,
            show_fps_bar: true,
            fps_show_average: true,
            fps_show_frame_time: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };
        model.set_event_feed(true);
        Ok(model)
    }

    /// Subscribes or unsubscribes the details panel event feed.
    pub(in crate::app) fn set_event_feed(&mut self, enabled: bool) {
        match (enabled, self.event_subscription) {
            (true, None) => {
                let sink = Rc::clone(&self.recent_events);
                let id = self.sigma.subscribe(move |event| {
                    if event.ids().is_empty() {
                        log::trace!("{}", event.name());
                        return;
                    }
                    let line = format!("{} {}", event.name(), event.ids().join(", "));
                    log::debug!("{line}");

                    let mut recent = sink.borrow_mut();
                    recent.push_front(line);
                    recent.truncate(RECENT_EVENT_LIMIT);
                });
                self.event_subscription = Some(id);
            }
            (false, Some(id)) => {
                self.sigma.unsubscribe(id);
                self.event_subscription = None;
                self.recent_events.borrow_mut().clear();
            }
            _ => {}
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("nodescope");
                    ui.separator();
                    ui.label(format!("nodes: {}", self.sigma.graph().node_count()));
                    ui.label(format!("edges: {}", self.sigma.graph().edge_count()));
                    let regenerate =
                        ui.add_enabled(!is_loading, egui::Button::new("Regenerate graph"));
                    if regenerate.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Fit view").clicked() {
                        self.camera_fitted = false;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.pending_work_text());
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    /// Stores the error for the details panel. Draw failures never abort the
    /// frame.
    pub(in crate::app) fn record(&mut self, result: nodescope::Result<()>) {
        if let Err(error) = result {
            log::error!("draw failed: {error}");
            self.last_error = Some(error.to_string());
        }
    }

    pub(in crate::app) fn recent_events(&self) -> Vec<String> {
        self.recent_events.borrow().iter().cloned().collect()
    }
}
