use eframe::egui::{self, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use nodescope::{DrawMode, EdgeShape, LabelSize};

use super::super::ViewModel;

const DRAW_MODES: [DrawMode; 4] = [
    DrawMode::Keep,
    DrawMode::Skip,
    DrawMode::Progressive,
    DrawMode::Direct,
];

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn mode_name(mode: DrawMode) -> &'static str {
    match mode {
        DrawMode::Keep => "keep",
        DrawMode::Skip => "skip",
        DrawMode::Progressive => "progressive",
        DrawMode::Direct => "direct",
    }
}

fn draw_mode_combo(ui: &mut Ui, label: &str, intensity: &mut i32) -> bool {
    let mut mode = DrawMode::from_intensity(*intensity);
    let before = mode;

    egui::ComboBox::from_label(label)
        .selected_text(mode_name(mode))
        .show_ui(ui, |ui| {
            for candidate in DRAW_MODES {
                ui.selectable_value(&mut mode, candidate, mode_name(candidate));
            }
        });

    *intensity = mode.as_intensity();
    mode != before
}

fn label_size_choice(ui: &mut Ui, label: &str, size: &mut LabelSize) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let fixed = ui.selectable_value(size, LabelSize::Fixed, "fixed").changed();
        let proportional = ui
            .selectable_value(size, LabelSize::Proportional, "proportional")
            .on_hover_text("Scale the font with the item's display size.")
            .changed();
        fixed || proportional
    })
    .inner
}

fn speed_slider(ui: &mut Ui, value: &mut usize, text: &str) -> bool {
    ui.add(
        egui::Slider::new(value, 1..=2000)
            .logarithmic(true)
            .text(text),
    )
    .on_hover_text("Items drawn per scheduler tick.")
    .changed()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search labels")
            .on_hover_text("Fuzzy-match node labels and ids; matches are marked active.");
        if ui.text_edit_singleline(&mut self.search).changed() {
            self.apply_search();
        }
        if !self.search.trim().is_empty() {
            ui.small(format!("{} matching nodes", self.search_matches));
        }

        ui.separator();

        ui.horizontal(|ui| {
            if self.layout.is_some() {
                if ui.button("Stop layout").clicked() {
                    self.stop_layout();
                }
            } else if ui.button("Start layout").clicked() {
                self.start_layout();
            }

            if ui
                .button("Redraw")
                .on_hover_text("Run a full draw cycle with the configured layer modes.")
                .clicked()
            {
                let result = self.sigma.redraw(&mut self.canvas).map(|_| ());
                self.record(result);
            }
        });
        if let Some(layout) = &self.layout {
            ui.small(format!(
                "layout: {} iterations, temperature {:.2}",
                layout.iterations(),
                layout.temperature()
            ));
        }

        ui.separator();

        let mut changed = false;
        let settings = &mut self.settings;

        ui.collapsing("Draw modes", |ui| {
            changed |= ui
                .checkbox(&mut settings.view.auto, "Automatic modes while interacting")
                .on_hover_text("Drop edges while dragging or zooming and redraw them afterwards.")
                .changed();
            changed |= draw_mode_combo(ui, "Nodes", &mut settings.view.draw_nodes);
            changed |= draw_mode_combo(ui, "Edges", &mut settings.view.draw_edges);
            changed |= draw_mode_combo(ui, "Labels", &mut settings.view.draw_labels);
            changed |= draw_mode_combo(ui, "Edge labels", &mut settings.view.draw_edge_labels);

            ui.add_space(4.0);
            changed |= ui
                .checkbox(&mut settings.view.draw_hover_nodes, "Hover nodes")
                .changed();
            changed |= ui
                .checkbox(&mut settings.view.draw_hover_edges, "Hover edges")
                .on_hover_text("Disabled automatically while a layout runs.")
                .changed();
            changed |= ui
                .checkbox(&mut settings.view.draw_active_nodes, "Active nodes")
                .changed();
        });

        ui.collapsing("Progressive speeds", |ui| {
            changed |= speed_slider(ui, &mut settings.plotter.nodes_speed, "Nodes");
            changed |= speed_slider(ui, &mut settings.plotter.edges_speed, "Edges");
            changed |= speed_slider(ui, &mut settings.plotter.labels_speed, "Labels");
            changed |= speed_slider(ui, &mut settings.plotter.edge_labels_speed, "Edge labels");
        });

        ui.collapsing("Labels", |ui| {
            let plotter = &mut settings.plotter;
            changed |= ui
                .add(egui::Slider::new(&mut plotter.label_threshold, 0.0..=30.0).text("Label threshold"))
                .on_hover_text("Nodes with a smaller display size get no label.")
                .changed();
            changed |= label_size_choice(ui, "Label sizing", &mut plotter.label_size);
            if plotter.label_size == LabelSize::Proportional {
                changed |= ui
                    .add(egui::Slider::new(&mut plotter.label_size_ratio, 0.1..=6.0).text("Label size ratio"))
                    .changed();
            } else {
                changed |= ui
                    .add(egui::Slider::new(&mut plotter.default_label_size, 6.0..=32.0).text("Label size"))
                    .changed();
            }
            changed |= ui
                .add(
                    egui::Slider::new(&mut plotter.edge_label_threshold, 0.0..=30.0)
                        .text("Edge label threshold"),
                )
                .on_hover_text("Edge labels are drawn only when their size reaches this value.")
                .changed();
            changed |= label_size_choice(ui, "Edge label sizing", &mut plotter.edge_label_size);
            if plotter.edge_label_size == LabelSize::Proportional {
                changed |= ui
                    .add(
                        egui::Slider::new(&mut plotter.edge_label_size_ratio, 0.1..=12.0)
                            .text("Edge label size ratio"),
                    )
                    .changed();
            } else {
                changed |= ui
                    .add(
                        egui::Slider::new(&mut plotter.default_edge_label_size, 6.0..=32.0)
                            .text("Edge label size"),
                    )
                    .changed();
            }

            ui.horizontal(|ui| {
                ui.label("Default edge type");
                changed |= ui
                    .selectable_value(&mut plotter.default_edge_type, EdgeShape::Line, "line")
                    .changed();
                changed |= ui
                    .selectable_value(&mut plotter.default_edge_type, EdgeShape::Curve, "curve")
                    .changed();
            });
        });

        ui.collapsing("Sizing", |ui| {
            let sizing = &mut settings.graph;
            ui.small("Both bounds at 0 keep the stored sizes.");
            changed |= ui
                .add(egui::Slider::new(&mut sizing.min_node_size, 0.0..=400.0).text("Min node size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut sizing.max_node_size, 0.0..=1200.0).text("Max node size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut sizing.min_edge_size, 0.0..=8.0).text("Min edge size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut sizing.max_edge_size, 0.0..=8.0).text("Max edge size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut sizing.nodes_pow_ratio, 0.0..=1.0).text("Node zoom exponent"))
                .on_hover_text("How strongly zooming scales node sizes.")
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut sizing.edges_pow_ratio, 0.0..=1.0).text("Edge zoom exponent"))
                .changed();
        });

        if changed {
            log::debug!("settings changed: {:?}", self.settings);
            self.sigma.apply_settings(&self.settings);
            let result = self.sigma.redraw(&mut self.canvas).map(|_| ());
            self.record(result);
        }

        ui.collapsing("FPS display", |ui| {
            ui.checkbox(&mut self.show_fps_bar, "Show FPS in the header");
            ui.add_enabled_ui(self.show_fps_bar, |ui| {
                ui.checkbox(&mut self.fps_show_average, "Show average FPS");
                ui.checkbox(&mut self.fps_show_frame_time, "Show frame time");
            });
        });
    }

    fn apply_search(&mut self) {
        let query = self.search.trim().to_owned();
        let matcher = SkimMatcherV2::default();
        let mut matches = 0;

        self.sigma.graph_mut().iter_nodes(|node| {
            node.active = !query.is_empty()
                && (fuzzy_match_score(&matcher, &node.label, &query).is_some()
                    || fuzzy_match_score(&matcher, &node.id, &query).is_some());
            if node.active {
                matches += 1;
            }
        });

        self.search_matches = matches;
        let result = self.sigma.refresh(&mut self.canvas);
        self.record(result);
    }
}
