use eframe::egui::{self, RichText, Ui};
use nodescope::{Layer, Node, Targeted};

use super::super::ViewModel;

fn node_rows(ui: &mut Ui, node: &Node) {
    ui.label(RichText::new(&node.label).strong());
    ui.small(node.id.as_str());
    ui.add_space(4.0);

    ui.label(format!("position: ({:.1}, {:.1})", node.x, node.y));
    ui.label(format!(
        "display: ({:.1}, {:.1}) r {:.2}",
        node.display_x, node.display_y, node.display_size
    ));
    ui.label(format!("size: {:.2}", node.size));
    ui.label(format!(
        "degree: {} (in {}, out {})",
        node.degree, node.in_degree, node.out_degree
    ));
    if let Some(color) = &node.color {
        ui.label(format!("color: {color}"));
    }
    if !node.attr.is_empty() {
        let attr = serde_json::to_string_pretty(&node.attr).unwrap_or_default();
        ui.collapsing("attributes", |ui| ui.monospace(attr));
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        match self.sigma.targeted() {
            Targeted::Nodes(ids) => {
                ui.label(format!("hovered nodes: {}", ids.join(", ")));
            }
            Targeted::Edges(ids) => {
                ui.label(format!("hovered edges: {}", ids.join(", ")));
                for id in &ids {
                    if let Some(edge) = self.sigma.graph().edge_ref(id) {
                        ui.small(format!(
                            "{} -> {} ({}, size {:.2})",
                            edge.source,
                            edge.target,
                            edge.kind.as_deref().unwrap_or("default"),
                            edge.display_size
                        ));
                    }
                }
            }
            Targeted::Nothing => {
                ui.label("Hover a node, click it to select.");
            }
        }

        ui.separator();
        self.draw_selection(ui);

        ui.separator();
        ui.collapsing("Draw state", |ui| {
            let camera = self.sigma.camera();
            ui.label(format!(
                "camera: stage ({:.0}, {:.0}) ratio {:.3}",
                camera.stage_x, camera.stage_y, camera.ratio
            ));
            match self.sigma.graph().borders() {
                Some(borders) => ui.label(format!(
                    "borders: x {:.0}..{:.0}, y {:.0}..{:.0}",
                    borders.min_x, borders.max_x, borders.min_y, borders.max_y
                )),
                None => ui.label("borders: none"),
            };
            if let Some(request) = self.sigma.last_request() {
                ui.label(format!(
                    "last draw: nodes {:?}, edges {:?}, labels {:?}, edge labels {:?}",
                    request.nodes, request.edges, request.labels, request.edge_labels
                ));
            }

            let scheduler = self.sigma.scheduler();
            ui.label(format!("scheduled tasks: {}", scheduler.len()));
            let generators = scheduler.generator_ids().collect::<Vec<_>>();
            if !generators.is_empty() {
                ui.label(format!("generators: {}", generators.join(", ")));
            }

            egui::Grid::new("layer_state").striped(true).show(ui, |ui| {
                ui.strong("layer");
                ui.strong("cursor");
                ui.strong("shapes");
                ui.end_row();
                for layer in Layer::ALL {
                    ui.label(layer.name());
                    ui.label(self.sigma.plotter().cursor(layer).to_string());
                    ui.label(self.canvas.primitive_count(layer).to_string());
                    ui.end_row();
                }
            });
        });

        ui.collapsing("Events", |ui| {
            let mut enabled = self.event_subscription.is_some();
            if ui.checkbox(&mut enabled, "Record hover events").changed() {
                self.set_event_feed(enabled);
            }
            for line in self.recent_events() {
                ui.small(line);
            }
        });

        if let Some(error) = self.last_error.clone() {
            ui.separator();
            ui.colored_label(egui::Color32::LIGHT_RED, error);
            if ui.button("Dismiss").clicked() {
                self.last_error = None;
            }
        }
    }

    fn draw_selection(&mut self, ui: &mut Ui) {
        let Some(selected) = self.selected.clone() else {
            ui.label("No node selected.");
            return;
        };

        let Some(node) = self.sigma.graph().node(&selected) else {
            self.selected = None;
            return;
        };

        node_rows(ui, &node);
        ui.add_space(4.0);

        let mut fixed = node.fixed;
        let mut force_label = node.force_label;
        let mut changed = ui
            .checkbox(&mut fixed, "Fixed")
            .on_hover_text("Fixed nodes keep their display position and ignore the layout.")
            .changed();
        changed |= ui.checkbox(&mut force_label, "Always show label").changed();
        if changed {
            self.sigma
                .graph_mut()
                .iter_nodes_by_id([selected.as_str()], |node| {
                    node.fixed = fixed;
                    node.force_label = force_label;
                });
            let result = self.sigma.redraw(&mut self.canvas).map(|_| ());
            self.record(result);
        }

        if ui.button("Remove node").clicked() {
            let removed = self.sigma.graph_mut().drop_node([selected.as_str()]);
            log::info!("removed node {selected} ({removed} dropped)");
            self.selected = None;
            let result = self.sigma.redraw(&mut self.canvas).map(|_| ());
            self.record(result);
        }
    }
}
