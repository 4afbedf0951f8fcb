use std::time::{Duration, Instant};

use eframe::egui::{Color32, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};
use nodescope::{Camera, DrawRequest, Targeted};

use crate::layout::{ForceLayout, LAYOUT_GENERATOR};

use super::super::ViewModel;

/// Time spent on progressive layer ticks per frame.
const TICK_BUDGET: Duration = Duration::from_millis(8);

fn draw_background(painter: &Painter, rect: Rect, camera: Camera) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * (camera.ratio as f32).clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + vec2(camera.stage_x as f32, camera.stage_y as f32);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let (width, height) = (rect.width() as f64, rect.height() as f64);

        let resized = self.sigma.resize(width, height, &mut self.canvas).map(|_| ());
        self.record(resized);
        if !self.camera_fitted {
            self.fit_camera(width, height);
            self.camera_fitted = true;
            let result = self.sigma.redraw(&mut self.canvas).map(|_| ());
            self.record(result);
        }

        let moved = self.handle_pointer(ui, rect);
        let dragged_nodes = self.handle_node_drag(&response);
        let zoomed = self.handle_graph_zoom(ui, rect, &response);
        let panned = self.handle_graph_pan(&response);

        if zoomed || panned {
            let request = DrawRequest::interacting(self.sigma.view());
            let result = self.sigma.draw(request, true, &mut self.canvas).map(|_| ());
            self.record(result);
        } else if moved && !dragged_nodes {
            let result = self.sigma.refresh(&mut self.canvas);
            self.record(result);
        }

        if response.clicked() {
            self.selected = match self.sigma.targeted() {
                Targeted::Nodes(ids) => ids.into_iter().next(),
                Targeted::Edges(_) | Targeted::Nothing => None,
            };
        }

        if zoomed || panned || dragged_nodes {
            self.interacting = true;
            self.camera_moved |= zoomed || panned;
        } else if self.interacting && !response.dragged() && self.layout.is_none() {
            self.interacting = false;
            let request = if std::mem::take(&mut self.camera_moved) {
                DrawRequest::stopped_drag(self.sigma.view())
            } else {
                DrawRequest::settled(self.sigma.view())
            };
            let result = self.sigma.draw(request, false, &mut self.canvas).map(|_| ());
            self.record(result);
        }

        self.step_layout();
        let pending = self.run_ticks();

        draw_background(&painter, rect, self.sigma.camera());
        self.canvas.paint(&painter, rect.min.to_vec2());

        if pending || self.interacting || self.layout.is_some() {
            ui.ctx().request_repaint();
        }
    }

    /// Runs scheduler ticks until idle or out of budget. Returns whether work
    /// remains.
    fn run_ticks(&mut self) -> bool {
        let started = Instant::now();
        loop {
            match self.sigma.tick(&mut self.canvas) {
                Ok(true) if started.elapsed() < TICK_BUDGET => {}
                Ok(more) => return more,
                Err(error) => {
                    self.record(Err(error));
                    self.sigma.clear_schedule();
                    return false;
                }
            }
        }
    }

    fn step_layout(&mut self) {
        let running = match self.layout.as_mut() {
            Some(layout) => layout.step(self.sigma.graph_mut()),
            None => return,
        };

        if running {
            let request = DrawRequest::interacting(self.sigma.view());
            let result = self.sigma.draw(request, false, &mut self.canvas).map(|_| ());
            self.record(result);
        } else {
            self.stop_layout();
        }
    }

    pub(in crate::app) fn start_layout(&mut self) {
        if self.layout.is_some() {
            return;
        }

        self.layout = Some(ForceLayout::new(self.sigma.graph()));
        let result = self
            .sigma
            .start_generator(LAYOUT_GENERATOR, &mut self.canvas)
            .map(|_| ());
        self.record(result);
    }

    pub(in crate::app) fn stop_layout(&mut self) {
        let Some(layout) = self.layout.take() else {
            return;
        };

        log::info!(
            "layout stopped after {} iterations (temperature {:.3})",
            layout.iterations(),
            layout.temperature()
        );
        self.interacting = false;
        self.camera_moved = false;
        let result = self
            .sigma
            .stop_generator(LAYOUT_GENERATOR, &mut self.canvas)
            .map(|_| ());
        self.record(result);
    }
}
