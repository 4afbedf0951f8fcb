use eframe::egui::{self, PointerButton, Pos2, Rect, Ui, Vec2};
use nodescope::{Camera, Targeted};

use super::super::ViewModel;

const ZOOM_MIN: f64 = 0.02;
const ZOOM_MAX: f64 = 40.0;

/// Pointer position used while the cursor is outside the canvas.
const OFFSCREEN: f64 = -1.0e9;

fn canvas_point(rect: Rect, position: Pos2) -> (f64, f64) {
    (
        (position.x - rect.min.x) as f64,
        (position.y - rect.min.y) as f64,
    )
}

/// Zooms about `(x, y)` in canvas space, keeping the logical point under it
/// in place.
fn zoom_about(camera: Camera, x: f64, y: f64, factor: f64) -> Camera {
    let world_x = (x - camera.stage_x) / camera.ratio;
    let world_y = (y - camera.stage_y) / camera.ratio;
    let ratio = (camera.ratio * factor).clamp(ZOOM_MIN, ZOOM_MAX);

    Camera {
        stage_x: x - world_x * ratio,
        stage_y: y - world_y * ratio,
        ratio,
    }
}

impl ViewModel {
    /// Returns whether the camera changed.
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) -> bool {
        if !response.hovered() {
            return false;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return false;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let (x, y) = canvas_point(rect, pointer);
        let factor = (1.0 + (scroll as f64 * 0.0018)).clamp(0.85, 1.15);
        self.sigma
            .set_camera(zoom_about(self.sigma.camera(), x, y, factor));
        true
    }

    /// Secondary and middle drags always pan; a primary drag pans unless it
    /// grabbed a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) -> bool {
        let panning = response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
            || (response.dragged_by(PointerButton::Primary) && self.dragging.is_empty());
        let delta = response.drag_delta();
        if !panning || delta == Vec2::ZERO {
            return false;
        }

        let mut camera = self.sigma.camera();
        camera.stage_x += delta.x as f64;
        camera.stage_y += delta.y as f64;
        self.sigma.set_camera(camera);
        true
    }

    /// Returns whether hovered nodes were moved this frame.
    pub(in crate::app) fn handle_node_drag(&mut self, response: &egui::Response) -> bool {
        if response.drag_started_by(PointerButton::Primary) {
            if let Targeted::Nodes(ids) = self.sigma.targeted() {
                log::debug!("dragging {}", ids.join(", "));
                self.dragging = ids;
            }
        }

        if response.drag_stopped() {
            self.dragging.clear();
            return false;
        }

        let delta = response.drag_delta();
        if self.dragging.is_empty() || delta == Vec2::ZERO {
            return false;
        }

        let result = self
            .sigma
            .drag_nodes(
                &self.dragging,
                delta.x as f64,
                delta.y as f64,
                &mut self.canvas,
            )
            .map(|_| ());
        self.record(result);
        true
    }

    /// Feeds the pointer to the hover pass. Returns whether it moved.
    pub(in crate::app) fn handle_pointer(&mut self, ui: &Ui, rect: Rect) -> bool {
        let (x, y) = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|position| rect.contains(*position))
            .map(|position| canvas_point(rect, position))
            .unwrap_or((OFFSCREEN, OFFSCREEN));

        let current = self.sigma.pointer();
        if current.x == x && current.y == y {
            return false;
        }

        self.sigma.set_pointer(x, y);
        true
    }

    /// Centers the logical extent of the graph in a `width` x `height`
    /// viewport.
    pub(in crate::app) fn fit_camera(&mut self, width: f64, height: f64) {
        let nodes = self.sigma.graph().nodes();
        if nodes.is_empty() || width <= 0.0 || height <= 0.0 {
            return;
        }

        let (min_x, max_x, min_y, max_y) = nodes.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), node| {
                (
                    min_x.min(node.x),
                    max_x.max(node.x),
                    min_y.min(node.y),
                    max_y.max(node.y),
                )
            },
        );

        let span_x = (max_x - min_x).max(1.0);
        let span_y = (max_y - min_y).max(1.0);
        let ratio = ((width / span_x).min(height / span_y) * 0.9).clamp(ZOOM_MIN, ZOOM_MAX);

        self.sigma.set_camera(Camera {
            stage_x: width / 2.0 - (min_x + max_x) / 2.0 * ratio,
            stage_y: height / 2.0 - (min_y + max_y) / 2.0 * ratio,
            ratio,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keeps_the_point_under_the_pointer() {
        let camera = Camera {
            stage_x: 40.0,
            stage_y: -20.0,
            ratio: 0.5,
        };

        let zoomed = zoom_about(camera, 300.0, 200.0, 1.15);

        let before = ((300.0 - camera.stage_x) / camera.ratio, (200.0 - camera.stage_y) / camera.ratio);
        let after = ((300.0 - zoomed.stage_x) / zoomed.ratio, (200.0 - zoomed.stage_y) / zoomed.ratio);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
        assert!((zoomed.ratio - 0.575).abs() < 1e-12);
    }

    #[test]
    fn zoom_is_clamped() {
        let camera = Camera {
            ratio: ZOOM_MAX,
            ..Camera::default()
        };
        assert_eq!(zoom_about(camera, 0.0, 0.0, 2.0).ratio, ZOOM_MAX);
    }
}
