use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke, Vec2};
use nodescope::geometry::{Point, curve_control_point, point_on_quadratic_curve};
use nodescope::{Edge, EdgeShape, Layer, LayerPainter, Node};

use crate::util::parse_color;

const CURVE_SEGMENTS: usize = 16;
const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(150, 160, 172);
const LABEL_COLOR: Color32 = Color32::from_gray(226);
const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
const ACTIVE_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const BACKDROP_COLOR: Color32 = Color32::from_rgba_premultiplied(14, 17, 22, 215);

/// Drawing commands in display coordinates, replayed every frame.
enum Primitive {
    Disc {
        center: Pos2,
        radius: f32,
        fill: Color32,
        outline: Stroke,
    },
    Ring {
        center: Pos2,
        radius: f32,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Pos2>,
        stroke: Stroke,
    },
    Text {
        position: Pos2,
        align: Align2,
        text: String,
        size: f32,
        color: Color32,
        backdrop: Option<Color32>,
    },
}

/// Retained per-layer buffers. A layer keeps its contents until the draw
/// cycle clears it, so layers drawn in `Keep` mode survive a redraw.
#[derive(Default)]
pub(in crate::app) struct LayerCanvas {
    layers: [Vec<Primitive>; 4],
    hover: Vec<Primitive>,
}

fn slot(layer: Layer) -> usize {
    match layer {
        Layer::Edges => 0,
        Layer::Nodes => 1,
        Layer::EdgeLabels => 2,
        Layer::Labels => 3,
    }
}

fn position(node: &Node) -> Pos2 {
    Pos2::new(node.display_x as f32, node.display_y as f32)
}

fn node_color(node: &Node) -> Color32 {
    node.color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or(DEFAULT_NODE_COLOR)
}

fn edge_color(edge: &Edge, source: &Node) -> Color32 {
    edge.color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or_else(|| node_color(source).gamma_multiply(0.55))
}

fn edge_points(source: &Node, target: &Node, shape: EdgeShape) -> Vec<Pos2> {
    let start = Point::new(source.display_x, source.display_y);
    let end = Point::new(target.display_x, target.display_y);
    match shape {
        EdgeShape::Line => vec![position(source), position(target)],
        EdgeShape::Curve => {
            let control = curve_control_point(start, end);
            (0..=CURVE_SEGMENTS)
                .map(|step| {
                    let t = step as f64 / CURVE_SEGMENTS as f64;
                    let point = point_on_quadratic_curve(t, start, end, control);
                    Pos2::new(point.x as f32, point.y as f32)
                })
                .collect()
        }
    }
}

fn edge_midpoint(source: &Node, target: &Node, shape: EdgeShape) -> Pos2 {
    let points = edge_points(source, target, shape);
    points[points.len() / 2]
        .lerp(points[(points.len() - 1) / 2], 0.5)
}

fn edge_width(edge: &Edge) -> f32 {
    (edge.display_size as f32).clamp(0.3, 8.0)
}

impl LayerCanvas {
    pub(in crate::app) fn primitive_count(&self, layer: Layer) -> usize {
        self.layers[slot(layer)].len()
    }

    fn push(&mut self, layer: Layer, primitive: Primitive) {
        self.layers[slot(layer)].push(primitive);
    }

    fn node_label(node: &Node, size: f32, color: Color32, backdrop: Option<Color32>) -> Primitive {
        let radius = node.display_size as f32;
        Primitive::Text {
            position: position(node) + Vec2::new(radius * 1.5 + 2.0, 0.0),
            align: Align2::LEFT_CENTER,
            text: node.label.clone(),
            size,
            color,
            backdrop,
        }
    }

    /// Replays every layer, bottom to top, shifted by `origin`.
    pub(in crate::app) fn paint(&self, painter: &Painter, origin: Vec2) {
        for layer in &self.layers {
            for primitive in layer {
                Self::paint_primitive(painter, origin, primitive);
            }
        }
        for primitive in &self.hover {
            Self::paint_primitive(painter, origin, primitive);
        }
    }

    fn paint_primitive(painter: &Painter, origin: Vec2, primitive: &Primitive) {
        match primitive {
            Primitive::Disc {
                center,
                radius,
                fill,
                outline,
            } => {
                painter.circle(*center + origin, *radius, *fill, *outline);
            }
            Primitive::Ring {
                center,
                radius,
                stroke,
            } => {
                painter.circle_stroke(*center + origin, *radius, *stroke);
            }
            Primitive::Polyline { points, stroke } => {
                let points = points.iter().map(|point| *point + origin).collect::<Vec<_>>();
                painter.add(Shape::line(points, *stroke));
            }
            Primitive::Text {
                position,
                align,
                text,
                size,
                color,
                backdrop,
            } => {
                let galley =
                    painter.layout_no_wrap(text.clone(), FontId::proportional(*size), *color);
                let rect = align.anchor_size(*position + origin, galley.size());
                if let Some(backdrop) = backdrop {
                    painter.rect_filled(rect.expand(3.0), 3.0, *backdrop);
                }
                painter.galley(rect.min, galley, *color);
            }
        }
    }
}

impl LayerPainter for LayerCanvas {
    fn clear_layer(&mut self, layer: Layer) {
        self.layers[slot(layer)].clear();
    }

    fn clear_hover(&mut self) {
        self.hover.clear();
    }

    fn draw_node(&mut self, node: &Node) {
        self.push(
            Layer::Nodes,
            Primitive::Disc {
                center: position(node),
                radius: node.display_size as f32,
                fill: node_color(node),
                outline: Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            },
        );
    }

    fn draw_edge(&mut self, edge: &Edge, source: &Node, target: &Node, shape: EdgeShape) {
        self.push(
            Layer::Edges,
            Primitive::Polyline {
                points: edge_points(source, target, shape),
                stroke: Stroke::new(edge_width(edge), edge_color(edge, source)),
            },
        );
    }

    fn draw_label(&mut self, node: &Node, font_size: f64) {
        let label = Self::node_label(node, font_size as f32, LABEL_COLOR, None);
        self.push(Layer::Labels, label);
    }

    fn draw_edge_label(
        &mut self,
        edge: &Edge,
        source: &Node,
        target: &Node,
        shape: EdgeShape,
        font_size: f64,
    ) {
        self.push(
            Layer::EdgeLabels,
            Primitive::Text {
                position: edge_midpoint(source, target, shape),
                align: Align2::CENTER_CENTER,
                text: edge.label.clone(),
                size: font_size as f32,
                color: Color32::from_gray(190),
                backdrop: Some(BACKDROP_COLOR),
            },
        );
    }

    fn draw_hover_node(&mut self, node: &Node) {
        let radius = node.display_size as f32;
        self.hover.push(Primitive::Disc {
            center: position(node),
            radius,
            fill: node_color(node),
            outline: Stroke::new(2.0, HOVER_COLOR),
        });
        self.hover
            .push(Self::node_label(node, 13.0, Color32::WHITE, Some(BACKDROP_COLOR)));
    }

    fn draw_hover_edge(&mut self, edge: &Edge, source: &Node, target: &Node, shape: EdgeShape) {
        self.hover.push(Primitive::Polyline {
            points: edge_points(source, target, shape),
            stroke: Stroke::new(edge_width(edge) + 1.5, HOVER_COLOR),
        });
    }

    fn draw_active_node(&mut self, node: &Node) {
        let radius = node.display_size as f32;
        self.hover.push(Primitive::Ring {
            center: position(node),
            radius: radius + 3.0,
            stroke: Stroke::new(2.0, ACTIVE_COLOR),
        });
        self.hover
            .push(Self::node_label(node, 13.0, ACTIVE_COLOR, Some(BACKDROP_COLOR)));
    }
}
