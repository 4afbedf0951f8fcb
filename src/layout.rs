use std::collections::HashMap;
use std::f64::consts::TAU;

use nodescope::GraphStore;

use crate::util::stable_pair;

pub const LAYOUT_GENERATOR: &str = "forceLayout";

const MIN_TEMPERATURE: f64 = 0.05;
const COOLING: f64 = 0.985;

/// Starting point on a jittered ring, so a fresh layout does not begin from
/// a single overlapping cluster.
pub fn seed_position(index: usize, count: usize, id: &str) -> (f64, f64) {
    let count = count.max(1);
    let base_radius = (count as f64).sqrt() * 36.0;
    let angle = (index as f64 / count as f64) * TAU;
    let (jx, jy) = stable_pair(id);

    (
        angle.cos() * base_radius + jx * 16.0,
        angle.sin() * base_radius + jy * 16.0,
    )
}

/// Fruchterman-Reingold style layout advanced one cooling step per frame.
#[derive(Clone, Debug)]
pub struct ForceLayout {
    temperature: f64,
    iterations: usize,
}

impl ForceLayout {
    pub fn new(graph: &GraphStore) -> Self {
        let n = graph.node_count().max(1) as f64;
        Self {
            temperature: (n.sqrt() * 6.0).max(14.0),
            iterations: 0,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Moves every non-fixed node once. Returns `false` once cooled down.
    pub fn step(&mut self, graph: &mut GraphStore) -> bool {
        let nodes = graph.nodes();
        let n = nodes.len();
        if n < 2 || self.temperature < MIN_TEMPERATURE {
            return false;
        }

        let positions = nodes.iter().map(|node| (node.x, node.y)).collect::<Vec<_>>();
        let sizes = nodes.iter().map(|node| node.size.max(0.1)).collect::<Vec<_>>();
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();
        let springs = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let from = *index_by_id.get(edge.source.as_str())?;
                let to = *index_by_id.get(edge.target.as_str())?;
                (from != to).then_some((from, to, edge.weight))
            })
            .collect::<Vec<_>>();

        let spread = (n as f64).sqrt() * 36.0;
        let k = ((spread * 2.4).powi(2) / n as f64).sqrt().max(8.0);
        let mut disp = vec![(0.0_f64, 0.0_f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].0 - positions[j].0;
                let dy = positions[i].1 - positions[j].1;
                let distance = (dx * dx + dy * dy).sqrt().max(0.5);
                let (ux, uy) = (dx / distance, dy / distance);

                let force = k * k * (1.0 + (sizes[i] + sizes[j]) * 0.015) / distance;
                disp[i].0 += ux * force;
                disp[i].1 += uy * force;
                disp[j].0 -= ux * force;
                disp[j].1 -= uy * force;
            }
        }

        for &(from, to, weight) in &springs {
            let dx = positions[from].0 - positions[to].0;
            let dy = positions[from].1 - positions[to].1;
            let distance = (dx * dx + dy * dy).sqrt().max(0.5);
            let (ux, uy) = (dx / distance, dy / distance);
            let force = (distance * distance / k) * weight.clamp(0.1, 4.0) * 0.18;

            disp[from].0 -= ux * force;
            disp[from].1 -= uy * force;
            disp[to].0 += ux * force;
            disp[to].1 += uy * force;
        }

        for (index, (x, y)) in positions.iter().enumerate() {
            disp[index].0 -= x * 0.0012 * k;
            disp[index].1 -= y * 0.0012 * k;
        }

        let temperature = self.temperature;
        let mut cursor = 0;
        graph.iter_nodes(|node| {
            let (dx, dy) = disp[cursor];
            cursor += 1;
            if node.fixed {
                return;
            }

            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let scale = length.min(temperature) * 0.92 / length;
                node.x += dx * scale;
                node.y += dy * scale;
            }
        });

        self.iterations += 1;
        self.temperature *= COOLING;
        self.temperature >= MIN_TEMPERATURE
    }
}

#[cfg(test)]
mod tests {
    use nodescope::Params;
    use serde_json::json;

    use super::*;

    fn graph_with(positions: &[(&str, f64, f64, bool)]) -> GraphStore {
        let mut graph = GraphStore::new();
        for (id, x, y, fixed) in positions {
            let params = json!({ "x": x, "y": y, "fixed": fixed });
            graph
                .add_node(id, params.as_object().unwrap_or(&Params::new()))
                .unwrap();
        }
        graph
    }

    #[test]
    fn seed_positions_form_a_ring() {
        let (x, y) = seed_position(0, 100, "a");
        let radius = (x * x + y * y).sqrt();
        assert!((radius - 360.0).abs() < 32.0);
    }

    #[test]
    fn repulsion_separates_close_nodes() {
        let mut graph = graph_with(&[("a", 0.0, 0.0, false), ("b", 1.0, 0.0, false)]);
        let mut layout = ForceLayout::new(&graph);

        assert!(layout.step(&mut graph));

        let a = graph.node_ref("a").unwrap().x;
        let b = graph.node_ref("b").unwrap().x;
        assert!(b - a > 1.0);
        assert_eq!(layout.iterations(), 1);
    }

    #[test]
    fn fixed_nodes_do_not_move() {
        let mut graph = graph_with(&[("pin", 0.0, 0.0, true), ("free", 1.0, 0.0, false)]);
        let mut layout = ForceLayout::new(&graph);

        layout.step(&mut graph);

        let pin = graph.node_ref("pin").unwrap();
        assert_eq!((pin.x, pin.y), (0.0, 0.0));
    }

    #[test]
    fn layout_eventually_cools_down() {
        let mut graph = graph_with(&[("a", 0.0, 0.0, false), ("b", 5.0, 5.0, false)]);
        let mut layout = ForceLayout::new(&graph);

        let mut steps = 0;
        while layout.step(&mut graph) {
            steps += 1;
            assert!(steps < 10_000);
        }
        assert!(layout.temperature() < MIN_TEMPERATURE);
        assert!(!layout.step(&mut graph));
    }

    #[test]
    fn single_node_is_already_settled() {
        let mut graph = graph_with(&[("a", 0.0, 0.0, false)]);
        assert!(!ForceLayout::new(&graph).step(&mut graph));
    }
}
