use crate::events::GraphEvent;
use crate::geometry::{Point, in_box, in_circle, is_on_segment};

use super::{Edge, EdgeShape, GraphStore, Node};

/// Segment tolerance scaled by zoom level; falls back to 100 at ratio 1 or
/// for degenerate ratios.
fn hover_epsilon(ratio: f64) -> f64 {
    let epsilon = (1.0 / (ratio * ratio)).ln().abs() * 100.0;
    if epsilon == 0.0 || epsilon.is_nan() {
        100.0
    } else {
        epsilon
    }
}

fn display_point(node: &Node) -> Point {
    Point::new(node.display_x, node.display_y)
}

impl GraphStore {
    /// Updates node hover flags for the pointer at `(mouse_x, mouse_y)` in
    /// display space and reports the transitions.
    pub fn check_hover(&mut self, mouse_x: f64, mouse_y: f64) {
        let pointer = Point::new(mouse_x, mouse_y);
        let mut entered = Vec::new();
        let mut exited = Vec::new();

        for node in &mut self.nodes {
            if node.hidden {
                node.hover = false;
                continue;
            }

            let hovered = in_circle(pointer, display_point(node), node.display_size);
            if hovered && !node.hover {
                entered.push(node.id.clone());
            } else if !hovered && node.hover {
                exited.push(node.id.clone());
            }
            node.hover = hovered;
        }

        if !entered.is_empty() {
            self.dispatch(GraphEvent::NodesEntered(entered));
        }
        if !exited.is_empty() {
            self.dispatch(GraphEvent::NodesExited(exited));
        }
    }

    /// Edge counterpart of [`GraphStore::check_hover`].
    ///
    /// Edges drawn as curves are never reported as hovered.
    pub fn check_hover_edge(&mut self, mouse_x: f64, mouse_y: f64, ratio: f64, default: EdgeShape) {
        let pointer = Point::new(mouse_x, mouse_y);
        let epsilon = hover_epsilon(ratio);
        let mut entered = Vec::new();
        let mut exited = Vec::new();

        let nodes = &self.nodes;
        let node_index = &self.node_index;
        for edge in &mut self.edges {
            if edge.hidden {
                edge.hover = false;
                continue;
            }

            let hovered = {
                let source = node_index.get(&edge.source).map(|&index| &nodes[index]);
                let target = node_index.get(&edge.target).map(|&index| &nodes[index]);
                match (source, target) {
                    (Some(source), Some(target)) => {
                        let start = display_point(source);
                        let end = display_point(target);
                        let blocked = start == end
                            || in_box(pointer, start, source.display_size)
                            || in_box(pointer, end, target.display_size);

                        !blocked
                            && match edge.shape(default) {
                                EdgeShape::Line => {
                                    is_on_segment(pointer, start, end, edge.display_size, epsilon)
                                }
                                EdgeShape::Curve => false,
                            }
                    }
                    _ => false,
                }
            };

            if hovered && !edge.hover {
                entered.push(edge.id.clone());
            } else if !hovered && edge.hover {
                exited.push(edge.id.clone());
            }
            edge.hover = hovered;
        }

        if !entered.is_empty() {
            self.dispatch(GraphEvent::EdgesEntered(entered));
        }
        if !exited.is_empty() {
            self.dispatch(GraphEvent::EdgesExited(exited));
        }
    }

    pub fn hovered_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.hover)
    }

    pub fn hovered_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| edge.hover)
    }

    /// Clears every edge hover flag without emitting events.
    pub(crate) fn reset_edge_hover(&mut self) {
        for edge in &mut self.edges {
            edge.hover = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::super::Params;
    use super::*;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn recorder(store: &mut GraphStore) -> Rc<RefCell<Vec<GraphEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn epsilon_falls_back_at_unit_ratio() {
        assert_eq!(hover_epsilon(1.0), 100.0);
        assert_eq!(hover_epsilon(f64::NAN), 100.0);
        assert!((hover_epsilon(2.0) - 4.0_f64.ln() * 100.0).abs() < 1e-9);
    }

    #[test]
    fn node_hover_enters_exits_then_stays_quiet() {
        let mut store = GraphStore::new();
        store.add_node("a", &Params::new()).unwrap();
        store.nodes[0].display_size = 5.0;
        let seen = recorder(&mut store);

        store.check_hover(1.0, 1.0);
        assert!(store.node_ref("a").unwrap().hover);
        store.check_hover(100.0, 100.0);
        assert!(!store.node_ref("a").unwrap().hover);
        store.check_hover(100.0, 100.0);

        assert_eq!(
            *seen.borrow(),
            vec![
                GraphEvent::NodesEntered(vec!["a".into()]),
                GraphEvent::NodesExited(vec!["a".into()]),
            ]
        );
    }

    #[test]
    fn hidden_nodes_are_cleared_silently() {
        let mut store = GraphStore::new();
        store.add_node("a", &params(json!({ "hidden": true }))).unwrap();
        store.nodes[0].display_size = 5.0;
        store.nodes[0].hover = true;
        let seen = recorder(&mut store);

        store.check_hover(0.0, 0.0);

        assert!(!store.node_ref("a").unwrap().hover);
        assert!(seen.borrow().is_empty());
    }

    fn horizontal_edge(kind: Option<&str>) -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node("a", &params(json!({ "x": 0, "y": 0 }))).unwrap();
        store.add_node("b", &params(json!({ "x": 100, "y": 0 }))).unwrap();
        let mut edge = Params::new();
        if let Some(kind) = kind {
            edge.insert("type".into(), json!(kind));
        }
        store.add_edge("ab", "a", "b", &edge).unwrap();
        // display_size of 1 / sqrt(pi) for both endpoints
        store.rescale(0.0, 0.0, true, true);
        store
    }

    #[test]
    fn horizontal_edge_is_hit_along_its_length() {
        let mut store = horizontal_edge(None);
        let seen = recorder(&mut store);

        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Line);
        assert!(store.edge_ref("ab").unwrap().hover);

        store.check_hover_edge(50.0, 100.0, 1.0, EdgeShape::Line);
        assert!(!store.edge_ref("ab").unwrap().hover);

        store.check_hover_edge(-10.0, 0.0, 1.0, EdgeShape::Line);
        assert!(!store.edge_ref("ab").unwrap().hover);

        assert_eq!(
            *seen.borrow(),
            vec![
                GraphEvent::EdgesEntered(vec!["ab".into()]),
                GraphEvent::EdgesExited(vec!["ab".into()]),
            ]
        );
    }

    #[test]
    fn hidden_edges_are_cleared_silently() {
        let mut store = horizontal_edge(None);
        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Line);
        assert!(store.edge_ref("ab").unwrap().hover);

        store.iter_edges_by_id(["ab"], |edge| edge.hidden = true);
        let seen = recorder(&mut store);
        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Line);

        assert!(!store.edge_ref("ab").unwrap().hover);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn pointer_over_an_endpoint_does_not_hover_the_edge() {
        let mut store = horizontal_edge(None);
        store.check_hover_edge(0.1, 0.0, 1.0, EdgeShape::Line);
        assert!(!store.edge_ref("ab").unwrap().hover);
    }

    #[test]
    fn curve_edges_are_never_hovered() {
        let mut store = horizontal_edge(Some("curve"));
        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Line);
        assert!(!store.edge_ref("ab").unwrap().hover);

        let mut store = horizontal_edge(None);
        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Curve);
        assert!(!store.edge_ref("ab").unwrap().hover);

        let mut store = horizontal_edge(Some("arrow"));
        store.check_hover_edge(50.0, 0.0, 1.0, EdgeShape::Curve);
        assert!(store.edge_ref("ab").unwrap().hover);
    }

    #[test]
    fn coincident_endpoints_block_hover() {
        let mut store = GraphStore::new();
        store.add_node("a", &Params::new()).unwrap();
        store.add_edge("loop", "a", "a", &Params::new()).unwrap();
        store.rescale(0.0, 0.0, true, true);

        store.check_hover_edge(0.0, 0.0, 1.0, EdgeShape::Line);
        assert!(!store.edge_ref("loop").unwrap().hover);
    }
}
