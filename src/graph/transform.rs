use std::f64::consts::PI;

use super::{Borders, GraphStore};

/// Linear size mapping `size * scale + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Homothety {
    scale: f64,
    offset: f64,
}

impl Homothety {
    /// Identity when both bounds are unset, constant when they match,
    /// otherwise an interpolation from `[0, extreme]` onto `[min, max]`.
    fn between(min: f64, max: f64, extreme: f64, constant: f64) -> Self {
        if max == 0.0 && min == 0.0 {
            Self {
                scale: 1.0,
                offset: 0.0,
            }
        } else if max == min {
            Self {
                scale: 0.0,
                offset: constant,
            }
        } else {
            Self {
                scale: (max - min) / extreme,
                offset: min,
            }
        }
    }

    fn apply(self, value: f64) -> f64 {
        value * self.scale + self.offset
    }
}

/// `0`, `NaN` and negative maxima fall back to 1, like an unset maximum.
fn extreme_or_one(value: f64) -> f64 {
    if value > 0.0 { value } else { 1.0 }
}

impl GraphStore {
    /// Derives display sizes from logical sizes and copies logical positions
    /// into display positions for every non-fixed node.
    ///
    /// The viewport size is accepted for callers that track it; no
    /// recentering or fit-to-viewport scaling is applied.
    pub fn rescale(&mut self, _width: f64, _height: f64, do_nodes: bool, do_edges: bool) -> &mut Self {
        let sizing = self.sizing;

        let mut size_max = 0.0_f64;
        if do_nodes {
            for node in &self.nodes {
                size_max = size_max.max(node.size);
            }
        }
        let mut weight_max = 0.0_f64;
        if do_edges {
            for edge in &self.edges {
                weight_max = weight_max.max(edge.size);
            }
        }
        let size_max = extreme_or_one(size_max);
        let weight_max = extreme_or_one(weight_max);

        let node_sizes = Homothety::between(
            sizing.min_node_size,
            sizing.max_node_size,
            size_max,
            sizing.max_node_size,
        );
        let edge_sizes = Homothety::between(
            sizing.min_edge_size,
            sizing.max_edge_size,
            weight_max,
            sizing.min_edge_size,
        );

        if do_nodes {
            for node in &mut self.nodes {
                node.display_size = (node_sizes.apply(node.size) / PI).sqrt();
                if !node.fixed {
                    node.display_x = node.x;
                    node.display_y = node.y;
                }
            }
        }

        if do_edges {
            for edge in &mut self.edges {
                edge.display_size = edge_sizes.apply(edge.size);
            }
        }

        self
    }

    /// Applies the camera pan and zoom to the rescaled display values.
    pub fn translate(
        &mut self,
        scene_x: f64,
        scene_y: f64,
        ratio: f64,
        do_nodes: bool,
        do_edges: bool,
    ) -> &mut Self {
        if do_nodes {
            let size_ratio = ratio.powf(self.sizing.nodes_pow_ratio);
            for node in &mut self.nodes {
                if !node.fixed {
                    node.display_x = node.display_x * ratio + scene_x;
                    node.display_y = node.display_y * ratio + scene_y;
                }
                node.display_size *= size_ratio;
            }
        }

        if do_edges {
            let size_ratio = ratio.powf(self.sizing.edges_pow_ratio);
            for edge in &mut self.edges {
                edge.display_size *= size_ratio;
            }
        }

        self
    }

    /// Maps a screen-space drag of `(dx, dy)` back onto the logical position
    /// of each listed node. Display sizes are left alone.
    pub fn translate_nodes<I, S>(
        &mut self,
        ids: I,
        dx: f64,
        dy: f64,
        scene_x: f64,
        scene_y: f64,
        ratio: f64,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            let Some(&index) = self.node_index.get(id) else {
                log::warn!("cannot translate node \"{id}\": it does not exist");
                continue;
            };
            let node = &mut self.nodes[index];
            node.x = (node.display_x - scene_x + dx) / ratio;
            node.y = (node.display_y - scene_y + dy) / ratio;
        }
        self
    }

    /// Recomputes the bounding box of all node display extents.
    ///
    /// NOTE: `max_y` is taken from `display_y - display_size`, mirroring
    /// `min_y` rather than `max_x`. Consumers relying on the box for pan
    /// limits see it shifted by one node radius at the bottom edge.
    pub fn set_borders(&mut self) -> Option<Borders> {
        let mut borders: Option<Borders> = None;

        for node in &self.nodes {
            let left = node.display_x - node.display_size;
            let right = node.display_x + node.display_size;
            let top = node.display_y - node.display_size;
            let bottom = node.display_y - node.display_size;

            borders = Some(match borders {
                None => Borders {
                    min_x: left,
                    max_x: right,
                    min_y: top,
                    max_y: bottom,
                },
                Some(current) => Borders {
                    min_x: current.min_x.min(left),
                    max_x: current.max_x.max(right),
                    min_y: current.min_y.min(top),
                    max_y: current.max_y.max(bottom),
                },
            });
        }

        self.borders = borders;
        borders
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::Params;
    use super::*;
    use crate::config::SizingConfig;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rescale_interpolates_node_sizes_by_area() {
        let mut store = GraphStore::with_sizing(SizingConfig {
            min_node_size: 5.0,
            max_node_size: 15.0,
            ..SizingConfig::default()
        });
        store.add_node("a", &params(json!({ "size": 10 }))).unwrap();
        store.add_node("b", &params(json!({ "size": 20 }))).unwrap();

        store.rescale(800.0, 600.0, true, true);

        let a = store.node_ref("a").unwrap().display_size;
        let b = store.node_ref("b").unwrap().display_size;
        let low = (5.0 / PI).sqrt();
        let high = (15.0 / PI).sqrt();
        assert!(a < b);
        assert!(a >= low && a <= high);
        assert!(b >= low && b <= high + 1e-12);
        assert!(close(a, (10.0 / PI).sqrt()));
    }

    #[test]
    fn rescale_identity_and_constant_modes() {
        let mut store = GraphStore::new();
        store.add_node("a", &params(json!({ "size": 4, "x": 3, "y": -1 }))).unwrap();
        store.add_node("b", &params(json!({ "size": 9 }))).unwrap();
        store.add_edge("ab", "a", "b", &params(json!({ "size": 2 }))).unwrap();

        store.rescale(0.0, 0.0, true, true);
        let a = store.node_ref("a").unwrap();
        assert!(close(a.display_size, (4.0 / PI).sqrt()));
        assert_eq!((a.display_x, a.display_y), (3.0, -1.0));
        assert_eq!(store.edge_ref("ab").unwrap().display_size, 2.0);

        store.set_sizing(SizingConfig {
            min_node_size: 7.0,
            max_node_size: 7.0,
            min_edge_size: 1.5,
            max_edge_size: 1.5,
            ..SizingConfig::default()
        });
        store.rescale(0.0, 0.0, true, true);
        for node in store.nodes() {
            assert!(close(node.display_size, (7.0 / PI).sqrt()));
        }
        assert_eq!(store.edge_ref("ab").unwrap().display_size, 1.5);
    }

    #[test]
    fn rescale_edges_linearly() {
        let mut store = GraphStore::with_sizing(SizingConfig {
            min_edge_size: 1.0,
            max_edge_size: 3.0,
            ..SizingConfig::default()
        });
        store.add_node("a", &Params::new()).unwrap();
        store.add_edge("thin", "a", "a", &params(json!({ "size": 1 }))).unwrap();
        store.add_edge("thick", "a", "a", &params(json!({ "size": 4 }))).unwrap();

        store.rescale(0.0, 0.0, false, true);

        assert_eq!(store.edge_ref("thin").unwrap().display_size, 1.5);
        assert_eq!(store.edge_ref("thick").unwrap().display_size, 3.0);
        assert_eq!(store.node_ref("a").unwrap().display_size, 0.0);
    }

    #[test]
    fn fixed_nodes_keep_display_position() {
        let mut store = GraphStore::new();
        store.add_node("pin", &params(json!({ "x": 10, "y": 10, "fixed": true }))).unwrap();
        store.add_node("free", &params(json!({ "x": 10, "y": 10 }))).unwrap();

        store.rescale(0.0, 0.0, true, true).translate(5.0, -5.0, 4.0, true, true);

        let pin = store.node_ref("pin").unwrap();
        let free = store.node_ref("free").unwrap();
        assert_eq!((pin.display_x, pin.display_y), (0.0, 0.0));
        assert_eq!((free.display_x, free.display_y), (45.0, 35.0));
        assert!(close(pin.display_size, free.display_size));
        assert!(close(free.display_size, (1.0 / PI).sqrt() * 2.0));
    }

    #[test]
    fn translate_keeps_edge_thickness_by_default() {
        let mut store = GraphStore::new();
        store.add_node("a", &Params::new()).unwrap();
        store.add_edge("aa", "a", "a", &params(json!({ "size": 2 }))).unwrap();

        store.rescale(0.0, 0.0, true, true).translate(0.0, 0.0, 9.0, true, true);
        assert_eq!(store.edge_ref("aa").unwrap().display_size, 2.0);

        store.set_sizing(SizingConfig {
            edges_pow_ratio: 0.5,
            ..SizingConfig::default()
        });
        store.rescale(0.0, 0.0, true, true).translate(0.0, 0.0, 9.0, true, true);
        assert_eq!(store.edge_ref("aa").unwrap().display_size, 6.0);
    }

    #[test]
    fn translate_nodes_inverts_the_camera() {
        let mut store = GraphStore::new();
        store.add_node("a", &params(json!({ "x": 10, "y": 20 }))).unwrap();
        store.rescale(0.0, 0.0, true, false).translate(100.0, 50.0, 2.0, true, false);
        let size_before = store.node_ref("a").unwrap().display_size;

        store.translate_nodes(["a", "ghost"], 6.0, -4.0, 100.0, 50.0, 2.0);

        let a = store.node_ref("a").unwrap();
        assert_eq!((a.x, a.y), (13.0, 18.0));
        assert_eq!(a.display_size, size_before);
    }

    #[test]
    fn borders_cover_display_extents() {
        let mut store = GraphStore::new();
        assert!(store.set_borders().is_none());

        store.add_node("a", &params(json!({ "x": 0, "y": 0 }))).unwrap();
        store.add_node("b", &params(json!({ "x": 10, "y": 20 }))).unwrap();
        store.rescale(0.0, 0.0, true, false);
        let radius = store.node_ref("a").unwrap().display_size;

        let borders = store.set_borders().unwrap();
        assert!(close(borders.min_x, -radius));
        assert!(close(borders.max_x, 10.0 + radius));
        assert!(close(borders.min_y, -radius));
        // max_y keeps the subtraction used for min_y
        assert!(close(borders.max_y, 20.0 - radius));
        assert_eq!(store.borders(), Some(borders));

        store.empty();
        assert!(store.set_borders().is_none());
        assert!(store.borders().is_none());
    }
}
