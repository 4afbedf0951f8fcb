use std::f64::consts::PI;

use nodescope::{Params, Sigma};
use serde_json::{Value, json};

use crate::layout::seed_position;
use crate::util::{stable_index, stable_pair};

const PALETTE: [&str; 6] = ["#5fa8d3", "#f4a259", "#8cb369", "#bc4b51", "#9d79bc", "#e9c46a"];

#[derive(Clone, Debug)]
pub struct DemoOptions {
    pub nodes: usize,
    pub edges: usize,
    pub seed_label: String,
}

pub(in crate::app) struct DemoNode {
    pub id: String,
    pub params: Params,
}

pub(in crate::app) struct DemoEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub params: Params,
}

pub(in crate::app) struct DemoGraph {
    pub nodes: Vec<DemoNode>,
    pub edges: Vec<DemoEdge>,
}

fn object(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Clustered graph whose shape depends only on the options.
pub(in crate::app) fn generate(options: &DemoOptions) -> DemoGraph {
    let count = options.nodes;
    let clusters = (count / 40).clamp(1, PALETTE.len());

    let nodes = (0..count)
        .map(|index| {
            let id = format!("n{index}");
            let cluster = stable_index(&id, clusters);
            let (x, y) = seed_position(index, count, &id);
            let (weight, _) = stable_pair(&format!("{id}/size"));
            // sizes are areas; rescale turns them back into radii
            let radius = 3.0 + (weight + 1.0) * 3.0;
            let params = object(json!({
                "x": x,
                "y": y,
                "size": PI * radius * radius,
                "label": format!("{} {index}", options.seed_label),
                "color": PALETTE[cluster],
                "cluster": cluster,
            }));
            DemoNode { id, params }
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::with_capacity(options.edges);
    if count > 1 {
        for index in 0..options.edges {
            let id = format!("e{index}");
            let source = stable_index(&format!("{id}/source"), count);
            let mut target = stable_index(&format!("{id}/target"), count);
            // keep most edges inside a cluster
            if index % 4 != 0 {
                let source_cluster = stable_index(&nodes[source].id, clusters);
                for offset in 0..count {
                    let candidate = (target + offset) % count;
                    if candidate != source
                        && stable_index(&nodes[candidate].id, clusters) == source_cluster
                    {
                        target = candidate;
                        break;
                    }
                }
            }

            let kind = if index % 9 == 0 { "curve" } else { "line" };
            edges.push(DemoEdge {
                id,
                source: nodes[source].id.clone(),
                target: nodes[target].id.clone(),
                params: object(json!({ "type": kind, "label": format!("link {index}") })),
            });
        }
    }

    DemoGraph { nodes, edges }
}

/// Loads a generated graph into the view, replacing whatever it held.
pub(in crate::app) fn populate(sigma: &mut Sigma, demo: &DemoGraph) -> nodescope::Result<()> {
    let graph = sigma.graph_mut();
    graph.empty();
    for node in &demo.nodes {
        graph.add_node(&node.id, &node.params)?;
    }
    for edge in &demo.edges {
        graph.add_edge(&edge.id, &edge.source, &edge.target, &edge.params)?;
    }
    log::info!(
        "loaded {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use nodescope::Settings;

    use super::*;

    fn options(nodes: usize, edges: usize) -> DemoOptions {
        DemoOptions {
            nodes,
            edges,
            seed_label: "item".into(),
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let first = generate(&options(50, 80));
        let second = generate(&options(50, 80));

        assert_eq!(first.nodes.len(), 50);
        assert_eq!(first.edges.len(), 80);
        for (a, b) in first.edges.iter().zip(&second.edges) {
            assert_eq!((&a.source, &a.target), (&b.source, &b.target));
        }
        assert_eq!(
            first.nodes[3].params.get("label"),
            Some(&json!("item 3"))
        );
    }

    #[test]
    fn generated_graph_loads_cleanly() {
        let demo = generate(&options(120, 300));
        let mut sigma = Sigma::new(&Settings::default(), 800.0, 600.0);

        populate(&mut sigma, &demo).unwrap();

        assert_eq!(sigma.graph().node_count(), 120);
        assert_eq!(sigma.graph().edge_count(), 300);
        let degree_sum = sigma.graph().nodes().iter().map(|node| node.degree).sum::<usize>();
        assert_eq!(degree_sum, 600);
    }

    #[test]
    fn tiny_graphs_get_no_edges() {
        let demo = generate(&options(1, 10));
        assert!(demo.edges.is_empty());
    }
}
