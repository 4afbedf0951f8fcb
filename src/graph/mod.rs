use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::SizingConfig;
use crate::error::{EndpointRole, Error, Result};
use crate::events::{EventBus, GraphEvent, SubscriberId};

mod fields;
mod hover;
mod transform;

use self::fields::{EDGE_FIELDS, NODE_FIELDS, apply_params, merge_snapshot};

pub type Params = Map<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub display_x: f64,
    pub display_y: f64,
    pub display_size: f64,
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
    pub fixed: bool,
    pub active: bool,
    pub hidden: bool,
    pub force_label: bool,
    pub hover: bool,
    pub label: String,
    pub color: Option<String>,
    pub attr: Map<String, Value>,
}

impl Node {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            x: 0.0,
            y: 0.0,
            size: 1.0,
            display_x: 0.0,
            display_y: 0.0,
            display_size: 0.0,
            degree: 0,
            in_degree: 0,
            out_degree: 0,
            fixed: false,
            active: false,
            hidden: false,
            force_label: false,
            hover: false,
            label: id.to_owned(),
            color: None,
            attr: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub size: f64,
    pub weight: f64,
    pub display_size: f64,
    pub label: String,
    pub color: Option<String>,
    /// Rendering hint, usually `"line"` or `"curve"`.
    pub kind: Option<String>,
    pub hidden: bool,
    pub hover: bool,
    pub attr: Map<String, Value>,
}

impl Edge {
    pub(crate) fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            size: 1.0,
            weight: 1.0,
            display_size: 0.5,
            label: id.to_owned(),
            color: None,
            kind: None,
            hidden: false,
            hover: false,
            attr: Map::new(),
        }
    }

    pub fn shape(&self, default: EdgeShape) -> EdgeShape {
        self.kind.as_deref().map(EdgeShape::parse).unwrap_or(default)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeShape {
    #[default]
    Line,
    Curve,
}

impl EdgeShape {
    /// Anything other than `"curve"` is drawn and hit-tested as a line.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("curve") {
            Self::Curve
        } else {
            Self::Line
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Borders {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Owns the nodes and edges of one view, in draw order, with id indices.
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashMap<String, usize>,
    edge_index: HashMap<String, usize>,
    borders: Option<Borders>,
    sizing: SizingConfig,
    events: EventBus,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sizing(sizing: SizingConfig) -> Self {
        Self {
            sizing,
            ..Self::default()
        }
    }

    pub fn sizing(&self) -> &SizingConfig {
        &self.sizing
    }

    pub fn set_sizing(&mut self, sizing: SizingConfig) {
        self.sizing = sizing;
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&GraphEvent) + 'static) -> SubscriberId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn dispatch(&mut self, event: GraphEvent) {
        self.events.dispatch(event);
    }

    pub fn add_node(&mut self, id: &str, params: &Params) -> Result<&mut Self> {
        if self.node_index.contains_key(id) {
            return Err(Error::DuplicateNode(id.to_owned()));
        }

        let mut node = Node::new(id);
        apply_params(&mut node, NODE_FIELDS, params);

        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(self)
    }

    pub fn add_edge(
        &mut self,
        id: &str,
        source: &str,
        target: &str,
        params: &Params,
    ) -> Result<&mut Self> {
        if self.edge_index.contains_key(id) {
            return Err(Error::DuplicateEdge(id.to_owned()));
        }

        let Some(&source_index) = self.node_index.get(source) else {
            return Err(Error::DanglingReference {
                edge: id.to_owned(),
                endpoint: source.to_owned(),
                role: EndpointRole::Source,
            });
        };
        let Some(&target_index) = self.node_index.get(target) else {
            return Err(Error::DanglingReference {
                edge: id.to_owned(),
                endpoint: target.to_owned(),
                role: EndpointRole::Target,
            });
        };

        let source_node = &mut self.nodes[source_index];
        source_node.degree += 1;
        source_node.out_degree += 1;
        let target_node = &mut self.nodes[target_index];
        target_node.degree += 1;
        target_node.in_degree += 1;

        let mut edge = Edge::new(id, source, target);
        apply_params(&mut edge, EDGE_FIELDS, params);

        self.edge_index.insert(edge.id.clone(), self.edges.len());
        self.edges.push(edge);
        Ok(self)
    }

    /// Removes the given nodes and, in one sweep, every edge touching them.
    ///
    /// Unknown ids are logged and skipped. Returns the number of nodes removed.
    pub fn drop_node<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = HashSet::new();
        for id in ids {
            let id = id.as_ref();
            if self.node_index.contains_key(id) {
                removed.insert(id.to_owned());
            } else {
                log::warn!("node \"{id}\" does not exist");
            }
        }

        if removed.is_empty() {
            return 0;
        }

        self.nodes.retain(|node| !removed.contains(&node.id));
        self.reindex_nodes();

        let nodes = &mut self.nodes;
        let node_index = &self.node_index;
        let edges_before = self.edges.len();
        self.edges.retain(|edge| {
            if removed.contains(&edge.source) {
                if let Some(&index) = node_index.get(&edge.target) {
                    let target = &mut nodes[index];
                    target.degree = target.degree.saturating_sub(1);
                    target.in_degree = target.in_degree.saturating_sub(1);
                }
                false
            } else if removed.contains(&edge.target) {
                if let Some(&index) = node_index.get(&edge.source) {
                    let source = &mut nodes[index];
                    source.degree = source.degree.saturating_sub(1);
                    source.out_degree = source.out_degree.saturating_sub(1);
                }
                false
            } else {
                true
            }
        });
        if self.edges.len() != edges_before {
            self.reindex_edges();
        }

        log::debug!(
            "dropped {} nodes and {} incident edges",
            removed.len(),
            edges_before - self.edges.len()
        );
        removed.len()
    }

    /// Removes the given edges, updating endpoint degrees. Unknown ids are
    /// logged and skipped. Returns the number of edges removed.
    pub fn drop_edge<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = HashSet::new();
        for id in ids {
            let id = id.as_ref();
            let Some(&position) = self.edge_index.get(id) else {
                log::warn!("edge \"{id}\" does not exist");
                continue;
            };
            if !removed.insert(id.to_owned()) {
                continue;
            }

            let edge = &self.edges[position];
            if let Some(&index) = self.node_index.get(&edge.source) {
                let source = &mut self.nodes[index];
                source.degree = source.degree.saturating_sub(1);
                source.out_degree = source.out_degree.saturating_sub(1);
            }
            let edge = &self.edges[position];
            if let Some(&index) = self.node_index.get(&edge.target) {
                let target = &mut self.nodes[index];
                target.degree = target.degree.saturating_sub(1);
                target.in_degree = target.in_degree.saturating_sub(1);
            }
        }

        if removed.is_empty() {
            return 0;
        }

        self.edges.retain(|edge| !removed.contains(&edge.id));
        self.reindex_edges();
        removed.len()
    }

    pub fn empty(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.borders = None;
    }

    fn reindex_nodes(&mut self) {
        self.node_index.clear();
        for (position, node) in self.nodes.iter().enumerate() {
            self.node_index.insert(node.id.clone(), position);
        }
    }

    fn reindex_edges(&mut self) {
        self.edge_index.clear();
        for (position, edge) in self.edges.iter().enumerate() {
            self.edge_index.insert(edge.id.clone(), position);
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn node_ref(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn edge_ref(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|&index| &self.edges[index])
    }

    pub fn endpoints(&self, edge: &Edge) -> Option<(&Node, &Node)> {
        Some((self.node_ref(&edge.source)?, self.node_ref(&edge.target)?))
    }

    /// Detached copy of one node.
    pub fn node(&self, id: &str) -> Option<Node> {
        self.node_ref(id).cloned()
    }

    pub fn nodes_by_id<I, S>(&self, ids: I) -> Vec<Node>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| self.node(id.as_ref()))
            .collect()
    }

    /// Detached copy of one edge.
    pub fn edge(&self, id: &str) -> Option<Edge> {
        self.edge_ref(id).cloned()
    }

    pub fn edges_by_id<I, S>(&self, ids: I) -> Vec<Edge>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| self.edge(id.as_ref()))
            .collect()
    }

    pub fn borders(&self) -> Option<Borders> {
        self.borders
    }

    /// Hands a copy of every node to `edit`, then merges the writable fields
    /// back. Ids, degrees, display values and hover state cannot be changed
    /// through this path.
    pub fn iter_nodes(&mut self, edit: impl FnMut(&mut Node)) {
        let positions = (0..self.nodes.len()).collect::<Vec<_>>();
        self.edit_nodes_at(&positions, edit);
    }

    pub fn iter_nodes_by_id<I, S>(&mut self, ids: I, edit: impl FnMut(&mut Node))
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = Self::positions(&self.node_index, ids, "node");
        self.edit_nodes_at(&positions, edit);
    }

    /// Edge counterpart of [`GraphStore::iter_nodes`]; endpoints are read-only.
    pub fn iter_edges(&mut self, edit: impl FnMut(&mut Edge)) {
        let positions = (0..self.edges.len()).collect::<Vec<_>>();
        self.edit_edges_at(&positions, edit);
    }

    pub fn iter_edges_by_id<I, S>(&mut self, ids: I, edit: impl FnMut(&mut Edge))
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = Self::positions(&self.edge_index, ids, "edge");
        self.edit_edges_at(&positions, edit);
    }

    fn positions<I, S>(index: &HashMap<String, usize>, ids: I, kind: &str) -> Vec<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| {
                let id = id.as_ref();
                let position = index.get(id).copied();
                if position.is_none() {
                    log::warn!("{kind} \"{id}\" does not exist");
                }
                position
            })
            .collect()
    }

    fn edit_nodes_at(&mut self, positions: &[usize], mut edit: impl FnMut(&mut Node)) {
        let mut snapshots = positions
            .iter()
            .map(|&position| self.nodes[position].clone())
            .collect::<Vec<_>>();
        snapshots.iter_mut().for_each(&mut edit);

        for (&position, snapshot) in positions.iter().zip(snapshots.iter_mut()) {
            merge_snapshot(&mut self.nodes[position], snapshot, NODE_FIELDS);
        }
    }

    fn edit_edges_at(&mut self, positions: &[usize], mut edit: impl FnMut(&mut Edge)) {
        let mut snapshots = positions
            .iter()
            .map(|&position| self.edges[position].clone())
            .collect::<Vec<_>>();
        snapshots.iter_mut().for_each(&mut edit);

        for (&position, snapshot) in positions.iter().zip(snapshots.iter_mut()) {
            merge_snapshot(&mut self.edges[position], snapshot, EDGE_FIELDS);
        }
    }
}
