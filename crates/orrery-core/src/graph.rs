//! Graph wrapper using petgraph::StableDiGraph keyed by NodeId/EdgeId

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::model::*;

/// The dependency graph: a directed graph whose iteration order is the
/// order in which nodes and edges were first added.
#[derive(Clone, Default)]
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns `false` (and keeps the existing node) if the id is taken.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.node_index.insert(id, idx);
        true
    }

    /// Add an edge. Returns `false` if the id is taken or an endpoint is missing.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if self.edge_index.contains_key(&edge.id) {
            return false;
        }
        let (Some(&source), Some(&target)) =
            (self.node_index.get(&edge.source), self.node_index.get(&edge.target))
        else {
            return false;
        };
        let id = edge.id.clone();
        let idx = self.inner.add_edge(source, target, edge);
        self.edge_index.insert(id, idx);
        true
    }

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.node_index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Get an edge by id.
    pub fn edge(&self, id: &EdgeId) -> Option<&GraphEdge> {
        self.edge_index
            .get(id)
            .and_then(|&idx| self.inner.edge_weight(idx))
    }

    /// Get a mutable edge by id.
    pub fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut GraphEdge> {
        let idx = *self.edge_index.get(id)?;
        self.inner.edge_weight_mut(idx)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Position of a node in encounter order.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).map(|idx| idx.index())
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in encounter order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Iterate over the edges of one kind.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges().filter(move |e| e.kind == kind)
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: &NodeId) -> Vec<&GraphEdge> {
        self.directed(source, Direction::Outgoing)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: &NodeId) -> Vec<&GraphEdge> {
        self.directed(target, Direction::Incoming)
    }

    fn directed(&self, id: &NodeId, direction: Direction) -> Vec<&GraphEdge> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first; restore insertion order.
        let mut edges: Vec<(EdgeIndex, &GraphEdge)> = self
            .inner
            .edges_directed(idx, direction)
            .map(|edge_ref| (edge_ref.id(), edge_ref.weight()))
            .collect();
        edges.sort_by_key(|(edge_idx, _)| edge_idx.index());
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Number of `kind` edges leaving a node.
    pub fn out_degree(&self, id: &NodeId, kind: EdgeKind) -> usize {
        self.edges_from(id).iter().filter(|e| e.kind == kind).count()
    }

    /// Number of `kind` edges entering a node.
    pub fn in_degree(&self, id: &NodeId, kind: EdgeKind) -> usize {
        self.edges_to(id).iter().filter(|e| e.kind == kind).count()
    }

    /// Neighbors over `kind` edges in either direction, deduplicated, in edge order.
    pub fn neighbors(&self, id: &NodeId, kind: Option<EdgeKind>) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let outgoing = self.edges_from(id).into_iter().map(|e| (e, &e.target));
        let incoming = self.edges_to(id).into_iter().map(|e| (e, &e.source));
        for (edge, other) in outgoing.chain(incoming) {
            if kind.is_some_and(|k| k != edge.kind) || other == id {
                continue;
            }
            if seen.insert(other.clone()) {
                out.push(other.clone());
            }
        }
        out
    }

    /// The containing folder (or root) of a node.
    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        let idx = *self.node_index.get(id)?;
        self.inner
            .edges_directed(idx, Direction::Incoming)
            .find(|edge_ref| edge_ref.weight().kind == EdgeKind::Contains)
            .map(|edge_ref| &edge_ref.weight().source)
    }

    /// Get all nodes that are ancestors of a given node (following Contains edges).
    pub fn ancestors(&self, node: &NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent.clone()) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        ancestors
    }

    /// Every edge endpoint refers to a node in the graph.
    pub fn is_referentially_sound(&self) -> bool {
        self.edges()
            .all(|e| self.contains_node(&e.source) && self.contains_node(&e.target))
    }
}

/// Node and edge counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub folders: usize,
    pub packages: usize,
    pub internal_edges: usize,
    pub external_edges: usize,
    pub contains_edges: usize,
}

impl Graph {
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in self.nodes() {
            match node.kind {
                NodeKind::File { .. } => stats.files += 1,
                NodeKind::Folder { .. } => stats.folders += 1,
                NodeKind::Package { .. } => stats.packages += 1,
                NodeKind::Root => {}
            }
        }
        for edge in self.edges() {
            match (edge.kind, edge.is_external) {
                (EdgeKind::Contains, _) => stats.contains_edges += 1,
                (EdgeKind::Depends, true) => stats.external_edges += 1,
                (EdgeKind::Depends, false) => stats.internal_edges += 1,
            }
        }
        stats
    }
}
