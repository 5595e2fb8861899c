//! Structural diff between two graph builds

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::Graph;
use crate::model::{EdgeId, NodeId};

/// What changed between two consecutive builds.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GraphDiff {
    /// Monotonically increasing rebuild sequence number.
    pub sequence: u64,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub added_edges: Vec<EdgeId>,
    pub removed_edges: Vec<EdgeId>,
    /// Edges present in both builds whose weight changed.
    pub reweighted_edges: Vec<EdgeId>,
}

impl GraphDiff {
    /// Create an empty diff with given sequence number.
    pub fn new(sequence: u64) -> Self {
        GraphDiff {
            sequence,
            ..Default::default()
        }
    }

    /// Check if this diff is empty (no changes).
    pub fn is_empty(&self) -> bool {
        !self.is_structural() && self.reweighted_edges.is_empty()
    }

    /// Nodes or edges appeared or disappeared. Weight changes alone do not count.
    pub fn is_structural(&self) -> bool {
        !(self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty())
    }
}

/// Hands out sequence numbers for successive diffs.
#[derive(Debug, Default)]
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the difference between two graph states, in encounter order.
    pub fn compute_diff(&mut self, old_graph: &Graph, new_graph: &Graph) -> GraphDiff {
        self.sequence += 1;
        let mut diff = GraphDiff::new(self.sequence);

        let old_nodes: HashSet<&NodeId> = old_graph.nodes().map(|n| &n.id).collect();
        let new_nodes: HashSet<&NodeId> = new_graph.nodes().map(|n| &n.id).collect();
        diff.added_nodes = new_graph
            .nodes()
            .filter(|n| !old_nodes.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        diff.removed_nodes = old_graph
            .nodes()
            .filter(|n| !new_nodes.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();

        for edge in new_graph.edges() {
            match old_graph.edge(&edge.id) {
                None => diff.added_edges.push(edge.id.clone()),
                Some(old) if old.weight != edge.weight => diff.reweighted_edges.push(edge.id.clone()),
                Some(_) => {}
            }
        }
        diff.removed_edges = old_graph
            .edges()
            .filter(|e| new_graph.edge(&e.id).is_none())
            .map(|e| e.id.clone())
            .collect();

        diff
    }

    /// Get current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
