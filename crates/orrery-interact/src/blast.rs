//! Blast radius: what a change to one node can reach

use std::collections::{HashSet, VecDeque};

use orrery_core::{EdgeKind, Graph, NodeId};

pub const DEFAULT_BLAST_CAP: usize = 50;

/// Breadth-first over dependencies in either direction, origin excluded,
/// at most `cap` nodes. Unknown origins have an empty radius.
pub fn blast_radius(graph: &Graph, origin: &NodeId, cap: usize) -> Vec<NodeId> {
    let mut found = Vec::new();
    if cap == 0 || !graph.contains_node(origin) {
        return found;
    }
    let mut seen = HashSet::from([origin.clone()]);
    let mut queue = VecDeque::from([origin.clone()]);
    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(&current, Some(EdgeKind::Depends)) {
            if !seen.insert(next.clone()) {
                continue;
            }
            found.push(next.clone());
            if found.len() >= cap {
                return found;
            }
            queue.push_back(next);
        }
    }
    found
}
