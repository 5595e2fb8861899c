//! Budget pruning: keep the root, top-level folders and the best-connected nodes

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::Graph;
use crate::model::{EdgeKind, GraphEdge, NodeId};

/// Reduce `graph` to at most `budget` nodes.
///
/// A graph already within budget is returned untouched, so pruning twice is
/// the same as pruning once.
pub fn prune(graph: Graph, budget: usize) -> Graph {
    let budget = budget.max(1);
    if graph.node_count() <= budget {
        return graph;
    }

    let keep = select_nodes(&graph, budget);
    debug!("Keeping {} of {} nodes", keep.len(), graph.node_count());

    let mut pruned = Graph::new();
    for node in graph.nodes().filter(|n| keep.contains(&n.id)) {
        pruned.add_node(node.clone());
    }
    for edge in graph.edges() {
        if keep.contains(&edge.source) && keep.contains(&edge.target) {
            pruned.add_edge(edge.clone());
        }
    }

    // Kept nodes whose folder was pruned hang off their nearest kept ancestor.
    for node in graph.nodes().filter(|n| keep.contains(&n.id)) {
        let Some(parent) = graph.parent(&node.id) else {
            continue;
        };
        if keep.contains(parent) {
            continue;
        }
        let anchor = nearest_kept_ancestor(&graph, &node.id, &keep);
        pruned.add_edge(GraphEdge::containment(&anchor, &node.id));
    }

    pruned
}

fn select_nodes(graph: &Graph, budget: usize) -> HashSet<NodeId> {
    let mut keep = HashSet::with_capacity(budget);
    keep.insert(NodeId::root());

    let folder_cap = (budget / 5).max(20).min(budget - 1);
    for folder in graph
        .nodes()
        .filter(|n| n.kind.is_top_level_folder())
        .take(folder_cap)
    {
        keep.insert(folder.id.clone());
    }

    let mut degree: HashMap<&NodeId, usize> = HashMap::new();
    for edge in graph.edges_of_kind(EdgeKind::Depends) {
        *degree.entry(&edge.source).or_insert(0) += 1;
        *degree.entry(&edge.target).or_insert(0) += 1;
    }

    // Stable sort keeps encounter order among equal degrees.
    let mut candidates: Vec<&NodeId> = graph
        .nodes()
        .filter(|n| !n.kind.is_root() && !n.kind.is_top_level_folder())
        .map(|n| &n.id)
        .collect();
    candidates.sort_by_key(|id| std::cmp::Reverse(degree.get(id).copied().unwrap_or(0)));

    let remaining = budget.saturating_sub(keep.len());
    keep.extend(candidates.into_iter().take(remaining).cloned());
    keep
}

/// Walk up the containment chain until a kept node is found; root otherwise.
fn nearest_kept_ancestor(graph: &Graph, node: &NodeId, keep: &HashSet<NodeId>) -> NodeId {
    graph
        .ancestors(node)
        .into_iter()
        .find(|ancestor| keep.contains(ancestor))
        .unwrap_or_else(NodeId::root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::model::{FileEntry, RawEdge};

    fn deep_files(count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| FileEntry::file(format!("pkg{}/deep/file{i}.ts", i % 3)))
            .collect()
    }

    #[test]
    fn test_within_budget_is_untouched() {
        let graph = build_graph(&deep_files(10), &[]).graph;
        let before: Vec<_> = graph.nodes().map(|n| n.id.clone()).collect();
        let pruned = prune(graph, 300);
        let after: Vec<_> = pruned.nodes().map(|n| n.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_high_degree_nodes_survive() {
        let mut files = deep_files(40);
        files.push(FileEntry::file("hub.ts"));
        let edges: Vec<RawEdge> = (0..5)
            .map(|i| RawEdge::import("hub.ts", format!("pkg{}/deep/file{i}.ts", i % 3)))
            .collect();
        let graph = build_graph(&files, &edges).graph;
        let pruned = prune(graph, 12);

        assert!(pruned.node_count() <= 12);
        assert!(pruned.contains_node(&NodeId::root()));
        assert!(pruned.contains_node(&NodeId::file("hub.ts")));
        assert!(pruned.contains_node(&NodeId::folder("pkg0")));
        assert!(pruned.is_referentially_sound());
    }

    #[test]
    fn test_orphans_reattach_to_kept_ancestor() {
        let files = deep_files(30);
        let edges = vec![RawEdge::import("pkg0/deep/file0.ts", "pkg1/deep/file1.ts")];
        let graph = build_graph(&files, &edges).graph;
        let pruned = prune(graph, 6);

        let file0 = NodeId::file("pkg0/deep/file0.ts");
        assert!(pruned.contains_node(&file0));
        // `pkg0/deep` was pruned; the file now hangs off `pkg0`.
        assert!(!pruned.contains_node(&NodeId::folder("pkg0/deep")));
        assert_eq!(pruned.parent(&file0), Some(&NodeId::folder("pkg0")));
    }

    #[test]
    fn test_prune_twice_is_prune_once() {
        let graph = build_graph(&deep_files(50), &[]).graph;
        let once = prune(graph, 25);
        let ids: Vec<_> = once.nodes().map(|n| n.id.clone()).collect();
        let edges: Vec<_> = once.edges().map(|e| e.id.clone()).collect();
        let twice = prune(once, 25);
        assert_eq!(ids, twice.nodes().map(|n| n.id.clone()).collect::<Vec<_>>());
        assert_eq!(edges, twice.edges().map(|e| e.id.clone()).collect::<Vec<_>>());
    }
}
