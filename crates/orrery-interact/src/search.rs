//! Case-insensitive node search

use orrery_core::{Graph, GraphNode, NodeId};

/// The current query and its matches, in node order.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    matches: Vec<NodeId>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query. Returns the first match, if any.
    pub fn set_query(&mut self, graph: &Graph, query: &str) -> Option<&NodeId> {
        self.query = query.trim().to_string();
        self.refresh(graph);
        self.first()
    }

    /// Re-run the current query, e.g. after a rebuild.
    pub fn refresh(&mut self, graph: &Graph) {
        self.matches = find(graph, &self.query);
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    pub fn first(&self) -> Option<&NodeId> {
        self.matches.first()
    }

    pub fn is_active(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Nodes whose label, path, folder or id contains `query`, ignoring case.
pub fn find(graph: &Graph, query: &str) -> Vec<NodeId> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    graph
        .nodes()
        .filter(|node| is_match(node, &needle))
        .map(|node| node.id.clone())
        .collect()
}

fn is_match(node: &GraphNode, needle: &str) -> bool {
    let fields = [
        Some(node.label.as_str()),
        node.kind.path(),
        Some(node.folder_path.as_str()),
        Some(node.id.as_str()),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}
