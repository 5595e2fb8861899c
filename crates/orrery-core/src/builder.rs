//! Builds the dependency graph from a file list and resolved edges

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::BuildWarning;
use crate::graph::Graph;
use crate::model::*;
use crate::palette::{self, Palette};
use crate::prune::prune;

/// Default maximum number of rendered nodes.
pub const DEFAULT_NODE_BUDGET: usize = 300;

/// What happened while building, for logging and the degraded-state flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Input edges that were dropped.
    pub skipped: Vec<BuildWarning>,
    /// Edges whose source and target were the same node.
    pub self_edges: usize,
    /// Nodes removed by budget pruning.
    pub pruned: usize,
    /// No files or no dependency edges: only folder structure is shown.
    pub degraded: bool,
}

/// A built graph together with its report.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: Graph,
    pub report: BuildReport,
}

/// Incremental graph construction. Add every file before adding edges.
pub struct GraphBuilder {
    graph: Graph,
    palette: Palette,
    files: HashSet<String>,
    top_folders: HashSet<String>,
    report: BuildReport,
}

impl GraphBuilder {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        graph.add_node(structural_node(NodeId::root(), NodeKind::Root, "root", "", palette::NEUTRAL));
        GraphBuilder {
            graph,
            palette: Palette::new(),
            files: HashSet::new(),
            top_folders: HashSet::new(),
            report: BuildReport::default(),
        }
    }

    /// Add the repository tree. Directory entries only contribute folders.
    pub fn add_files(&mut self, entries: &[FileEntry]) {
        for entry in entries {
            let path = normalize_path(&entry.path);
            if path.is_empty() {
                continue;
            }
            match entry.entry_type {
                EntryType::Tree => {
                    self.ensure_folder(&path);
                }
                EntryType::Blob => self.add_file(&path),
                EntryType::Other => debug!("Skipping non-file entry {}", path),
            }
        }
    }

    fn add_file(&mut self, path: &str) {
        if !self.files.insert(path.to_string()) {
            return;
        }
        let folder = folder_of(path);
        let parent = if folder.is_empty() {
            NodeId::root()
        } else {
            self.ensure_folder(folder)
        };
        let color = match top_segment(path) {
            Some(top) => self.palette.get(top).unwrap_or(palette::NEUTRAL),
            None => palette::NEUTRAL,
        };
        let id = NodeId::file(path);
        let node = structural_node(
            id.clone(),
            NodeKind::File { path: path.to_string() },
            basename(path),
            folder,
            color,
        );
        self.graph.add_node(node);
        self.graph.add_edge(GraphEdge::containment(&parent, &id));
    }

    /// Create the folder and all of its ancestors. Returns the folder's id.
    fn ensure_folder(&mut self, path: &str) -> NodeId {
        let mut parent = NodeId::root();
        let mut prefix = String::new();
        for (depth, segment) in path.split('/').enumerate() {
            if depth > 0 {
                prefix.push('/');
            }
            prefix.push_str(segment);
            let id = NodeId::folder(&prefix);
            if !self.graph.contains_node(&id) {
                if depth == 0 {
                    self.top_folders.insert(prefix.clone());
                }
                let color = self.palette.color_for(top_segment(&prefix).unwrap_or(prefix.as_str()));
                let node = structural_node(
                    id.clone(),
                    NodeKind::Folder { path: prefix.clone(), depth },
                    segment,
                    folder_of(&prefix),
                    color,
                );
                self.graph.add_node(node);
                self.graph.add_edge(GraphEdge::containment(&parent, &id));
            }
            parent = id;
        }
        parent
    }

    /// Fold one resolver edge into the graph, or record why it was skipped.
    pub fn add_dependency(&mut self, edge: &RawEdge) {
        match self.resolve(edge) {
            Ok(Some((source, target, external))) => {
                let kind = normalized_kind(&edge.kind);
                let id = EdgeId::dependency(&source, &target);
                if let Some(existing) = self.graph.edge_mut(&id) {
                    existing.weight += 1;
                    *existing.kind_counts.entry(kind).or_insert(0) += 1;
                    return;
                }
                let mut kind_counts = std::collections::BTreeMap::new();
                kind_counts.insert(kind, 1);
                self.graph.add_edge(GraphEdge {
                    id,
                    source,
                    target,
                    kind: EdgeKind::Depends,
                    is_external: external,
                    weight: 1,
                    kind_counts,
                });
            }
            Ok(None) => {
                self.report.self_edges += 1;
                debug!("Dropping self-edge on {}", edge.from);
            }
            Err(warning) => {
                warn!("Skipping edge: {}", warning);
                self.report.skipped.push(warning);
            }
        }
    }

    /// Resolve endpoints. `Ok(None)` marks a self-edge.
    fn resolve(&mut self, edge: &RawEdge) -> Result<Option<(NodeId, NodeId, bool)>, BuildWarning> {
        let from = normalize_path(&edge.from);
        if !self.files.contains(&from) {
            return Err(BuildWarning::UnknownSource {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
        let raw_to = edge.to.trim();
        if raw_to.is_empty() {
            return Err(BuildWarning::EmptyTarget { from });
        }

        let source = NodeId::file(&from);
        let to = normalize_path(raw_to);
        let (target, external) = if self.files.contains(&to) {
            (NodeId::file(&to), false)
        } else if raw_to.starts_with('.') || raw_to.starts_with('/') || raw_to.starts_with('\\') {
            return Err(BuildWarning::UnresolvedPath { from, to: raw_to.to_string() });
        } else {
            let Some(name) = package_root(raw_to) else {
                return Err(BuildWarning::InvalidPackage { from, to: raw_to.to_string() });
            };
            // `src/missing.ts` looks like a package `src` but names a local folder.
            if raw_to.contains('/') && self.top_folders.contains(&name) {
                return Err(BuildWarning::UnresolvedPath { from, to: raw_to.to_string() });
            }
            (self.ensure_package(&name), true)
        };

        if target == source {
            return Ok(None);
        }
        Ok(Some((source, target, external)))
    }

    fn ensure_package(&mut self, name: &str) -> NodeId {
        let id = NodeId::package(name);
        if !self.graph.contains_node(&id) {
            let node = structural_node(
                id.clone(),
                NodeKind::Package { name: name.to_string() },
                name,
                EXTERNAL_GROUP,
                palette::PACKAGE,
            );
            self.graph.add_node(node);
        }
        id
    }

    pub fn finish(mut self) -> BuildOutcome {
        let dependencies = self.graph.edges_of_kind(EdgeKind::Depends).count();
        self.report.degraded = self.files.is_empty() || dependencies == 0;
        if self.report.degraded {
            info!(
                "Graph is degraded ({} files, {} dependency edges); showing folder structure only",
                self.files.len(),
                dependencies
            );
        }
        debug!(
            "Built graph: {} nodes, {} edges, {} skipped inputs",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.report.skipped.len()
        );
        BuildOutcome {
            graph: self.graph,
            report: self.report,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the full, unpruned graph.
pub fn build_graph(files: &[FileEntry], edges: &[RawEdge]) -> BuildOutcome {
    let mut builder = GraphBuilder::new();
    builder.add_files(files);
    for edge in edges {
        builder.add_dependency(edge);
    }
    builder.finish()
}

/// Build and prune to `budget` nodes.
pub fn build(files: &[FileEntry], edges: &[RawEdge], budget: usize) -> BuildOutcome {
    let BuildOutcome { graph, mut report } = build_graph(files, edges);
    let before = graph.node_count();
    let graph = prune(graph, budget);
    report.pruned = before - graph.node_count();
    if report.pruned > 0 {
        info!(
            "Pruned {} of {} nodes to fit the budget of {}",
            report.pruned, before, budget
        );
    }
    BuildOutcome { graph, report }
}

fn structural_node(id: NodeId, kind: NodeKind, label: &str, folder: &str, color: Color) -> GraphNode {
    let display_name = display_label(label);
    GraphNode {
        id,
        kind,
        label: label.to_string(),
        visual_size: visual_size(&display_name),
        display_name,
        folder_path: folder.to_string(),
        color,
    }
}

/// Forward slashes, no leading `./` or `/`, no empty or `.` segments.
pub fn normalize_path(path: &str) -> String {
    path.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Folder part of a normalized path; `""` for top-level entries.
pub fn folder_of(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

pub fn basename(path: &str) -> &str {
    path.rfind('/').map_or(path, |idx| &path[idx + 1..])
}

fn top_segment(path: &str) -> Option<&str> {
    path.find('/').map(|idx| &path[..idx])
}

/// Package root of a module specifier: `@scope/name` keeps two segments,
/// anything else keeps the first.
pub fn package_root(specifier: &str) -> Option<String> {
    let mut segments = specifier.trim().split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;
    if let Some(scope) = first.strip_prefix('@') {
        if scope.is_empty() {
            return None;
        }
        let name = segments.next()?;
        return Some(format!("{first}/{name}"));
    }
    Some(first.to_string())
}

fn normalized_kind(kind: &str) -> String {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() { "import".to_string() } else { kind }
}
