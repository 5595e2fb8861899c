//! Core data structures for the dependency graph

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Group key used as the folder path of every package node.
pub const EXTERNAL_GROUP: &str = "<external>";

/// Labels longer than this are shortened for display.
pub const MAX_LABEL_CHARS: usize = 18;

/// Unique, stable identifier for a node.
///
/// Ids are derived from the node's kind and path so that rebuilding the same
/// input always yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn root() -> Self {
        NodeId("root".to_string())
    }

    pub fn file(path: &str) -> Self {
        NodeId(path.to_string())
    }

    pub fn folder(path: &str) -> Self {
        NodeId(format!("dir:{path}"))
    }

    pub fn package(name: &str) -> Self {
        NodeId(format!("pkg:{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Unique edge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn dependency(source: &NodeId, target: &NodeId) -> Self {
        EdgeId(format!("dep:{source}->{target}"))
    }

    pub fn containment(parent: &NodeId, child: &NodeId) -> Self {
        EdgeId(format!("tree:{parent}->{child}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// A source file inside the repository.
    File { path: String },
    /// An external module, keyed by its package root (`react`, `@scope/name`).
    Package { name: String },
    /// A directory. `depth` is 0 for top-level folders.
    Folder { path: String, depth: usize },
    /// The synthetic repository root.
    Root,
}

impl NodeKind {
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }

    pub fn is_package(&self) -> bool {
        matches!(self, NodeKind::Package { .. })
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder { .. })
    }

    pub fn is_root(&self) -> bool {
        matches!(self, NodeKind::Root)
    }

    pub fn is_top_level_folder(&self) -> bool {
        matches!(self, NodeKind::Folder { depth: 0, .. })
    }

    /// The repository path for files and folders.
    pub fn path(&self) -> Option<&str> {
        match self {
            NodeKind::File { path } | NodeKind::Folder { path, .. } => Some(path),
            NodeKind::Package { .. } | NodeKind::Root => None,
        }
    }

    /// Short lowercase tag used on the wire.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::File { .. } => "file",
            NodeKind::Package { .. } => "package",
            NodeKind::Folder { .. } => "folder",
            NodeKind::Root => "root",
        }
    }
}

/// 24-bit RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0 & 0x00ff_ffff)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A single node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Full label: basename, package name or folder name.
    pub label: String,
    /// Label as rendered, shortened past [`MAX_LABEL_CHARS`].
    pub display_name: String,
    /// Folder containing this node; `""` at the top level.
    pub folder_path: String,
    pub visual_size: f64,
    pub color: Color,
}

impl GraphNode {
    /// Collision/render radius derived from the visual size.
    pub fn radius(&self) -> f64 {
        self.visual_size / 3.0
    }
}

/// Shorten a label to `first 8 … last 6` characters when it is too long.
pub fn display_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}…{tail}")
}

/// `clamp(len * 7.5 + 8, 26, 90)` over the displayed label.
pub fn visual_size(display_name: &str) -> f64 {
    let len = display_name.chars().count() as f64;
    (len * 7.5 + 8.0).clamp(26.0, 90.0)
}

/// Relationship encoded by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Folder hierarchy: root→folder, folder→folder, folder→file.
    Contains,
    /// Aggregated dependency from a file to a file or package.
    Depends,
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// Target is a package outside the repository.
    pub is_external: bool,
    /// Number of raw edges folded into this one. Always at least 1.
    pub weight: u32,
    /// Breakdown of `weight` by resolver kind (`import`, `require`, ...).
    pub kind_counts: BTreeMap<String, u32>,
}

impl GraphEdge {
    pub fn containment(parent: &NodeId, child: &NodeId) -> Self {
        GraphEdge {
            id: EdgeId::containment(parent, child),
            source: parent.clone(),
            target: child.clone(),
            kind: EdgeKind::Contains,
            is_external: false,
            weight: 1,
            kind_counts: BTreeMap::new(),
        }
    }
}

/// Whether a repository tree entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    #[serde(alias = "file")]
    Blob,
    #[serde(alias = "dir", alias = "directory")]
    Tree,
    /// Submodule commits, symlinks and anything else a tree listing may carry.
    #[serde(other)]
    Other,
}

/// One entry of the repository file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
}

impl FileEntry {
    pub fn file(path: impl Into<String>) -> Self {
        FileEntry {
            path: path.into(),
            entry_type: EntryType::Blob,
        }
    }
}

/// A dependency produced by the module resolver: `from` imports `to`.
///
/// `to` is either a repository path or a module specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    pub from: String,
    pub to: String,
    #[serde(default = "default_edge_kind")]
    pub kind: String,
}

fn default_edge_kind() -> String {
    "import".to_string()
}

impl RawEdge {
    pub fn import(from: impl Into<String>, to: impl Into<String>) -> Self {
        RawEdge {
            from: from.into(),
            to: to.into(),
            kind: default_edge_kind(),
        }
    }
}

/// Coordinate-assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    HubSpine,
    Radial,
    Hierarchical,
    Grid,
    Metro,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::HubSpine,
        LayoutMode::Radial,
        LayoutMode::Hierarchical,
        LayoutMode::Grid,
        LayoutMode::Metro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::HubSpine => "hub-spine",
            LayoutMode::Radial => "radial",
            LayoutMode::Hierarchical => "hierarchical",
            LayoutMode::Grid => "grid",
            LayoutMode::Metro => "metro",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown layout mode `{s}`"))
    }
}

/// Layout knobs shared by the strategies and the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub spacing_factor: f64,
    pub link_distance: f64,
    pub show_labels: bool,
    pub curved_links: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            mode: LayoutMode::default(),
            spacing_factor: 120.0,
            link_distance: 90.0,
            show_labels: true,
            curved_links: false,
        }
    }
}

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(1280.0, 800.0)
    }
}
