//! Orrery Core: dependency graph model, builder and budget pruning

pub mod builder;
pub mod config;
pub mod diff;
pub mod error;
pub mod graph;
pub mod model;
pub mod palette;
pub mod prune;
pub mod snapshot;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use builder::{BuildOutcome, BuildReport, DEFAULT_NODE_BUDGET, GraphBuilder, build, build_graph};
pub use config::{CONFIG_FILE, OrreryConfig};
pub use diff::{DiffEngine, GraphDiff};
pub use error::{BuildWarning, ConfigError, SnapshotError};
pub use graph::{Graph, GraphStats};
pub use model::{
    Color, EdgeId, EdgeKind, EntryType, FileEntry, GraphEdge, GraphNode, LayoutConfig, LayoutMode, NodeId,
    NodeKind, RawEdge, Viewport,
};
pub use prune::prune;
pub use snapshot::Snapshot;
