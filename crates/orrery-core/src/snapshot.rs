//! Input snapshot: the repository file list plus resolved dependency edges

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::model::{FileEntry, RawEdge};

/// Everything the graph builder consumes from the upstream collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl Snapshot {
    /// Load a snapshot, choosing YAML for `.yml`/`.yaml` and JSON otherwise.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
