//! Error and diagnostic types

use std::path::PathBuf;

use thiserror::Error;

/// An input edge the builder could not place. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("edge source `{from}` is not a known file (target `{to}`)")]
    UnknownSource { from: String, to: String },

    #[error("edge from `{from}` has an empty target")]
    EmptyTarget { from: String },

    #[error("edge from `{from}` points at unresolved path `{to}`")]
    UnresolvedPath { from: String, to: String },

    #[error("edge from `{from}` has invalid package specifier `{to}`")]
    InvalidPackage { from: String, to: String },
}

/// Failure to load or validate `orrery.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure to load a file-list + edge snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
