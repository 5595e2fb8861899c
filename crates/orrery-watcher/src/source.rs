//! Where the file list and dependency edges come from

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use notify::RecursiveMode;
use orrery_core::{BuildOutcome, EntryType, FileEntry, Snapshot, build};
use tracing::{debug, warn};

use crate::watcher::should_ignore_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Files and edges from one snapshot file (JSON, or YAML by extension).
    Snapshot(PathBuf),
    /// Files from walking `root`; edges from an optional snapshot.
    Tree { root: PathBuf, edges: Option<PathBuf> },
}

impl Source {
    /// Same source with absolute paths, so watch events can be matched against it.
    pub fn canonical(&self) -> Result<Self> {
        let canon = |p: &Path| std::fs::canonicalize(p).with_context(|| format!("cannot resolve {}", p.display()));
        Ok(match self {
            Source::Snapshot(path) => Source::Snapshot(canon(path)?),
            Source::Tree { root, edges } => Source::Tree {
                root: canon(root)?,
                edges: edges.as_deref().map(canon).transpose()?,
            },
        })
    }

    pub fn load(&self) -> Result<Snapshot> {
        match self {
            Source::Snapshot(path) => Ok(Snapshot::load(path)?),
            Source::Tree { root, edges } => {
                let mut snapshot = match edges {
                    Some(path) => Snapshot::load(path)?,
                    None => Snapshot::default(),
                };
                let mut files = scan_tree(root)?;
                files.append(&mut snapshot.files);
                snapshot.files = files;
                Ok(snapshot)
            }
        }
    }

    /// Load and build under `budget`.
    pub fn build(&self, budget: usize) -> Result<BuildOutcome> {
        let snapshot = self.load()?;
        debug!(
            "Loaded {} files and {} edges",
            snapshot.files.len(),
            snapshot.edges.len()
        );
        Ok(build(&snapshot.files, &snapshot.edges, budget))
    }

    /// Paths to hand to the watcher. Snapshot files are watched through their
    /// directory so atomic replace-on-save is seen.
    pub fn watch_targets(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let parent_of = |p: &Path| {
            p.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };
        match self {
            Source::Snapshot(path) => vec![(parent_of(path), RecursiveMode::NonRecursive)],
            Source::Tree { root, edges } => {
                let mut targets = vec![(root.clone(), RecursiveMode::Recursive)];
                if let Some(edges) = edges.as_deref().filter(|e| !e.starts_with(root)) {
                    targets.push((parent_of(edges), RecursiveMode::NonRecursive));
                }
                targets
            }
        }
    }

    /// Whether a change at `path` can affect the build.
    pub fn is_relevant(&self, path: &Path) -> bool {
        let same_file = |snapshot: &Path| path.file_name().is_some() && path.file_name() == snapshot.file_name();
        match self {
            Source::Snapshot(snapshot) => same_file(snapshot),
            Source::Tree { root, edges } => {
                if edges.as_deref().is_some_and(same_file) {
                    return true;
                }
                match path.strip_prefix(root) {
                    Ok(rel) => !should_ignore_path(rel) && !is_hidden(rel),
                    Err(_) => false,
                }
            }
        }
    }
}

fn is_hidden(rel: &Path) -> bool {
    rel.components()
        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')))
}

/// Walk `root` respecting `.gitignore`, returning entries relative to `root`
/// with forward slashes, sorted by path.
pub fn scan_tree(root: &Path) -> Result<Vec<FileEntry>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }
    let mut entries = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if should_ignore_path(rel) {
            continue;
        }
        let entry_type = if entry.file_type().is_some_and(|t| t.is_dir()) {
            EntryType::Tree
        } else {
            EntryType::Blob
        };
        let path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(FileEntry { path, entry_type });
    }
    debug!("Scanned {} entries under {}", entries.len(), root.display());
    Ok(entries)
}
