//! notify bridge: input changes arrive on a tokio channel

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

/// A change to something that may feed the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Changed(path) | WatchEvent::Removed(path) => path,
        }
    }

    fn from_notify(kind: &EventKind) -> Option<fn(PathBuf) -> WatchEvent> {
        match kind {
            EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Changed),
            EventKind::Remove(_) => Some(WatchEvent::Removed),
            // Access and metadata-only events never change inputs.
            _ => None,
        }
    }
}

pub struct FileWatcher {
    inner: RecommendedWatcher,
    changes: mpsc::UnboundedReceiver<WatchEvent>,
    targets: BTreeSet<PathBuf>,
}

impl FileWatcher {
    /// Start watching every `(path, mode)` pair.
    pub fn on(targets: &[(PathBuf, RecursiveMode)]) -> Result<Self> {
        let (tx, changes) = mpsc::unbounded_channel();
        let inner = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {}", e);
                    return;
                }
            };
            trace!("notify: {:?}", event);
            let Some(wrap) = WatchEvent::from_notify(&event.kind) else {
                return;
            };
            for path in event.paths {
                // The receiver only goes away when the watcher is dropped.
                let _ = tx.send(wrap(path));
            }
        })
        .context("cannot create filesystem watcher")?;

        let mut watcher = FileWatcher {
            inner,
            changes,
            targets: BTreeSet::new(),
        };
        for (path, mode) in targets {
            watcher.add(path, *mode)?;
        }
        Ok(watcher)
    }

    /// Watch one more path. Already watched paths are left alone.
    pub fn add(&mut self, path: &Path, mode: RecursiveMode) -> Result<()> {
        if self.targets.contains(path) {
            return Ok(());
        }
        self.inner
            .watch(path, mode)
            .with_context(|| format!("cannot watch {}", path.display()))?;
        info!("Watching {} ({:?})", path.display(), mode);
        self.targets.insert(path.to_path_buf());
        Ok(())
    }

    pub fn targets(&self) -> impl Iterator<Item = &Path> {
        self.targets.iter().map(PathBuf::as_path)
    }

    /// Wait for the next change. `None` once notify has shut down.
    pub async fn next_change(&mut self) -> Option<WatchEvent> {
        self.changes.recv().await
    }

    /// Discard queued changes, returning how many there were.
    pub fn drain_pending(&mut self) -> usize {
        let mut dropped = 0;
        while self.changes.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Coalesced {} queued changes", dropped);
        }
        dropped
    }
}

/// Build output, VCS and vendored dependency directories.
pub fn should_ignore_path(path: &Path) -> bool {
    path.components().any(|component| {
        matches!(
            component.as_os_str().to_str(),
            Some("target" | ".git" | "node_modules" | "dist")
        )
    })
}
