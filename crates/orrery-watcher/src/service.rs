//! Rebuild the graph whenever its inputs change

use std::time::Duration;

use anyhow::Result;
use orrery_core::BuildOutcome;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::source::Source;
use crate::watcher::FileWatcher;

/// Quiet period after the first event of a burst before rebuilding.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Watches a [`Source`] and sends a fresh [`BuildOutcome`] after each change.
pub struct RebuildService {
    watcher: FileWatcher,
    source: Source,
    budget: usize,
    debounce: Duration,
    tx: mpsc::UnboundedSender<BuildOutcome>,
}

impl RebuildService {
    pub fn new(source: &Source, budget: usize, tx: mpsc::UnboundedSender<BuildOutcome>) -> Result<Self> {
        let source = source.canonical()?;
        let watcher = FileWatcher::on(&source.watch_targets())?;
        Ok(Self {
            watcher,
            source,
            budget,
            debounce: DEFAULT_DEBOUNCE,
            tx,
        })
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Build and send now. A failed load keeps the previous graph live.
    /// Returns `false` once the receiver is gone.
    pub fn rebuild_now(&self) -> bool {
        match self.source.build(self.budget) {
            Ok(outcome) => {
                info!(
                    "Rebuilt graph: {} nodes, {} edges",
                    outcome.graph.node_count(),
                    outcome.graph.edge_count()
                );
                self.tx.send(outcome).is_ok()
            }
            Err(e) => {
                warn!("Rebuild failed, keeping the current graph: {:#}", e);
                !self.tx.is_closed()
            }
        }
    }

    /// Process change events until the receiver is dropped or the watcher dies.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let Some(event) = self.watcher.next_change().await else {
                break;
            };
            if !self.source.is_relevant(event.path()) {
                continue;
            }
            debug!("Relevant change: {:?}", event);
            tokio::time::sleep(self.debounce).await;
            self.watcher.drain_pending();
            if !self.rebuild_now() {
                info!("Rebuild receiver closed, watcher exiting");
                break;
            }
        }
        Ok(())
    }
}
