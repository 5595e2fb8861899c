//! The one task that ticks the session and broadcasts frames

use std::sync::Arc;
use std::time::Duration;

use orrery_core::BuildOutcome;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::ServerState;
use crate::websocket::ServerMessage;

/// Ticks the shared session on a fixed period until stopped.
pub struct SimulationLoop {
    handle: JoinHandle<()>,
}

impl SimulationLoop {
    pub fn spawn(
        state: Arc<ServerState>,
        rebuilds: mpsc::UnboundedReceiver<BuildOutcome>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(run(state, rebuilds, period));
        SimulationLoop { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task and stop the simulation. Nothing ticks afterwards.
    pub async fn stop(self, state: &ServerState) {
        self.handle.abort();
        let _ = self.handle.await;
        state.session.lock().await.stop();
        info!("Simulation loop stopped");
    }
}

async fn run(state: Arc<ServerState>, mut rebuilds: mpsc::UnboundedReceiver<BuildOutcome>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rebuilds_open = true;
    loop {
        tokio::select! {
            outcome = rebuilds.recv(), if rebuilds_open => match outcome {
                Some(outcome) => {
                    let diff = state.session.lock().await.rebuild(outcome);
                    debug!("Merged rebuild #{} (structural: {})", diff.sequence, diff.is_structural());
                }
                None => rebuilds_open = false,
            },
            _ = ticker.tick() => {
                step(&state).await;
            }
        }
    }
}

/// One tick: frame the session if it has work, then broadcast.
pub async fn step(state: &ServerState) -> bool {
    let (frame, events) = {
        let mut session = state.session.lock().await;
        if !session.is_active() {
            return false;
        }
        let frame = session.frame();
        (frame, session.take_events())
    };
    let messages = std::iter::once(ServerMessage::Frame { frame }).chain(events.into_iter().map(ServerMessage::from));
    for msg in messages {
        if let Some(json) = msg.to_json() {
            // No subscribers is fine
            let _ = state.broadcast(json);
        }
    }
    true
}
