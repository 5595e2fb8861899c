//! HTTP + WebSocket server

pub mod error;
pub mod handlers;
pub mod router;
pub mod simulation_loop;
pub mod websocket;


use std::sync::Arc;
use std::time::Duration;

use orrery_core::BuildOutcome;
use orrery_interact::Session;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast, mpsc};
use tracing::info;

pub use error::ServerError;
pub use simulation_loop::SimulationLoop;
pub use websocket::{ClientMessage, ServerMessage};

/// Frames dropped for a slow client before it is told it lagged.
const BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Period of the simulation loop.
    pub tick_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7890,
            tick_interval: Duration::from_millis(16),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared between handlers, sockets and the simulation loop.
pub struct ServerState {
    pub session: Mutex<Session>,
    /// Serialized [`ServerMessage`]s for every connected client.
    pub frame_tx: broadcast::Sender<String>,
}

impl ServerState {
    pub fn new(session: Session) -> Self {
        let (frame_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        ServerState {
            session: Mutex::new(session),
            frame_tx,
        }
    }

    /// Send to every subscriber. Errors only when nobody is listening.
    pub fn broadcast(&self, msg: String) -> Result<usize, broadcast::error::SendError<String>> {
        self.frame_tx.send(msg)
    }
}

pub struct OrreryServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl OrreryServer {
    pub fn new(session: Session, config: ServerConfig) -> Self {
        OrreryServer {
            state: Arc::new(ServerState::new(session)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Bind, start the simulation loop and serve until the listener fails.
    /// Rebuilt graphs arriving on `rebuilds` are merged into the live session.
    pub async fn start(self, rebuilds: mpsc::UnboundedReceiver<BuildOutcome>) -> anyhow::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
        info!("Listening on http://{}", listener.local_addr()?);

        let sim_loop = SimulationLoop::spawn(self.state(), rebuilds, self.config.tick_interval);
        let app = router::create_router(self.state());
        let served = axum::serve(listener, app).await;
        sim_loop.stop(&self.state).await;
        served?;
        Ok(())
    }
}
