//! WebSocket handling: frames out, interactions in

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use orrery_core::{LayoutMode, NodeId, Viewport};
use orrery_interact::{Frame, Interaction, SessionEvent};
use orrery_layout::Point;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;

/// Server → client messages
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Frame { frame: Frame },
    NodeSelected { id: NodeId },
    Pong,
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self)
            .map_err(|e| warn!("Failed to serialize server message: {}", e))
            .ok()
    }
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Selected(id) => ServerMessage::NodeSelected { id },
        }
    }
}

/// Client → server messages. Pointer coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        node: Option<NodeId>,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Search {
        query: String,
    },
    Select {
        #[serde(default)]
        node: Option<NodeId>,
    },
    SetLayout {
        mode: LayoutMode,
    },
    Resize {
        width: f64,
        height: f64,
    },
    Zoom {
        factor: f64,
        x: f64,
        y: f64,
    },
    Fit,
    Ping,
}

impl ClientMessage {
    /// The session interaction this message stands for; `None` for keepalives.
    pub fn into_interaction(self) -> Option<Interaction> {
        let interaction = match self {
            ClientMessage::PointerDown { x, y, node } => Interaction::PointerDown {
                at: Point::new(x, y),
                node,
            },
            ClientMessage::PointerMove { x, y } => Interaction::PointerMove { at: Point::new(x, y) },
            ClientMessage::PointerUp => Interaction::PointerUp,
            ClientMessage::Search { query } => Interaction::Search(query),
            ClientMessage::Select { node } => Interaction::Select(node),
            ClientMessage::SetLayout { mode } => Interaction::SetLayout(mode),
            ClientMessage::Resize { width, height } => Interaction::Resize(Viewport::new(width, height)),
            ClientMessage::Zoom { factor, x, y } => Interaction::Zoom {
                factor,
                at: Point::new(x, y),
            },
            ClientMessage::Fit => Interaction::Fit,
            ClientMessage::Ping => return None,
        };
        Some(interaction)
    }
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.frame_tx.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    // Current frame right away so the client can draw before the next tick
    let frame = state.session.lock().await.render();
    if let Some(json) = (ServerMessage::Frame { frame }).to_json() {
        if sender.send(Message::Text(json)).await.is_err() {
            warn!("Failed to send initial frame to WebSocket client");
            return;
        }
    }

    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    if let Some(reply) = handle_client_text(&text, &state_clone).await {
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                reply = reply_rx.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                broadcast = rx.recv() => match broadcast {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind by {} messages", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };
            if sender.send(Message::Text(msg)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket connection closed");
}

/// Queue the interaction a client message carries. Returns a direct reply, if any.
pub async fn handle_client_text(text: &str, state: &ServerState) -> Option<String> {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to parse WebSocket message: {}", e);
            return ServerMessage::Error {
                message: format!("invalid message: {e}"),
            }
            .to_json();
        }
    };
    match msg.into_interaction() {
        Some(interaction) => {
            state.session.lock().await.submit(interaction);
            None
        }
        None => ServerMessage::Pong.to_json(),
    }
}
