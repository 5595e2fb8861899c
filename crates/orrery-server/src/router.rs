//! Axum router setup for the Orrery server

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{get_blast, get_frame, get_stats, health_check},
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for frames and interactions
        .route("/ws", get(ws_handler))
        // REST API endpoints
        .route("/api/health", get(health_check))
        .route("/api/frame", get(get_frame))
        .route("/api/stats", get(get_stats))
        // Node ids are paths, so take the rest of the URL
        .route("/api/blast/*id", get(get_blast))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
