//! REST API handlers for the Orrery server

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use orrery_core::{BuildReport, GraphStats, NodeId};
use orrery_interact::Frame;
use serde::Serialize;

use crate::{ServerError, ServerState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct BlastResponse {
    pub origin: NodeId,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: GraphStats,
    pub skipped_edges: usize,
    pub pruned: usize,
    pub degraded: bool,
}

impl StatsResponse {
    pub fn new(stats: GraphStats, report: &BuildReport) -> Self {
        StatsResponse {
            stats,
            skipped_edges: report.skipped.len(),
            pruned: report.pruned,
            degraded: report.degraded,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}

/// The current frame, rendered without advancing the simulation
pub async fn get_frame(State(state): State<Arc<ServerState>>) -> Json<Frame> {
    let session = state.session.lock().await;
    Json(session.render())
}

pub async fn get_stats(State(state): State<Arc<ServerState>>) -> Json<StatsResponse> {
    let session = state.session.lock().await;
    Json(StatsResponse::new(session.graph().stats(), session.report()))
}

/// Blast radius of one node
pub async fn get_blast(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<BlastResponse>, ServerError> {
    let origin = NodeId(id);
    let session = state.session.lock().await;
    if !session.graph().contains_node(&origin) {
        return Err(ServerError::UnknownNode(origin.0));
    }
    let nodes = session.blast_radius(&origin);
    Ok(Json(BlastResponse { origin, nodes }))
}
