//! # Health Handler

use crate::chat::ChatAppState;
use axum::{extract::State, Json};
use lib_utils::now_utc;
use shared::dto::HealthResponse;
use std::sync::Arc;

/// Liveness probe.
///
/// **Route**: `GET /health`
pub async fn health(State(state): State<Arc<ChatAppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_utc(),
        connections: state.relay.connection_count().await,
    })
}
