//! # Chat Query Handlers
//!
//! Read-only HTTP views of the relay.
//!
//! ## Endpoints
//!
//! - `GET /api/history` - Most recent chat events, oldest first (at most 50)
//! - `GET /api/users` - Participants currently online, in join order
//! - `GET /api/models` - Models offered to clients and the default one
//!
//! ```bash
//! curl http://localhost:3001/api/history
//! ```

use crate::chat::ChatAppState;
use axum::{extract::State, Json};
use lib_core::config::AVAILABLE_MODELS;
use shared::dto::{ChatEvent, ModelsResponse, Participant};
use std::sync::Arc;
use tracing::debug;

/// **Route**: `GET /api/history`
pub async fn get_history(State(state): State<Arc<ChatAppState>>) -> Json<Vec<ChatEvent>> {
    let events = state.relay.recent_history().await;
    debug!(count = events.len(), "[CHAT] history query");
    Json(events)
}

/// **Route**: `GET /api/users`
pub async fn get_users(State(state): State<Arc<ChatAppState>>) -> Json<Vec<Participant>> {
    Json(state.relay.participants().await)
}

/// **Route**: `GET /api/models`
///
/// The list is advisory; `llm_message` forwards any model name as given.
pub async fn get_models(State(state): State<Arc<ChatAppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        default_model: state.config.default_model.clone(),
        models: AVAILABLE_MODELS.iter().map(|m| m.to_string()).collect(),
    })
}
