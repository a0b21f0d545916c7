//! # System Data Transfer Objects
//!
//! Response bodies for the liveness and model catalog endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness response (`GET /health`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Number of joined participants
    pub connections: usize,
}

/// Models offered to clients (`GET /api/models`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelsResponse {
    pub default_model: String,
    pub models: Vec<String>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
