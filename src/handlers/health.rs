//! Health check endpoint for service monitoring.

use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Game server payments are forwarded to
    pub game_server: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// Reports liveness only; the game server is not contacted.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "gameServer": "http://localhost:7998/api/payment/process",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        game_server: state.config.game_server_endpoint(),
        timestamp: Utc::now(),
    })
}
