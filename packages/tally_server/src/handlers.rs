use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;

/// Current tally status of the monitored input
pub async fn tally_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.tally.report())
}

/// Health check endpoint - reports switcher connection and listener counters
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.stats.snapshot())
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}
