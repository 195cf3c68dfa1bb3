use axum::extract::State;
use axum::Json;

use crate::dto::{HealthResponse, MessageResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> &'static str {
    "Hello from Acquisitions!"
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// GET /api
pub async fn api_status() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ACQUISITIONS-JSM API is running!",
    })
}
