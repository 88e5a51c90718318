use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Liveness check: the process is running and the pipeline is wired.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "storage": state.storage_backend.to_string(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
