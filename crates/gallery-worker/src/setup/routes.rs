//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Notification batches carry keys, never object bytes.
const MAX_EVENT_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/events/storage",
            post(handlers::storage_events::receive_storage_events),
        )
        .layer(RequestBodyLimitLayer::new(MAX_EVENT_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
