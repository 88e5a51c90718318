use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bytes::Bytes;
use gallery_processing::StorageEventBatch;
use std::sync::Arc;

/// Receive a storage notification batch.
///
/// Responds 400 only when the body is not a batch. Records that fail are counted
/// in the returned summary and still answer 200, so the sender does not redeliver
/// records that already succeeded.
#[tracing::instrument(skip(state, body), fields(body_bytes = body.len()))]
pub async fn receive_storage_events(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let batch = StorageEventBatch::from_slice(&body)?;
    tracing::debug!(records = batch.len(), "Storage event batch received");

    let summary = state.router.handle_batch(&batch).await;

    Ok((StatusCode::OK, Json(summary)))
}
