//! HTTP error response conversion
//!
//! Only failures attributable to a whole request surface here (a malformed batch).
//! Per-record failures are counted in the batch summary instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallery_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether redelivering the request could succeed
    pub recoverable: bool,
}

/// Wrapper so `AppError` can implement `IntoResponse` in this crate.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.to_string(),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_a_bad_request() {
        let response =
            HttpAppError(AppError::InvalidInput("Malformed storage event batch".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_are_server_errors() {
        let response = HttpAppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
