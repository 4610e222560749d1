//! API error types with HTTP response mapping.

use app::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Workflow error surfaced by the application layer.
    App(AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::App(err) => app_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn app_error_to_response(err: AppError) -> (StatusCode, String) {
    match &err {
        AppError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AppError::InvalidTransition(_) | AppError::InvalidState(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        AppError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, err.to_string()),
        AppError::Storage(_) => {
            // Storage detail goes to the log, not the response body.
            tracing::error!(error = %err, "storage error while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}
