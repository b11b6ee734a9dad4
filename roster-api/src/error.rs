//! Error types for roster-api
//!
//! Maps the shared error taxonomy onto HTTP responses. Validation and
//! not-found errors are returned to the caller as client errors; storage
//! failures are logged and surfaced as 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_common::ValidationErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be parsed into the expected shape (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// One or more fields failed validation (400)
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Referenced record does not exist (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backing store unreachable or failed (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<roster_common::Error> for ApiError {
    fn from(err: roster_common::Error) -> Self {
        use roster_common::Error;
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::NotFound(what) => ApiError::NotFound(what),
            Error::Database(e) => ApiError::Storage(e.to_string()),
            Error::Io(e) => ApiError::Storage(e.to_string()),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let mut error_body = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let ApiError::Validation(errors) = &self {
            error_body["fields"] = json!(errors);
        }

        (status, Json(json!({ "error": error_body }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
