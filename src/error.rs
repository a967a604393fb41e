// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse};
use std::fmt::Display;

use crate::database::DatabaseError;
use crate::resources::FieldViolation;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Bodies are plain text. Internal detail is logged, never returned.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(Vec<FieldViolation>),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthenticated(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message. Validation errors list one violation per line.
    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationError(violations) => violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => msg.clone(),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(violations: Vec<FieldViolation>) -> Self {
        ApiError::ValidationError(violations)
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("Unauthenticated".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Log an unexpected failure under `tag` and hide it behind a generic 500
    pub fn internal(tag: &str, err: impl Display) -> Self {
        tracing::error!("{} {}", tag, err);
        ApiError::internal_server_error("Internal error")
    }

    /// Map a persistence failure for the operation identified by `tag`
    pub fn from_database(tag: &str, err: DatabaseError) -> Self {
        match err {
            DatabaseError::ForeignKey(detail) => {
                tracing::warn!("{} {}", tag, detail);
                ApiError::conflict("Referenced record is missing or still in use")
            }
            other => ApiError::internal(tag, other),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), self.message()).into_response()
    }
}
