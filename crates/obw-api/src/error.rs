//! # API Error Types
//!
//! Maps engine errors to HTTP status codes and a structured JSON body:
//!
//! ```json
//! { "error": { "code": "READINESS_BLOCKED", "message": "...", "details": { ... } } }
//! ```
//!
//! A blocked publish carries its full readiness report in `details`.
//! Internal error messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use obw_engine::{EngineError, ReadinessReport};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Field-level validation failed (422).
    #[error("{0}")]
    Validation(String),

    /// Malformed request or operation not allowed in the current state (400).
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Conflict with the current resource state (409).
    #[error("{0}")]
    Conflict(String),

    /// Publish refused; the report lists every check.
    #[error("Plan version is not ready to publish")]
    ReadinessBlocked(ReadinessReport),

    /// Message is logged but not returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ReadinessBlocked(_) => (StatusCode::UNPROCESSABLE_ENTITY, "READINESS_BLOCKED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };
        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match &self {
            Self::ReadinessBlocked(report) => serde_json::to_value(report).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(m) => Self::NotFound(m),
            EngineError::Conflict(m) => Self::Conflict(m),
            EngineError::BadRequest(m) => Self::BadRequest(m),
            EngineError::Validation(e) => Self::Validation(e.to_string()),
            EngineError::ReadinessBlocked(report) => Self::ReadinessBlocked(report),
            EngineError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<obw_core::ValidationError> for AppError {
    fn from(err: obw_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
