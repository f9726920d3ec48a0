//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps workflow errors from twx-state and validation errors from twx-core
//! to HTTP status codes with a JSON body of code, message, and details.
//! Internal error messages are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twx_state::TransitionError;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "REASON_REQUIRED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Transition needs a reason and none was given (422).
    #[error("{0}")]
    ReasonRequired(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure: missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure: insufficient permissions (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Illegal transition from the current status (409).
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
        /// Legal target statuses, when the conflict is a transition.
        allowed: Option<Vec<String>>,
    },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A plain conflict without transition details.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            allowed: None,
        }
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::ReasonRequired(_) => (StatusCode::UNPROCESSABLE_ENTITY, "REASON_REQUIRED"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict { .. } => (StatusCode::CONFLICT, "CONFLICT"),
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
            Self::Conflict {
                allowed: Some(allowed),
                ..
            } => Some(serde_json::json!({ "allowed": allowed })),
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

/// Convert twx-core validation errors to API errors.
impl From<twx_core::ValidationError> for AppError {
    fn from(err: twx_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert transition errors to API errors.
///
/// Illegal edges are conflicts with the current status; role failures are
/// forbidden; missing reasons are unprocessable.
impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match &err {
            TransitionError::TerminalState { .. } => Self::Conflict {
                message: err.to_string(),
                allowed: Some(Vec::new()),
            },
            TransitionError::InvalidTransition { allowed, .. } => Self::Conflict {
                message: err.to_string(),
                allowed: Some(
                    allowed
                        .split(", ")
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                ),
            },
            TransitionError::NotPermitted { .. } => Self::Forbidden(err.to_string()),
            TransitionError::ReasonRequired { .. } => Self::ReasonRequired(err.to_string()),
        }
    }
}
