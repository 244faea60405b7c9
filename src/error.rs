//! Typed error taxonomy for the API.
//!
//! The storage layer returns these directly (or wraps them in anyhow);
//! the axum handlers render them into HTTP responses. Nothing here is
//! fatal to the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more payload fields failed shape validation.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// A referenced user or task does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The acting user does not own the target task.
    #[error("permission denied")]
    PermissionDenied,

    /// The operation conflicts with the task's current state
    /// (deleting a completed task).
    #[error("{0}")]
    Conflict(String),

    /// Missing or unusable bearer token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Anything unexpected from the storage layer.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn task_not_found() -> Self {
        ApiError::NotFound("task")
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound("user")
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{what} not found") })),
            )
                .into_response(),
            ApiError::PermissionDenied => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Permission denied" })),
            )
                .into_response(),
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Unauthorized(reason) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": reason }))).into_response()
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Result alias used by the storage layer and handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
