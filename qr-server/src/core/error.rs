//! Unified Error Handling
//!
//! One closed error-kind enumeration for the whole service. Callers branch on
//! the kind, never on message text; messages stay human-readable and carry
//! the offending identifier.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// A required field was empty or whitespace after trimming, or the
    /// request shape itself was malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor, category, or QR does not exist in the expected state.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate natural key, or a domain invariant would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The code generator ran out of attempts without finding a free code.
    #[error("code space exhausted after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    /// The backing store failed; not retried, surfaced immediately.
    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // a garbage next_token is the caller's mistake, not ours
            StoreError::BadContinuation => {
                AppError::Validation("invalid pagination token".to_string())
            }
            other => AppError::Store(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::CodeSpaceExhausted { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "code_space_exhausted")
            }
            AppError::Store(msg) => {
                tracing::error!(target: "store", error = %msg, "store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Application-level Result type
pub type AppResult<T> = Result<T, AppError>;
