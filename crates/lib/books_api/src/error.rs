//! Application error types.
//!
//! Every error body is `{"error": "<message>"}`. Downstream failures are
//! logged with their cause and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use books_core::auth::AuthError;
use books_core::catalog::{CatalogError, ReviewError};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        warn!(error = %e, "book operation failed");
        AppError::NotFound("book operation failed".into())
    }
}

impl From<ReviewError> for AppError {
    fn from(e: ReviewError) -> Self {
        warn!(error = %e, "review operation failed");
        AppError::NotFound("review operation failed".into())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        warn!(error = %e, "user operation failed");
        AppError::NotFound("user operation failed".into())
    }
}
