//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Result type alias for server operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application-level errors used outside the feature slices (middleware,
/// router fallback, shared handlers). Features define their own error enums
/// and map them to HTTP responses in their routes.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::NotFound(ref message) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
            }
            AppError::Unauthorized(ref message) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.clone())
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    message.clone(),
                )
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
