//! Error types for gnomercy-mc

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::identity::IdentityError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required collaborator is not configured (503)
    #[error("Not configured: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<gnomercy_common::Error> for ApiError {
    fn from(err: gnomercy_common::Error) -> Self {
        match err {
            gnomercy_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            gnomercy_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            gnomercy_common::Error::Config(msg) => ApiError::Config(msg),
            gnomercy_common::Error::Io(err) => ApiError::Io(err),
            gnomercy_common::Error::Database(err) => ApiError::Internal(err.to_string()),
            gnomercy_common::Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotConfigured => ApiError::Config(err.to_string()),
            IdentityError::Rejected => ApiError::Unauthorized(err.to_string()),
            IdentityError::Network(msg) => {
                ApiError::Internal(format!("Identity service unreachable: {msg}"))
            }
            IdentityError::Protocol(msg) => {
                ApiError::Internal(format!("Identity service error: {msg}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Config(msg) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
