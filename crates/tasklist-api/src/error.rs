//! API error type. Every handler returns `Result<_, ApiError>` and the
//! conversion to a status code happens here, in one place.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use tasklist_db::DbError;

/// Status used for ownership violations. Clients of the service treat a
/// rejected mutation as a bad request, so this stays 400 rather than 403.
pub const FORBIDDEN_STATUS: StatusCode = StatusCode::BAD_REQUEST;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, missing field, invalid owner (400)
    #[error("{0}")]
    Validation(String),

    /// Acting user does not own the resource (FORBIDDEN_STATUS)
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    /// Missing/invalid token or bad credentials (401)
    #[error("unauthorized")]
    Unauthorized,

    /// Database error (500, logged)
    #[error(transparent)]
    Database(DbError),

    /// Internal error (500, logged)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => FORBIDDEN_STATUS,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                "an internal error occurred".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": self.kind(),
            "message": message,
        });

        (self.status(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}
