//! Application error types
//!
//! Every failure surfaced to a client is mapped onto `AppError`, which
//! renders as a JSON envelope `{"error": <message>}`. When debug traces are
//! enabled the envelope carries an additional `trace` field.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;

/// Convenient result alias for handler and service code
pub type AppResult<T> = Result<T, AppError>;

/// Whether error responses include a backtrace-style trace field.
/// Set once at startup from the debug config flag.
static DEBUG_TRACES: OnceCell<bool> = OnceCell::new();

/// Enable or disable trace fields on error responses. First call wins.
pub fn set_debug_traces(enabled: bool) {
    let _ = DEBUG_TRACES.set(enabled);
}

fn debug_traces_enabled() -> bool {
    DEBUG_TRACES.get().copied().unwrap_or(false)
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures keep their detail in the
    /// logs and return a generic message.
    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        let trace = if debug_traces_enabled() {
            Some(format!("{:?}", self))
        } else {
            None
        };

        let body = ErrorResponse {
            error: self.client_message(),
            trace,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Map database errors onto client-facing kinds where the cause is the
/// client's request rather than the server.
pub fn map_db_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Resource already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}
