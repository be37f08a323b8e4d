//! Error handling for the dashboard API.
//!
//! Dashboard queries are read-only, so a failed statement needs no rollback or
//! compensation: the whole report batch is aborted, the cause is logged
//! server-side, and the client receives an opaque `500 {"error": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body returned to clients: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Dashboard query failed");
                "Failed to fetch dashboard data"
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred"
            }
        };

        let body = ErrorBody {
            error: message.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.to_string(), "Internal error: pool exhausted");
    }

    #[test]
    fn app_error_from_sqlx() {
        let sqlx_err = sqlx::Error::RowNotFound;
        let err: AppError = sqlx_err.into();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorBody {
            error: "Failed to fetch dashboard data".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Failed to fetch dashboard data");
    }
}
