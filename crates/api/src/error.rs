use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portfolio_core::error::CoreError;
use portfolio_db::DbError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`DbError`] for backend errors,
/// and adds HTTP-specific variants. Its [`IntoResponse`] impl is the single
/// place where failures become status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `portfolio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database-layer error.
    #[error(transparent)]
    Database(#[from] DbError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_error()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_db_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "message": message,
            "error": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a database-layer error into an HTTP status, error code, and message.
///
/// - `Unavailable` maps to 503.
/// - Everything else maps to 500 with a sanitized message; the detail goes
///   to the log only.
fn classify_db_error(err: &DbError) -> (StatusCode, &'static str, String) {
    match err {
        DbError::Unavailable(reason) => {
            tracing::warn!(reason = %reason, "Database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "CONNECTION_UNAVAILABLE",
                "The database connection is not available. Please try again later.".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BACKEND_ERROR",
                "A database error occurred".to_string(),
            )
        }
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
