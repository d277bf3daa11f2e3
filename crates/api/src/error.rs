use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use datapace_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the wire format
/// `{ "error": <code>, "error_description": <text> }`, with an extra
/// `"missing"` list for template-field validation.
///
/// Status mapping follows the existing-client contract: validation,
/// ownership lookups, conflicts, upstream wallet failures, and unique
/// violations are all 400s; only token problems are 401 and only the
/// explicitly carved-out resource paths are 404.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `datapace_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Template payload validation failure carrying the exact list of
    /// missing fields.
    #[error("Missing required fields")]
    MissingFields(Vec<String>),

    /// The small set of paths that return a real 404 (template fetch
    /// with no active revision, record history delete, notification
    /// caller with no organisation).
    #[error("Not found: {0}")]
    ResourceNotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::MissingFields(missing) = &self {
            let body = json!({
                "error": "invalid_request",
                "error_description": "Missing mandatory fields in the template document",
                "missing": missing,
            });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
                }
                // 400 by convention, not 404: existing clients key off it.
                CoreError::NotFound(msg) => (StatusCode::BAD_REQUEST, "not_found", msg.clone()),
                CoreError::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "invalid_token", msg.clone())
                }
                CoreError::Upstream(msg) => {
                    (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::ResourceNotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", msg.clone())
            }

            AppError::MissingFields(_) => unreachable!("handled above"),
        };

        let body = json!({
            "error": code,
            "error_description": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 400 `not_found` per the system convention.
/// - Unique constraint violations map to 400 `duplicate_name`.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::BAD_REQUEST,
            "not_found",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return (
                    StatusCode::BAD_REQUEST,
                    "duplicate_name",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            )
        }
    }
}
