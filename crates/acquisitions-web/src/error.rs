use acquisitions_core::{CoreError, ValidationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Why the security layer refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Bot,
    Shield,
    RateLimit,
}

#[derive(Debug)]
pub enum AppError {
    /// 400 with the joined validation issues in `details`.
    Validation(String),
    /// 401 raised by the authentication extractor.
    Unauthenticated(String),
    /// 401 for a wrong email or password.
    InvalidCredentials,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// 413 for a body over the request size limit.
    PayloadTooLarge,
    Blocked(BlockReason),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed", "details": details }),
            ),
            AppError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, json!({ "message": msg }))
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Invalid email or password" }),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Request body too large" }),
            ),
            AppError::Blocked(BlockReason::Bot) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Forbidden",
                    "message": "Automated requests are not allowed",
                }),
            ),
            AppError::Blocked(BlockReason::Shield) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Forbidden",
                    "message": "Request blocked by security policy",
                }),
            ),
            AppError::Blocked(BlockReason::RateLimit) => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Too Many Requests",
                    "message": "Rate limit exceeded. Please try again later.",
                }),
            ),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(format!("{e:#}"))
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.details())
    }
}

impl From<CoreError> for AppError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmailTaken => AppError::Conflict(CoreError::EmailTaken.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {e}"))
    }
}
