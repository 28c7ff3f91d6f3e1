use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum Error {
    // Rejected at the boundary, before any handler logic runs
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    // Session middleware failures
    #[error("no session token on request")]
    AuthFailNoToken,
    #[error("session token invalid or expired")]
    AuthFailTokenExpired,
    #[error("auth context missing from request")]
    AuthFailCtxNotInRequestExt,

    // Auth endpoint failures
    #[error("email already registered")]
    UserAlreadyExists,
    #[error("no user for that email")]
    UserNotRegistered,
    #[error("password mismatch")]
    IncorrectPassword,
    #[error("no user behind a valid token")]
    UserMissing,
    #[error("token identity mismatch")]
    PermissionDenied,

    // Trips
    #[error("trip not found")]
    TripNotFound,
    #[error("trip owned by another user")]
    TripAccessDenied,

    // External AI provider
    #[error("completion provider failed: {0}")]
    Completion(String),

    // Generic
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            Error::AuthFailNoToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Token Not Received" }),
            ),
            Error::AuthFailTokenExpired => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Token Expired" }),
            ),
            Error::AuthFailCtxNotInRequestExt => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Auth context missing" }),
            ),
            Error::UserAlreadyExists => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "User already exists" }),
            ),
            Error::UserNotRegistered => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "User not registered" }),
            ),
            Error::IncorrectPassword => (
                StatusCode::FORBIDDEN,
                json!({ "message": "Incorrect password" }),
            ),
            Error::UserMissing => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "User not registered OR token malfunctioned" }),
            ),
            Error::PermissionDenied => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Permission denied" }),
            ),
            Error::TripNotFound => {
                (StatusCode::NOT_FOUND, json!({ "message": "Trip not found" }))
            }
            Error::TripAccessDenied => (
                StatusCode::FORBIDDEN,
                json!({ "message": "Permission denied" }),
            ),
            Error::Completion(_) | Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Something went wrong" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// Store and provider internals surface as anyhow; collapse them to a 500
// without leaking detail to the client.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
