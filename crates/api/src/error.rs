//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AccountError, DomainError, MovementTypeError};
use event_store::EventStoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Account(account_err) => match account_err {
            AccountError::NotOpened => (StatusCode::NOT_FOUND, err.to_string()),
            AccountError::AlreadyOpened
            | AccountError::AccountClosed
            | AccountError::NonZeroBalance(_) => (StatusCode::CONFLICT, err.to_string()),
            AccountError::InvalidAmount(_)
            | AccountError::NegativeStartingBalance(_)
            | AccountError::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        DomainError::MovementType(movement_err) => match movement_err {
            MovementTypeError::AlreadyRegistered => (StatusCode::CONFLICT, err.to_string()),
            MovementTypeError::EmptyDescription => (StatusCode::BAD_REQUEST, err.to_string()),
        },
        DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
