//! API error types with HTTP response mapping.

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid bearer token.
    Unauthorized,
    /// Store-level error.
    Store(StoreError),
    /// Auth-level error.
    Auth(AuthError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Auth(err) => auth_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::ProductNotFound(_) | StoreError::UserNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        StoreError::InsufficientStock { .. }
        | StoreError::EmailTaken(_)
        | StoreError::ProductInUse(_) => (StatusCode::CONFLICT, err.to_string()),
        StoreError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Transaction(_) | StoreError::Migration(_) => {
            tracing::error!(error = %err, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn auth_error_to_response(err: AuthError) -> (StatusCode, String) {
    match &err {
        AuthError::InvalidCredentials | AuthError::InvalidToken => {
            (StatusCode::UNAUTHORIZED, err.to_string())
        }
        AuthError::EmailTaken(_) => (StatusCode::CONFLICT, err.to_string()),
        AuthError::Store(inner) => store_error_to_response_ref(inner),
        AuthError::Hash(_) | AuthError::TokenEncoding(_) => {
            tracing::error!(error = %err, "auth failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn store_error_to_response_ref(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::UserNotFound => (StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!(error = %err, "store failure during auth");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}
