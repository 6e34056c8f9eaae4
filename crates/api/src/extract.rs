//! Bearer-token extraction for authenticated routes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use common::UserId;

use crate::error::ApiError;
use crate::{AppState, Store};

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Rejects with 401 when the header is missing, malformed, or carries a
/// token that fails verification.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl<S: Store> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        let user_id = state
            .auth
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthUser(user_id))
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?;

    let header = header.to_str().map_err(|_| ApiError::Unauthorized)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?
        .trim();

    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    Ok(token)
}
