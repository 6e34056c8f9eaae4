//! Registration and login endpoints.

use std::sync::Arc;

use auth::RegisterInput;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::User;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::{AppState, Store};

// -- Request types --

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Handlers --

/// POST /auth/sign-up — register a new account and issue a token.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_up<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let (user, token) = state
        .auth
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /auth/sign-in — verify credentials and issue a token.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_in<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let (user, token) = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(AuthResponse { user, token }))
}
