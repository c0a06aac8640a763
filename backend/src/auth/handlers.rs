//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse and validate request bodies, then hand off to
//! `auth::service` for the actual work.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::{
    models::{LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse, TokenResponse},
    service,
};
use crate::{
    errors::AppError,
    state::AppState,
    utils::{is_valid_email, required, ApiJson},
};

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = required(payload.email, "email")?.to_lowercase();
    let username = required(payload.username, "username")?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request("password is required."))?;

    if !is_valid_email(&email) {
        return Err(AppError::bad_request("email is not a valid address."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let user = service::register(&state, email, username, password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful!",
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = required(payload.email, "email")?.to_lowercase();
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::bad_request("password is required."))?;

    let tokens = service::login(&state, &email, password).await?;
    Ok(Json(TokenResponse::new("Login successful!", tokens)))
}

pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let refresh_token = required(payload.refresh_token, "refresh_token")?;

    let tokens = service::refresh(&state, &refresh_token).await?;
    Ok(Json(TokenResponse::new("Token refreshed.", tokens)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = required(payload.refresh_token, "refresh_token")?;

    service::logout(&state, &refresh_token).await?;
    Ok(Json(json!({ "message": "Logged out." })))
}
