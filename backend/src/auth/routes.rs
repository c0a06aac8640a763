//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle registration, login, token refreshing and logout.
//! They are nested under `/auth` by the main router.

use std::sync::Arc;

use axum::{routing::post, Router};

use super::handlers::{login, logout, refresh_token, register};
use crate::state::AppState;

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        // older clients still post to the short path
        .route("/regis", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
}
