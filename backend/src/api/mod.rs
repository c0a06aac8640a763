//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains (foods,
//! food places, reviews and user profiles), excluding the authentication
//! routes which are nested separately under `/auth`.

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod food;
pub mod food_place;
pub mod review;
pub mod user;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(food::routes::food_router())
        .merge(review::routes::review_router())
        .merge(food_place::routes::food_place_router())
        .merge(user::routes::user_router())
}
