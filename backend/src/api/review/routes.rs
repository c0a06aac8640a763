use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::{create_review, list_reviews};
use crate::state::AppState;

/// Reviews hang off a food, so the path shares the `/food/{id}` prefix.
pub fn review_router() -> Router<Arc<AppState>> {
    Router::new().route("/food/{id}/review", get(list_reviews).post(create_review))
}
