//! Defines the HTTP routes for the food catalog.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::{create_food, delete_food, get_food, list_foods, search_food, update_food};
use crate::state::AppState;

pub fn food_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/food", get(list_foods).post(create_food))
        .route("/food/search", get(search_food))
        .route(
            "/food/{id}",
            get(get_food).put(update_food).delete(delete_food),
        )
}
