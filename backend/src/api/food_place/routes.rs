//! Defines the HTTP routes for food places.

use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::{
    create_place, delete_place, get_place, list_places, search_places, update_place,
};
use crate::state::AppState;

pub fn food_place_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/food-place", get(list_places).post(create_place))
        .route("/food-place/search", get(search_places))
        .route(
            "/food-place/{id}",
            get(get_place).put(update_place).delete(delete_place),
        )
}
