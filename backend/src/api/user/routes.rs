use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_profile, update_profile, update_profile_image};
use crate::state::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/profile/image", post(update_profile_image))
}
