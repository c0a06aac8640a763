//! Handler functions for food reviews.

use std::sync::Arc;

use adapters::models::NewReview;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::AuthUser,
    database::{models::ReviewWithAuthor, queries},
    errors::AppError,
    state::AppState,
    utils::{required, ApiJson, ApiPath},
};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub review_desc: Option<String>,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id_food): ApiPath<i64>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let review_desc = required(payload.review_desc, "review_desc")?;

    if state.db.get_food(id_food).await?.is_none() {
        return Err(AppError::not_found("Food not found."));
    }

    let review = state
        .db
        .insert_review(NewReview {
            id_food,
            id_user: user.id,
            review_desc,
        })
        .await?;

    info!("User {} reviewed food {id_food}", user.id);
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    ApiPath(id_food): ApiPath<i64>,
) -> Result<Json<Vec<ReviewWithAuthor>>, AppError> {
    let reviews = queries::reviews_with_authors(state.db.as_ref(), id_food).await?;

    if reviews.is_empty() {
        return Err(AppError::not_found("No reviews found for this food."));
    }
    Ok(Json(reviews))
}
