//! Handler functions for the food place API.
//!
//! A food place is a shop selling a particular food, with coordinates and an
//! ordered list of image URLs. Reads are public; writes need an access token.

use std::sync::Arc;

use adapters::models::{FoodPlaceChanges, NewFoodPlace};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::food::handlers::NameQuery,
    auth::AuthUser,
    database::{models::PlaceDetail, queries},
    errors::AppError,
    services::catalog,
    state::AppState,
    utils::{clean, required, ApiJson, ApiPath, ApiQuery},
};

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    #[serde(default)]
    pub food_id: Option<i64>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub open_hours: Option<String>,
    #[serde(default)]
    pub close_hours: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaceRequest {
    #[serde(flatten)]
    pub changes: FoodPlaceChanges,
    /// Replaces every image of the place when present.
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PlaceSearchResponse {
    pub food_name: String,
    pub results: Vec<PlaceDetail>,
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    if latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        return Err(AppError::bad_request("latitude must be between -90 and 90."));
    }
    if longitude.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
        return Err(AppError::bad_request(
            "longitude must be between -180 and 180.",
        ));
    }
    Ok(())
}

fn check_image_urls(urls: &[String]) -> Result<Vec<String>, AppError> {
    urls.iter()
        .map(|url| {
            clean(Some(url.clone()))
                .ok_or_else(|| AppError::bad_request("images cannot contain blank URLs."))
        })
        .collect()
}

async fn check_food_exists(state: &AppState, food_id: Option<i64>) -> Result<(), AppError> {
    let Some(food_id) = food_id else {
        return Ok(());
    };
    if state.db.get_food(food_id).await?.is_none() {
        return Err(AppError::not_found("Food not found."));
    }
    Ok(())
}

pub async fn list_places(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlaceDetail>>, AppError> {
    Ok(Json(queries::all_place_details(state.db.as_ref()).await?))
}

pub async fn get_place(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PlaceDetail>, AppError> {
    queries::place_detail(state.db.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food place not found."))
}

/// Places selling any food whose name contains `name`, ignoring case.
pub async fn search_places(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Json<PlaceSearchResponse>, AppError> {
    let name = required(query.name, "name")?;

    let foods = state.db.search_foods(&name).await?;
    if foods.is_empty() {
        return Err(AppError::not_found("Food not found."));
    }

    let food_ids: Vec<i64> = foods.iter().map(|food| food.id_food).collect();
    let places = state.db.places_for_foods(&food_ids).await?;
    let results = queries::place_details(state.db.as_ref(), places).await?;

    Ok(Json(PlaceSearchResponse {
        food_name: name,
        results,
    }))
}

pub async fn create_place(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(payload): ApiJson<CreatePlaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let shop_name = clean(payload.shop_name);
    let (Some(shop_name), Some(latitude), Some(longitude)) =
        (shop_name, payload.latitude, payload.longitude)
    else {
        return Err(AppError::bad_request(
            "shop_name, latitude and longitude are required.",
        ));
    };
    check_coordinates(Some(latitude), Some(longitude))?;
    let images = check_image_urls(&payload.images)?;

    check_food_exists(&state, payload.food_id).await?;

    let place = NewFoodPlace {
        food_id: payload.food_id,
        shop_name,
        address: clean(payload.address),
        phone: clean(payload.phone),
        open_hours: clean(payload.open_hours),
        close_hours: clean(payload.close_hours),
        price_range: clean(payload.price_range),
        latitude,
        longitude,
        food_name: clean(payload.food_name),
    };

    let created = catalog::create_place(&state, place, images).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_place(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdatePlaceRequest>,
) -> Result<Json<PlaceDetail>, AppError> {
    let UpdatePlaceRequest { changes, images } = payload;

    if changes.is_empty() && images.is_none() {
        return Err(AppError::bad_request("No fields to update."));
    }
    if changes
        .shop_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::bad_request("shop_name cannot be blank."));
    }
    check_coordinates(changes.latitude, changes.longitude)?;
    let images = images.as_deref().map(check_image_urls).transpose()?;
    check_food_exists(&state, changes.food_id).await?;

    catalog::update_place(&state, id, changes, images)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food place not found."))
}

pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !catalog::delete_place(&state, id).await? {
        return Err(AppError::not_found("Food place not found."));
    }

    Ok(Json(json!({ "message": "Food place deleted successfully." })))
}
