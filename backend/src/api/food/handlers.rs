//! Handler functions for the food API.
//!
//! Reads are public. Creating, editing and deleting a food requires a valid
//! access token. Creation takes a multipart form so images can be uploaded in
//! the same request.

use std::{collections::HashMap, sync::Arc};

use adapters::models::{Food, FoodChanges, NewFood};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    auth::AuthUser,
    database::{models::FoodWithImages, queries},
    errors::AppError,
    services::{
        catalog,
        media::{ImageFile, MAX_FOOD_IMAGES},
    },
    state::AppState,
    utils::{clean, required, ApiJson, ApiPath, ApiQuery},
};

const IMAGES_FIELD: &str = "images";

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn list_foods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FoodWithImages>>, AppError> {
    Ok(Json(queries::foods_with_images(state.db.as_ref()).await?))
}

pub async fn get_food(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<FoodWithImages>, AppError> {
    queries::food_with_images(state.db.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food not found."))
}

/// Exact (case-sensitive) name lookup.
pub async fn search_food(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<NameQuery>,
) -> Result<Json<FoodWithImages>, AppError> {
    let name = required(query.name, "name")?;

    queries::food_by_exact_name(state.db.as_ref(), &name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food not found."))
}

pub async fn create_food(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart?;
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGES_FIELD {
            if images.len() == MAX_FOOD_IMAGES {
                return Err(AppError::bad_request(format!(
                    "At most {MAX_FOOD_IMAGES} images can be uploaded."
                )));
            }
            images.push(ImageFile::from_field(field).await?);
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    let food = new_food(fields)?;
    debug!("User {} creating food {}", user.id, food.food_name);

    let created = catalog::create_food(&state, food, images).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

fn new_food(mut fields: HashMap<String, String>) -> Result<NewFood, AppError> {
    let food_name = required(fields.remove("food_name"), "food_name")?;
    let mut take = |key: &str| clean(fields.remove(key));

    let food = NewFood {
        food_name,
        category: take("category"),
        from: take("from"),
        desc: take("desc"),
        history: take("history"),
        material: take("material"),
        recipes: take("recipes"),
        time_cook: take("time_cook"),
        serving: take("serving"),
    };

    if !fields.is_empty() {
        debug!("Ignoring unknown food fields: {:?}", fields.keys());
    }
    Ok(food)
}

/// Trims every column; blank optional columns are left untouched.
fn clean_changes(changes: FoodChanges) -> FoodChanges {
    FoodChanges {
        food_name: clean(changes.food_name),
        category: clean(changes.category),
        from: clean(changes.from),
        desc: clean(changes.desc),
        history: clean(changes.history),
        material: clean(changes.material),
        recipes: clean(changes.recipes),
        time_cook: clean(changes.time_cook),
        serving: clean(changes.serving),
    }
}

pub async fn update_food(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<FoodChanges>,
) -> Result<Json<Food>, AppError> {
    if changes
        .food_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::bad_request("food_name cannot be blank."));
    }
    let changes = clean_changes(changes);
    if changes.is_empty() {
        return Err(AppError::bad_request("No fields to update."));
    }

    state
        .db
        .update_food(id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Food not found."))
}

pub async fn delete_food(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !catalog::delete_food(&state, id).await? {
        return Err(AppError::not_found("Food not found."));
    }

    Ok(Json(json!({ "message": "Food and related images deleted." })))
}
