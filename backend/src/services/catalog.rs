//! Write paths for foods and food places.
//!
//! Each operation is a fixed sequence of remote calls. A failure midway is
//! reported as-is; rows written before it stay written.

use adapters::models::{
    FoodPlaceChanges, NewFood, NewFoodImage, NewFoodPlace, NewPlaceImage,
};
use tracing::info;

use super::media::{self, ImageFile};
use crate::{
    database::{
        models::{FoodWithImages, PlaceDetail},
        queries,
    },
    errors::AppError,
    state::AppState,
};

pub async fn create_food(
    state: &AppState,
    food: NewFood,
    images: Vec<ImageFile>,
) -> Result<FoodWithImages, AppError> {
    let food = state.db.insert_food(food).await?;

    let mut stored = Vec::with_capacity(images.len());
    for file in images {
        let image_url = media::store_food_image(state, file).await?;
        let image = state
            .db
            .insert_food_image(NewFoodImage {
                id_food: food.id_food,
                image_url,
            })
            .await?;
        stored.push(image);
    }

    info!("Created food {} with {} image(s)", food.id_food, stored.len());
    Ok(FoodWithImages {
        food,
        images: stored,
    })
}

/// Removes the food with its reviews, image rows and stored image objects.
/// Returns `false` when no such food exists.
pub async fn delete_food(state: &AppState, id: i64) -> Result<bool, AppError> {
    if state.db.get_food(id).await?.is_none() {
        return Ok(false);
    }

    // reviews reference the food; clear them before anything irreversible
    state.db.delete_reviews_for_food(id).await?;

    let images = state.db.food_images(id).await?;
    media::remove_images(
        state,
        &state.config.food_bucket,
        images.iter().map(|image| image.image_url.as_str()),
    )
    .await?;

    state.db.delete_food_images(id).await?;
    let deleted = state.db.delete_food(id).await?;

    info!("Deleted food {id} and {} image(s)", images.len());
    Ok(deleted)
}

fn place_images(id_food_place: i64, urls: Vec<String>) -> Vec<NewPlaceImage> {
    urls.into_iter()
        .map(|image_url| NewPlaceImage {
            id_food_place,
            image_url,
        })
        .collect()
}

pub async fn create_place(
    state: &AppState,
    place: NewFoodPlace,
    image_urls: Vec<String>,
) -> Result<PlaceDetail, AppError> {
    let place = state.db.insert_place(place).await?;
    state
        .db
        .insert_place_images(place_images(place.id, image_urls))
        .await?;

    info!("Created food place {}", place.id);
    queries::place_details(state.db.as_ref(), vec![place])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Food place not found."))
}

/// Applies `changes` and, when `image_urls` is given, replaces the full set
/// of place images. Returns `None` when no such place exists.
pub async fn update_place(
    state: &AppState,
    id: i64,
    changes: FoodPlaceChanges,
    image_urls: Option<Vec<String>>,
) -> Result<Option<PlaceDetail>, AppError> {
    let place = if changes.is_empty() {
        state.db.get_place(id).await?
    } else {
        state.db.update_place(id, changes).await?
    };
    let Some(place) = place else {
        return Ok(None);
    };

    if let Some(urls) = image_urls {
        state.db.delete_place_images(id).await?;
        state.db.insert_place_images(place_images(id, urls)).await?;
    }

    Ok(queries::place_details(state.db.as_ref(), vec![place])
        .await?
        .pop())
}

pub async fn delete_place(state: &AppState, id: i64) -> Result<bool, AppError> {
    if state.db.get_place(id).await?.is_none() {
        return Ok(false);
    }

    state.db.delete_place_images(id).await?;
    let deleted = state.db.delete_place(id).await?;

    info!("Deleted food place {id}");
    Ok(deleted)
}
