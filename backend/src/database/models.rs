//! Response shapes that join table rows together.
//!
//! The row structs themselves live in `adapters::models`; these wrap them with
//! the related rows the API embeds (images, the food a place sells, the author
//! of a review).

use adapters::models::{Food, FoodImage, FoodPlace, PlaceImage, Review};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FoodWithImages {
    #[serde(flatten)]
    pub food: Food,
    pub images: Vec<FoodImage>,
}

#[derive(Debug, Serialize)]
pub struct FoodRef {
    pub food_name: String,
}

#[derive(Debug, Serialize)]
pub struct PlaceDetail {
    #[serde(flatten)]
    pub place: FoodPlace,
    pub food: Option<FoodRef>,
    pub images: Vec<PlaceImage>,
}

#[derive(Debug, Serialize)]
pub struct ReviewAuthor {
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<ReviewAuthor>,
}
