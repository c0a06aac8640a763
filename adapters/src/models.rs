//! Row models shared by every adapter implementation.
//!
//! Field names follow the column names of the hosted tables, so the same
//! structs serialize straight into PostgREST request bodies and deserialize
//! from its responses. The in-memory adapter stores these exact values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. `password` holds the bcrypt hash.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub update_at: DateTime<Utc>,
}

/// Persisted refresh-token identity. `id` is the token's `jti`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub id_user: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id_food: i64,
    pub food_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub recipes: Option<String>,
    #[serde(default)]
    pub time_cook: Option<String>,
    #[serde(default)]
    pub serving: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFood {
    pub food_name: String,
    pub category: Option<String>,
    pub from: Option<String>,
    pub desc: Option<String>,
    pub history: Option<String>,
    pub material: Option<String>,
    pub recipes: Option<String>,
    pub time_cook: Option<String>,
    pub serving: Option<String>,
}

/// Partial update of a food row; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving: Option<String>,
}

impl FoodChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodImage {
    pub id_image: i64,
    pub id_food: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFoodImage {
    pub id_food: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPlace {
    pub id: i64,
    #[serde(default)]
    pub food_id: Option<i64>,
    pub shop_name: String,
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
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub food_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewFoodPlace {
    pub food_id: Option<i64>,
    pub shop_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub open_hours: Option<String>,
    pub close_hours: Option<String>,
    pub price_range: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub food_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodPlaceChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
}

impl FoodPlaceChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceImage {
    pub id: i64,
    pub id_food_place: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPlaceImage {
    pub id_food_place: i64,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id_review: i64,
    pub id_food: i64,
    pub id_user: i64,
    pub review_desc: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub id_food: i64,
    pub id_user: i64,
    pub review_desc: String,
}

/// Profile picture of a user, keyed by the user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileImage {
    pub id_image: i64,
    pub image_url: String,
}

/// A file headed for object storage.
#[derive(Debug, Clone)]
pub struct ObjectUpload {
    pub path: String,
    pub data: Vec<u8>,
    pub content_type: String,
    /// Overwrite an existing object at the same path instead of failing.
    pub upsert: bool,
}
