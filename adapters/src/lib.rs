//! Core `adapters` crate for abstracting the hosted database and object storage.
//!
//! This crate defines the `Database` and `ObjectStorage` traits, which outline
//! every remote call the backend makes, and provides the concrete
//! implementations (Supabase over HTTP, in-memory for local runs and tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod errors;
pub mod memory;
pub mod models;
pub mod supabase;

pub use errors::AdapterError;
pub use memory::{MemoryDatabase, MemoryStorage};
pub use supabase::SupabaseClient;

use models::{
    Food, FoodChanges, FoodImage, FoodPlace, FoodPlaceChanges, NewFood, NewFoodImage,
    NewFoodPlace, NewPlaceImage, NewReview, NewUser, ObjectUpload, PlaceImage, ProfileImage,
    Review, Session, User, UserChanges,
};

/// Table access for the food-discovery schema.
///
/// Each method maps to a single remote call. Lookups return `Ok(None)` when
/// no row matches; updates and deletes report whether a row was touched.
#[async_trait]
pub trait Database: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AdapterError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AdapterError>;
    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AdapterError>;
    /// Fails with [`AdapterError::Conflict`] when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AdapterError>;
    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, AdapterError>;

    async fn insert_session(&self, session: Session) -> Result<(), AdapterError>;
    async fn find_session(&self, id: Uuid) -> Result<Option<Session>, AdapterError>;
    async fn delete_session(&self, id: Uuid) -> Result<bool, AdapterError>;
    /// Drops sessions whose `expires_at` is before `now`, returning how many.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AdapterError>;

    async fn list_foods(&self) -> Result<Vec<Food>, AdapterError>;
    async fn get_food(&self, id: i64) -> Result<Option<Food>, AdapterError>;
    async fn foods_by_ids(&self, ids: &[i64]) -> Result<Vec<Food>, AdapterError>;
    async fn find_food_by_name(&self, name: &str) -> Result<Option<Food>, AdapterError>;
    /// Case-insensitive substring match on `food_name`.
    async fn search_foods(&self, fragment: &str) -> Result<Vec<Food>, AdapterError>;
    async fn insert_food(&self, food: NewFood) -> Result<Food, AdapterError>;
    async fn update_food(
        &self,
        id: i64,
        changes: FoodChanges,
    ) -> Result<Option<Food>, AdapterError>;
    async fn delete_food(&self, id: i64) -> Result<bool, AdapterError>;

    async fn list_food_images(&self) -> Result<Vec<FoodImage>, AdapterError>;
    async fn food_images(&self, id_food: i64) -> Result<Vec<FoodImage>, AdapterError>;
    async fn insert_food_image(&self, image: NewFoodImage) -> Result<FoodImage, AdapterError>;
    async fn delete_food_images(&self, id_food: i64) -> Result<(), AdapterError>;

    async fn list_places(&self) -> Result<Vec<FoodPlace>, AdapterError>;
    async fn get_place(&self, id: i64) -> Result<Option<FoodPlace>, AdapterError>;
    async fn places_for_foods(&self, food_ids: &[i64]) -> Result<Vec<FoodPlace>, AdapterError>;
    async fn insert_place(&self, place: NewFoodPlace) -> Result<FoodPlace, AdapterError>;
    async fn update_place(
        &self,
        id: i64,
        changes: FoodPlaceChanges,
    ) -> Result<Option<FoodPlace>, AdapterError>;
    async fn delete_place(&self, id: i64) -> Result<bool, AdapterError>;

    async fn place_images(&self, place_ids: &[i64]) -> Result<Vec<PlaceImage>, AdapterError>;
    async fn insert_place_images(
        &self,
        images: Vec<NewPlaceImage>,
    ) -> Result<Vec<PlaceImage>, AdapterError>;
    async fn delete_place_images(&self, id_food_place: i64) -> Result<(), AdapterError>;

    async fn insert_review(&self, review: NewReview) -> Result<Review, AdapterError>;
    async fn reviews_for_food(&self, id_food: i64) -> Result<Vec<Review>, AdapterError>;
    async fn delete_reviews_for_food(&self, id_food: i64) -> Result<(), AdapterError>;

    /// Inserts or replaces the row keyed by `id_image`.
    async fn upsert_profile_image(
        &self,
        image: ProfileImage,
    ) -> Result<ProfileImage, AdapterError>;
    async fn profile_image(&self, id_user: i64) -> Result<Option<ProfileImage>, AdapterError>;
}

/// Bucketed blob storage with publicly readable URLs.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fails with [`AdapterError::Conflict`] if the path exists and
    /// `upload.upsert` is false.
    async fn upload(&self, bucket: &str, upload: ObjectUpload) -> Result<(), AdapterError>;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AdapterError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Recovers the object path from a URL produced by [`Self::public_url`].
    fn object_path(&self, bucket: &str, url: &str) -> Option<String> {
        let prefix = self.public_url(bucket, "");
        url.strip_prefix(&prefix)
            .filter(|path| !path.is_empty())
            .map(str::to_owned)
    }
}
