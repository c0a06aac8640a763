//! In-process adapter implementation.
//!
//! Mirrors the semantics of the hosted tables closely enough to run the
//! backend locally without credentials and to drive the HTTP tests: unique
//! emails, monotonically increasing ids per table, place images removed along
//! with their place, storage paths that refuse silent overwrites.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    errors::AdapterError,
    models::{
        Food, FoodChanges, FoodImage, FoodPlace, FoodPlaceChanges, NewFood, NewFoodImage,
        NewFoodPlace, NewPlaceImage, NewReview, NewUser, ObjectUpload, PlaceImage,
        ProfileImage, Review, Session, User, UserChanges,
    },
    Database, ObjectStorage,
};

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    users: Vec<User>,
    sessions: HashMap<Uuid, Session>,
    foods: Vec<Food>,
    food_images: Vec<FoodImage>,
    places: Vec<FoodPlace>,
    place_images: Vec<PlaceImage>,
    reviews: Vec<Review>,
    profile_images: HashMap<i64, ProfileImage>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn replace_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AdapterError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AdapterError::Conflict(format!(
                "email {} already exists",
                user.email
            )));
        }

        let now = Utc::now();
        let row = User {
            id: tables.next_id("user"),
            email: user.email,
            username: user.username,
            name: None,
            password: user.password,
            created_at: Some(now),
            update_at: Some(now),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, AdapterError> {
        let mut tables = self.tables.lock().await;
        if let Some(email) = &changes.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AdapterError::Conflict(format!("email {email} already exists")));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        replace_opt(&mut user.name, changes.name);
        replace(&mut user.email, changes.email);
        user.update_at = Some(changes.update_at);
        Ok(Some(user.clone()))
    }

    async fn insert_session(&self, session: Session) -> Result<(), AdapterError> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.contains_key(&session.id) {
            return Err(AdapterError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        tables.sessions.insert(session.id, session);
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool, AdapterError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.sessions.remove(&id).is_some())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AdapterError> {
        let mut tables = self.tables.lock().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, session| session.expires_at >= now);
        Ok(before - tables.sessions.len())
    }

    async fn list_foods(&self) -> Result<Vec<Food>, AdapterError> {
        Ok(self.tables.lock().await.foods.clone())
    }

    async fn get_food(&self, id: i64) -> Result<Option<Food>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.foods.iter().find(|f| f.id_food == id).cloned())
    }

    async fn foods_by_ids(&self, ids: &[i64]) -> Result<Vec<Food>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .foods
            .iter()
            .filter(|f| ids.contains(&f.id_food))
            .cloned()
            .collect())
    }

    async fn find_food_by_name(&self, name: &str) -> Result<Option<Food>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.foods.iter().find(|f| f.food_name == name).cloned())
    }

    async fn search_foods(&self, fragment: &str) -> Result<Vec<Food>, AdapterError> {
        let fragment = fragment.to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables
            .foods
            .iter()
            .filter(|f| f.food_name.to_lowercase().contains(&fragment))
            .cloned()
            .collect())
    }

    async fn insert_food(&self, food: NewFood) -> Result<Food, AdapterError> {
        let mut tables = self.tables.lock().await;
        let row = Food {
            id_food: tables.next_id("food"),
            food_name: food.food_name,
            category: food.category,
            from: food.from,
            desc: food.desc,
            history: food.history,
            material: food.material,
            recipes: food.recipes,
            time_cook: food.time_cook,
            serving: food.serving,
        };
        tables.foods.push(row.clone());
        Ok(row)
    }

    async fn update_food(
        &self,
        id: i64,
        changes: FoodChanges,
    ) -> Result<Option<Food>, AdapterError> {
        let mut tables = self.tables.lock().await;
        let Some(food) = tables.foods.iter_mut().find(|f| f.id_food == id) else {
            return Ok(None);
        };

        replace(&mut food.food_name, changes.food_name);
        replace_opt(&mut food.category, changes.category);
        replace_opt(&mut food.from, changes.from);
        replace_opt(&mut food.desc, changes.desc);
        replace_opt(&mut food.history, changes.history);
        replace_opt(&mut food.material, changes.material);
        replace_opt(&mut food.recipes, changes.recipes);
        replace_opt(&mut food.time_cook, changes.time_cook);
        replace_opt(&mut food.serving, changes.serving);
        Ok(Some(food.clone()))
    }

    async fn delete_food(&self, id: i64) -> Result<bool, AdapterError> {
        let mut tables = self.tables.lock().await;
        let before = tables.foods.len();
        tables.foods.retain(|f| f.id_food != id);
        Ok(tables.foods.len() != before)
    }

    async fn list_food_images(&self) -> Result<Vec<FoodImage>, AdapterError> {
        Ok(self.tables.lock().await.food_images.clone())
    }

    async fn food_images(&self, id_food: i64) -> Result<Vec<FoodImage>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .food_images
            .iter()
            .filter(|i| i.id_food == id_food)
            .cloned()
            .collect())
    }

    async fn insert_food_image(&self, image: NewFoodImage) -> Result<FoodImage, AdapterError> {
        let mut tables = self.tables.lock().await;
        let row = FoodImage {
            id_image: tables.next_id("image"),
            id_food: image.id_food,
            image_url: image.image_url,
        };
        tables.food_images.push(row.clone());
        Ok(row)
    }

    async fn delete_food_images(&self, id_food: i64) -> Result<(), AdapterError> {
        let mut tables = self.tables.lock().await;
        tables.food_images.retain(|i| i.id_food != id_food);
        Ok(())
    }

    async fn list_places(&self) -> Result<Vec<FoodPlace>, AdapterError> {
        Ok(self.tables.lock().await.places.clone())
    }

    async fn get_place(&self, id: i64) -> Result<Option<FoodPlace>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.places.iter().find(|p| p.id == id).cloned())
    }

    async fn places_for_foods(&self, food_ids: &[i64]) -> Result<Vec<FoodPlace>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .places
            .iter()
            .filter(|p| p.food_id.is_some_and(|id| food_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn insert_place(&self, place: NewFoodPlace) -> Result<FoodPlace, AdapterError> {
        let mut tables = self.tables.lock().await;
        let row = FoodPlace {
            id: tables.next_id("food_places"),
            food_id: place.food_id,
            shop_name: place.shop_name,
            address: place.address,
            phone: place.phone,
            open_hours: place.open_hours,
            close_hours: place.close_hours,
            price_range: place.price_range,
            latitude: place.latitude,
            longitude: place.longitude,
            food_name: place.food_name,
        };
        tables.places.push(row.clone());
        Ok(row)
    }

    async fn update_place(
        &self,
        id: i64,
        changes: FoodPlaceChanges,
    ) -> Result<Option<FoodPlace>, AdapterError> {
        let mut tables = self.tables.lock().await;
        let Some(place) = tables.places.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        replace_opt(&mut place.food_id, changes.food_id);
        replace(&mut place.shop_name, changes.shop_name);
        replace_opt(&mut place.address, changes.address);
        replace_opt(&mut place.phone, changes.phone);
        replace_opt(&mut place.open_hours, changes.open_hours);
        replace_opt(&mut place.close_hours, changes.close_hours);
        replace_opt(&mut place.price_range, changes.price_range);
        replace(&mut place.latitude, changes.latitude);
        replace(&mut place.longitude, changes.longitude);
        replace_opt(&mut place.food_name, changes.food_name);
        Ok(Some(place.clone()))
    }

    async fn delete_place(&self, id: i64) -> Result<bool, AdapterError> {
        let mut tables = self.tables.lock().await;
        let before = tables.places.len();
        tables.places.retain(|p| p.id != id);
        // image_place rows cascade with their place
        tables.place_images.retain(|i| i.id_food_place != id);
        Ok(tables.places.len() != before)
    }

    async fn place_images(&self, place_ids: &[i64]) -> Result<Vec<PlaceImage>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .place_images
            .iter()
            .filter(|i| place_ids.contains(&i.id_food_place))
            .cloned()
            .collect())
    }

    async fn insert_place_images(
        &self,
        images: Vec<NewPlaceImage>,
    ) -> Result<Vec<PlaceImage>, AdapterError> {
        let mut tables = self.tables.lock().await;
        let mut rows = Vec::with_capacity(images.len());
        for image in images {
            let row = PlaceImage {
                id: tables.next_id("image_place"),
                id_food_place: image.id_food_place,
                image_url: image.image_url,
            };
            tables.place_images.push(row.clone());
            rows.push(row);
        }
        Ok(rows)
    }

    async fn delete_place_images(&self, id_food_place: i64) -> Result<(), AdapterError> {
        let mut tables = self.tables.lock().await;
        tables.place_images.retain(|i| i.id_food_place != id_food_place);
        Ok(())
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, AdapterError> {
        let mut tables = self.tables.lock().await;
        let row = Review {
            id_review: tables.next_id("review"),
            id_food: review.id_food,
            id_user: review.id_user,
            review_desc: review.review_desc,
            created_at: Some(Utc::now()),
        };
        tables.reviews.push(row.clone());
        Ok(row)
    }

    async fn delete_reviews_for_food(&self, id_food: i64) -> Result<(), AdapterError> {
        let mut tables = self.tables.lock().await;
        tables.reviews.retain(|r| r.id_food != id_food);
        Ok(())
    }

    async fn reviews_for_food(&self, id_food: i64) -> Result<Vec<Review>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .reviews
            .iter()
            .filter(|r| r.id_food == id_food)
            .cloned()
            .collect())
    }

    async fn upsert_profile_image(
        &self,
        image: ProfileImage,
    ) -> Result<ProfileImage, AdapterError> {
        let mut tables = self.tables.lock().await;
        tables.profile_images.insert(image.id_image, image.clone());
        Ok(image)
    }

    async fn profile_image(&self, id_user: i64) -> Result<Option<ProfileImage>, AdapterError> {
        let tables = self.tables.lock().await;
        Ok(tables.profile_images.get(&id_user).cloned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
}

impl MemoryStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        let objects = self.objects.lock().await;
        objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Paths currently stored in `bucket`, sorted.
    pub async fn paths(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().await;
        let mut paths: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, path)| path.clone())
            .collect();
        paths.sort();
        paths
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("http://localhost/storage")
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, bucket: &str, upload: ObjectUpload) -> Result<(), AdapterError> {
        let mut objects = self.objects.lock().await;
        let key = (bucket.to_string(), upload.path);
        if !upload.upsert && objects.contains_key(&key) {
            return Err(AdapterError::Conflict(format!(
                "object {}/{} already exists",
                key.0, key.1
            )));
        }

        objects.insert(
            key,
            StoredObject {
                data: upload.data,
                content_type: upload.content_type,
            },
        );
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AdapterError> {
        let mut objects = self.objects.lock().await;
        for path in paths {
            objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.base_url)
    }
}
