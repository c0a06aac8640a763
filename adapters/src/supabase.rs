//! Supabase adapter implementation for the hosted database and object storage.
//!
//! Tables are reached through PostgREST (`/rest/v1/<table>`) and blobs through
//! the Storage API (`/storage/v1/object/<bucket>/<path>`). Every call is a
//! single HTTP round trip; failures are surfaced as [`AdapterError`] without
//! retries.

use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
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

const USER_TABLE: &str = "user";
const SESSION_TABLE: &str = "session";
const FOOD_TABLE: &str = "food";
const FOOD_IMAGE_TABLE: &str = "image";
const PLACE_TABLE: &str = "food_places";
const PLACE_IMAGE_TABLE: &str = "image_place";
const REVIEW_TABLE: &str = "review";
const PROFILE_IMAGE_TABLE: &str = "image_profile";

const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT_REPRESENTATION: &str = "resolution=merge-duplicates,return=representation";

const UNIQUE_VIOLATION: &str = "23505";
const STORAGE_DUPLICATE: &str = "Duplicate";

type Filters = Vec<(&'static str, String)>;

pub struct SupabaseClient {
    http: Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| AdapterError::InvalidConfig(format!("api key: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| AdapterError::InvalidConfig(format!("api key: {e}")))?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{path}", self.base_url)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters,
    ) -> Result<Vec<T>, AdapterError> {
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(&filters);

        send(request).await
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters,
    ) -> Result<Option<T>, AdapterError> {
        let mut filters = filters;
        filters.push(("limit", "1".to_string()));

        Ok(self.select(table, filters).await?.into_iter().next())
    }

    async fn insert<B, T>(&self, table: &str, rows: &B) -> Result<Vec<T>, AdapterError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(rows);

        send(request).await
    }

    async fn insert_one<B, T>(&self, table: &str, row: &B) -> Result<T, AdapterError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.insert(table, std::slice::from_ref(row))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::NotFound(format!("inserted row missing from {table}")))
    }

    async fn update<B, T>(
        &self,
        table: &str,
        changes: &B,
        filters: Filters,
    ) -> Result<Vec<T>, AdapterError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .patch(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&filters)
            .json(changes);

        send(request).await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters,
    ) -> Result<Vec<T>, AdapterError> {
        let request = self
            .http
            .delete(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&filters);

        send(request).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, AdapterError> {
    let response = request.send().await?;
    decode(response).await
}

async fn check(response: Response) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!("Supabase request failed with {status}: {body}");

    Err(failure(status, body))
}

/// Error body shared by PostgREST (`code` is the Postgres SQLSTATE) and the
/// Storage API (`error` names the failure).
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Only unique violations are conflicts. PostgREST also answers 409 for
/// foreign key violations (`23503`), which stay plain status errors.
fn failure(status: StatusCode, body: String) -> AdapterError {
    let unique_violation = status == StatusCode::CONFLICT
        && serde_json::from_str::<ErrorBody>(&body).is_ok_and(|err| {
            err.code.as_deref() == Some(UNIQUE_VIOLATION)
                || err.error.as_deref() == Some(STORAGE_DUPLICATE)
        });

    if unique_violation {
        AdapterError::Conflict(body)
    } else {
        AdapterError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AdapterError> {
    let bytes = check(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn eq(value: impl Display) -> String {
    format!("eq.{value}")
}

fn lt(instant: DateTime<Utc>) -> String {
    format!("lt.{}", instant.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn in_list(ids: &[i64]) -> String {
    let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
    format!("in.({})", ids.join(","))
}

/// PostgREST `ilike` with `*` wildcards on both sides. Wildcards in the
/// fragment itself are dropped so the match stays a plain substring search.
fn ilike_contains(fragment: &str) -> String {
    let fragment: String = fragment
        .chars()
        .filter(|c| !matches!(c, '*' | '%'))
        .collect();
    format!("ilike.*{fragment}*")
}

#[async_trait]
impl Database for SupabaseClient {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AdapterError> {
        self.select_one(USER_TABLE, vec![("email", eq(email))]).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AdapterError> {
        self.select_one(USER_TABLE, vec![("id", eq(id))]).await
    }

    async fn users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AdapterError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(USER_TABLE, vec![("id", in_list(ids))]).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, AdapterError> {
        self.insert_one(USER_TABLE, &user).await
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, AdapterError> {
        let rows: Vec<User> = self
            .update(USER_TABLE, &changes, vec![("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_session(&self, session: Session) -> Result<(), AdapterError> {
        let _: Session = self.insert_one(SESSION_TABLE, &session).await?;
        Ok(())
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<Session>, AdapterError> {
        self.select_one(SESSION_TABLE, vec![("id", eq(id))]).await
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool, AdapterError> {
        let rows: Vec<Session> = self.delete(SESSION_TABLE, vec![("id", eq(id))]).await?;
        Ok(!rows.is_empty())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AdapterError> {
        let rows: Vec<Session> = self
            .delete(SESSION_TABLE, vec![("expires_at", lt(now))])
            .await?;
        Ok(rows.len())
    }

    async fn list_foods(&self) -> Result<Vec<Food>, AdapterError> {
        self.select(FOOD_TABLE, vec![("order", "id_food.asc".to_string())])
            .await
    }

    async fn get_food(&self, id: i64) -> Result<Option<Food>, AdapterError> {
        self.select_one(FOOD_TABLE, vec![("id_food", eq(id))]).await
    }

    async fn foods_by_ids(&self, ids: &[i64]) -> Result<Vec<Food>, AdapterError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(FOOD_TABLE, vec![("id_food", in_list(ids))]).await
    }

    async fn find_food_by_name(&self, name: &str) -> Result<Option<Food>, AdapterError> {
        self.select_one(FOOD_TABLE, vec![("food_name", eq(name))])
            .await
    }

    async fn search_foods(&self, fragment: &str) -> Result<Vec<Food>, AdapterError> {
        self.select(FOOD_TABLE, vec![("food_name", ilike_contains(fragment))])
            .await
    }

    async fn insert_food(&self, food: NewFood) -> Result<Food, AdapterError> {
        self.insert_one(FOOD_TABLE, &food).await
    }

    async fn update_food(
        &self,
        id: i64,
        changes: FoodChanges,
    ) -> Result<Option<Food>, AdapterError> {
        let rows: Vec<Food> = self
            .update(FOOD_TABLE, &changes, vec![("id_food", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_food(&self, id: i64) -> Result<bool, AdapterError> {
        let rows: Vec<Food> = self.delete(FOOD_TABLE, vec![("id_food", eq(id))]).await?;
        Ok(!rows.is_empty())
    }

    async fn list_food_images(&self) -> Result<Vec<FoodImage>, AdapterError> {
        self.select(FOOD_IMAGE_TABLE, Vec::new()).await
    }

    async fn food_images(&self, id_food: i64) -> Result<Vec<FoodImage>, AdapterError> {
        self.select(FOOD_IMAGE_TABLE, vec![("id_food", eq(id_food))])
            .await
    }

    async fn insert_food_image(&self, image: NewFoodImage) -> Result<FoodImage, AdapterError> {
        self.insert_one(FOOD_IMAGE_TABLE, &image).await
    }

    async fn delete_food_images(&self, id_food: i64) -> Result<(), AdapterError> {
        let _: Vec<FoodImage> = self
            .delete(FOOD_IMAGE_TABLE, vec![("id_food", eq(id_food))])
            .await?;
        Ok(())
    }

    async fn list_places(&self) -> Result<Vec<FoodPlace>, AdapterError> {
        self.select(PLACE_TABLE, vec![("order", "id.asc".to_string())])
            .await
    }

    async fn get_place(&self, id: i64) -> Result<Option<FoodPlace>, AdapterError> {
        self.select_one(PLACE_TABLE, vec![("id", eq(id))]).await
    }

    async fn places_for_foods(&self, food_ids: &[i64]) -> Result<Vec<FoodPlace>, AdapterError> {
        if food_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(PLACE_TABLE, vec![("food_id", in_list(food_ids))])
            .await
    }

    async fn insert_place(&self, place: NewFoodPlace) -> Result<FoodPlace, AdapterError> {
        self.insert_one(PLACE_TABLE, &place).await
    }

    async fn update_place(
        &self,
        id: i64,
        changes: FoodPlaceChanges,
    ) -> Result<Option<FoodPlace>, AdapterError> {
        let rows: Vec<FoodPlace> = self
            .update(PLACE_TABLE, &changes, vec![("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_place(&self, id: i64) -> Result<bool, AdapterError> {
        let rows: Vec<FoodPlace> = self.delete(PLACE_TABLE, vec![("id", eq(id))]).await?;
        Ok(!rows.is_empty())
    }

    async fn place_images(&self, place_ids: &[i64]) -> Result<Vec<PlaceImage>, AdapterError> {
        if place_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(PLACE_IMAGE_TABLE, vec![("id_food_place", in_list(place_ids))])
            .await
    }

    async fn insert_place_images(
        &self,
        images: Vec<NewPlaceImage>,
    ) -> Result<Vec<PlaceImage>, AdapterError> {
        if images.is_empty() {
            return Ok(Vec::new());
        }
        self.insert(PLACE_IMAGE_TABLE, &images).await
    }

    async fn delete_place_images(&self, id_food_place: i64) -> Result<(), AdapterError> {
        let _: Vec<PlaceImage> = self
            .delete(PLACE_IMAGE_TABLE, vec![("id_food_place", eq(id_food_place))])
            .await?;
        Ok(())
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, AdapterError> {
        self.insert_one(REVIEW_TABLE, &review).await
    }

    async fn delete_reviews_for_food(&self, id_food: i64) -> Result<(), AdapterError> {
        let _: Vec<Review> = self
            .delete(REVIEW_TABLE, vec![("id_food", eq(id_food))])
            .await?;
        Ok(())
    }

    async fn reviews_for_food(&self, id_food: i64) -> Result<Vec<Review>, AdapterError> {
        self.select(
            REVIEW_TABLE,
            vec![
                ("id_food", eq(id_food)),
                ("order", "id_review.asc".to_string()),
            ],
        )
        .await
    }

    async fn upsert_profile_image(
        &self,
        image: ProfileImage,
    ) -> Result<ProfileImage, AdapterError> {
        let request = self
            .http
            .post(self.table_url(PROFILE_IMAGE_TABLE))
            .header("Prefer", UPSERT_REPRESENTATION)
            .query(&[("on_conflict", "id_image")])
            .json(std::slice::from_ref(&image));

        let rows: Vec<ProfileImage> = send(request).await?;
        Ok(rows.into_iter().next().unwrap_or(image))
    }

    async fn profile_image(&self, id_user: i64) -> Result<Option<ProfileImage>, AdapterError> {
        self.select_one(PROFILE_IMAGE_TABLE, vec![("id_image", eq(id_user))])
            .await
    }
}

#[async_trait]
impl ObjectStorage for SupabaseClient {
    async fn upload(&self, bucket: &str, upload: ObjectUpload) -> Result<(), AdapterError> {
        debug!(
            "Uploading {} bytes to {bucket}/{}",
            upload.data.len(),
            upload.path
        );

        let request = self
            .http
            .post(self.object_url(bucket, &upload.path))
            .header(CONTENT_TYPE, upload.content_type)
            .header("x-upsert", upload.upsert.to_string())
            .body(upload.data);

        check(request.send().await?).await?;
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), AdapterError> {
        if paths.is_empty() {
            return Ok(());
        }

        let request = self
            .http
            .delete(format!("{}/storage/v1/object/{bucket}", self.base_url))
            .json(&json!({ "prefixes": paths }));

        check(request.send().await?).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new("https://project.supabase.co/", "anon-key").unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let client = client();
        assert_eq!(
            client.table_url("food"),
            "https://project.supabase.co/rest/v1/food"
        );
        assert_eq!(
            client.object_url("food", "public/a.png"),
            "https://project.supabase.co/storage/v1/object/food/public/a.png"
        );
    }

    #[test]
    fn object_path_inverts_public_url() {
        let client = client();
        let url = client.public_url("food", "public/abc.jpg");

        assert_eq!(
            url,
            "https://project.supabase.co/storage/v1/object/public/food/public/abc.jpg"
        );
        assert_eq!(
            client.object_path("food", &url).as_deref(),
            Some("public/abc.jpg")
        );
        assert_eq!(client.object_path("profile_image", &url), None);
        assert_eq!(client.object_path("food", "https://elsewhere/x.png"), None);
    }

    #[test]
    fn filters_use_postgrest_operators() {
        assert_eq!(eq(42), "eq.42");
        assert_eq!(in_list(&[1, 2, 3]), "in.(1,2,3)");
        assert_eq!(ilike_contains("Ba*kso%"), "ilike.*Bakso*");
    }

    #[test]
    fn timestamp_filter_is_utc_rfc3339() {
        let instant = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(lt(instant), "lt.2023-11-14T22:13:20Z");
    }

    #[test]
    fn only_unique_violations_are_conflicts() {
        let unique = r#"{"code":"23505","details":"Key (email)=(a@b.co) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"user_email_key\""}"#;
        assert!(matches!(
            failure(StatusCode::CONFLICT, unique.to_string()),
            AdapterError::Conflict(_)
        ));

        let foreign_key = r#"{"code":"23503","details":"Key (id_food)=(1) is still referenced from table \"review\".","hint":null,"message":"update or delete on table \"food\" violates foreign key constraint"}"#;
        assert!(matches!(
            failure(StatusCode::CONFLICT, foreign_key.to_string()),
            AdapterError::Status { status: 409, .. }
        ));

        let duplicate_object =
            r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#;
        assert!(matches!(
            failure(StatusCode::CONFLICT, duplicate_object.to_string()),
            AdapterError::Conflict(_)
        ));

        assert!(matches!(
            failure(StatusCode::CONFLICT, "not json".to_string()),
            AdapterError::Status { .. }
        ));
        assert!(matches!(
            failure(StatusCode::BAD_REQUEST, unique.to_string()),
            AdapterError::Status { status: 400, .. }
        ));
    }

    #[test]
    fn invalid_api_key_is_rejected() {
        let result = SupabaseClient::new("https://project.supabase.co", "bad\nkey");
        assert!(matches!(result, Err(AdapterError::InvalidConfig(_))));
    }
}
