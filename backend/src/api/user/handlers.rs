//! Handler functions for user profile endpoints.
//!
//! These functions act on the caller's own account only; the user id always
//! comes from the access token, never from the request.

use std::sync::Arc;

use adapters::{
    models::{ProfileImage, User, UserChanges},
    AdapterError,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    auth::{AuthError, AuthUser},
    errors::AppError,
    services::media::{self, ImageFile},
    state::AppState,
    utils::{clean, is_valid_email, ApiJson},
};

const PROFILE_IMAGE_FIELD: &str = "profile_image";

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl Profile {
    fn new(user: User, image_url: Option<String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: &'static str,
    pub user: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    pub message: &'static str,
    pub image_url: String,
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Profile>, AppError> {
    let account = state
        .db
        .find_user_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found."))?;
    let image = state.db.profile_image(user.id).await?;

    Ok(Json(Profile::new(account, image.map(|i| i.image_url))))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<ProfileUpdateResponse>, AppError> {
    let name = clean(payload.name);
    let email = clean(payload.email).map(|email| email.to_lowercase());

    if name.is_none() && email.is_none() {
        return Err(AppError::bad_request("Provide a name or an email to update."));
    }
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(AppError::bad_request("email is not a valid address."));
        }
        let taken = state
            .db
            .find_user_by_email(email)
            .await?
            .is_some_and(|other| other.id != user.id);
        if taken {
            return Err(AuthError::EmailTaken.into());
        }
    }

    let changes = UserChanges {
        name,
        email,
        update_at: Utc::now(),
    };

    let updated = match state.db.update_user(user.id, changes).await {
        Ok(Some(updated)) => updated,
        Ok(None) => return Err(AppError::not_found("User not found.")),
        Err(AdapterError::Conflict(_)) => return Err(AuthError::EmailTaken.into()),
        Err(e) => return Err(e.into()),
    };
    let image = state.db.profile_image(user.id).await?;

    info!("User {} updated their profile", user.id);
    Ok(Json(ProfileUpdateResponse {
        message: "User profile updated successfully.",
        user: Profile::new(updated, image.map(|i| i.image_url)),
    }))
}

pub async fn update_profile_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProfileImageResponse>, AppError> {
    let mut multipart = multipart?;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(PROFILE_IMAGE_FIELD) {
            file = Some(ImageFile::from_field(field).await?);
            break;
        }
        debug!("Ignoring multipart field {:?}", field.name());
    }

    let file = file.ok_or_else(|| AppError::bad_request("No image file provided."))?;
    let image_url = media::store_profile_image(&state, user.id, file).await?;

    state
        .db
        .upsert_profile_image(ProfileImage {
            id_image: user.id,
            image_url: image_url.clone(),
        })
        .await?;

    info!("User {} uploaded a profile image", user.id);
    Ok(Json(ProfileImageResponse {
        message: "Profile image updated successfully.",
        image_url,
    }))
}
