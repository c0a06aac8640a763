//! Image uploads to object storage.
//!
//! Food images get a random object name so uploads never collide; a profile
//! image is named after its user and overwritten on every upload. Stored rows
//! keep only the public URL, so removal goes back through
//! [`ObjectStorage::object_path`](adapters::ObjectStorage::object_path).

use adapters::models::ObjectUpload;
use axum::extract::multipart::Field;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{errors::AppError, state::AppState};

pub const MAX_FOOD_IMAGES: usize = 50;
const MAX_EXTENSION_LEN: usize = 10;

/// An uploaded file that passed the image checks.
#[derive(Debug)]
pub struct ImageFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub async fn from_field(field: Field<'_>) -> Result<Self, AppError> {
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?.to_vec();

        let file = Self {
            file_name,
            content_type,
            data,
        };
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), AppError> {
        let name = self.file_name.as_deref().unwrap_or("upload");

        if !self.content_type.starts_with("image/") {
            return Err(AppError::bad_request(format!(
                "{name} is not an image ({}).",
                self.content_type
            )));
        }
        if self.data.is_empty() {
            return Err(AppError::bad_request(format!("{name} is empty.")));
        }
        Ok(())
    }

    pub fn extension(&self) -> String {
        file_extension(self.file_name.as_deref().unwrap_or_default())
    }
}

/// Extension of the final path segment including the dot, lowercased and
/// restricted to ASCII alphanumerics. Dotfiles and names without a dot give
/// an empty string.
pub fn file_extension(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);

    let ext: String = match base.rfind('.') {
        Some(dot) if dot > 0 => base[dot + 1..]
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(MAX_EXTENSION_LEN)
            .map(|c| c.to_ascii_lowercase())
            .collect(),
        _ => String::new(),
    };

    if ext.is_empty() {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Uploads a food image under a fresh name and returns its public URL.
pub async fn store_food_image(state: &AppState, file: ImageFile) -> Result<String, AppError> {
    let bucket = &state.config.food_bucket;
    let path = format!("public/{}{}", Uuid::new_v4(), file.extension());

    debug!("Storing food image {path}");
    state
        .storage
        .upload(
            bucket,
            ObjectUpload {
                path: path.clone(),
                data: file.data,
                content_type: file.content_type,
                upsert: false,
            },
        )
        .await?;

    Ok(state.storage.public_url(bucket, &path))
}

/// Uploads (or replaces) the profile image of `user_id` and returns its
/// public URL. A previous image stored under another extension is removed.
pub async fn store_profile_image(
    state: &AppState,
    user_id: i64,
    file: ImageFile,
) -> Result<String, AppError> {
    let bucket = &state.config.profile_bucket;
    let path = format!("public/{user_id}{}", file.extension());

    let stale = state
        .db
        .profile_image(user_id)
        .await?
        .and_then(|image| state.storage.object_path(bucket, &image.image_url))
        .filter(|old| *old != path);

    state
        .storage
        .upload(
            bucket,
            ObjectUpload {
                path: path.clone(),
                data: file.data,
                content_type: file.content_type,
                upsert: true,
            },
        )
        .await?;

    if let Some(old) = stale {
        if let Err(e) = state.storage.remove(bucket, &[old.clone()]).await {
            warn!("Failed to remove stale profile image {old}: {e}");
        }
    }

    Ok(state.storage.public_url(bucket, &path))
}

/// Deletes the stored objects behind `urls`. URLs that do not point into
/// `bucket` are skipped.
pub async fn remove_images<'a, I>(state: &AppState, bucket: &str, urls: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = &'a str>,
{
    let paths: Vec<String> = urls
        .into_iter()
        .filter_map(|url| {
            let path = state.storage.object_path(bucket, url);
            if path.is_none() {
                warn!("Skipping image outside bucket {bucket}: {url}");
            }
            path
        })
        .collect();

    state.storage.remove(bucket, &paths).await?;
    Ok(())
}
