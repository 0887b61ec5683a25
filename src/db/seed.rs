//! Fixture data for a fresh store.

use serde::Deserialize;

use super::EntityStore;
use crate::errors::AppError;
use crate::models::{Photo, Tag, User};

const FIXTURES: &str = r#"{
  "users": [
    { "githubLogin": "mHattrup", "name": "Mike Hattrup" },
    { "githubLogin": "gPlake", "name": "Glen Plake" },
    { "githubLogin": "sSchmidt", "name": "Scot Schmidt" }
  ],
  "photos": [
    {
      "id": "1",
      "name": "Dropping the Heart Chute",
      "description": "the 1",
      "category": "ACTION",
      "githubUser": "gPlake",
      "created": "3-28-1977"
    },
    {
      "id": "2",
      "name": "Enjoying the sunshine",
      "description": "the 2",
      "category": "SELFIE",
      "githubUser": "sSchmidt",
      "created": "1-2-1985"
    },
    {
      "id": "3",
      "name": "Gunbarrel 25",
      "description": "the 3",
      "category": "LANDSCAPE",
      "githubUser": "sSchmidt",
      "created": "2018-04-15T19:09:57.308Z"
    }
  ],
  "tags": [
    { "photoID": "1", "userID": "gPlake" },
    { "photoID": "2", "userID": "sSchmidt" },
    { "photoID": "2", "userID": "mHattrup" },
    { "photoID": "2", "userID": "gPlake" }
  ]
}"#;

/// The fixture collections.
#[derive(Debug, Deserialize)]
pub struct Fixtures {
    pub users: Vec<User>,
    pub photos: Vec<Photo>,
    pub tags: Vec<Tag>,
}

impl Fixtures {
    pub fn load() -> Result<Self, AppError> {
        serde_json::from_str(FIXTURES)
            .map_err(|e| AppError::Config(format!("Bad fixture data: {}", e)))
    }
}

/// Load the fixtures into the store unless it already holds users or photos.
///
/// Returns whether anything was written.
pub async fn seed_if_empty(store: &dyn EntityStore) -> Result<bool, AppError> {
    if store.count_users().await? > 0 || store.count_photos().await? > 0 {
        tracing::info!("Store already populated, skipping fixtures");
        return Ok(false);
    }

    let fixtures = Fixtures::load()?;

    store.insert_users(&fixtures.users).await?;
    for photo in &fixtures.photos {
        store.insert_photo(photo).await?;
    }
    store.insert_tags(&fixtures.tags).await?;

    tracing::info!(
        users = fixtures.users.len(),
        photos = fixtures.photos.len(),
        tags = fixtures.tags.len(),
        "Seeded fixture data"
    );
    Ok(true)
}
