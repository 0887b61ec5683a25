//! Derived associations between photos and users.
//!
//! Photos point at their poster by login; tags relate photos and users many-to-many.
//! List joins keep the enumeration order of their source collection and drop any
//! reference that does not resolve.

use crate::db::EntityStore;
use crate::errors::AppError;
use crate::models::{Photo, User};

/// The user who posted `photo`, if that login exists.
pub async fn posted_by(store: &dyn EntityStore, photo: &Photo) -> Result<Option<User>, AppError> {
    store.find_user(&photo.owner_login).await
}

/// Users tagged in `photo`, one per tag row, duplicates included.
pub async fn tagged_users(store: &dyn EntityStore, photo: &Photo) -> Result<Vec<User>, AppError> {
    let logins: Vec<String> = store
        .list_tags()
        .await?
        .into_iter()
        .filter(|tag| tag.photo_id == photo.id)
        .map(|tag| tag.user_login)
        .collect();

    let mut users = Vec::with_capacity(logins.len());
    for login in logins {
        match store.find_user(&login).await? {
            Some(user) => users.push(user),
            None => tracing::debug!(photo_id = %photo.id, %login, "Dropping tag for unknown user"),
        }
    }
    Ok(users)
}

/// Photos whose owner is `user`, in store order.
pub async fn posted_photos(store: &dyn EntityStore, user: &User) -> Result<Vec<Photo>, AppError> {
    Ok(store
        .list_photos(None)
        .await?
        .into_iter()
        .filter(|photo| photo.owner_login == user.github_login)
        .collect())
}

/// Photos `user` is tagged in, one per tag row.
pub async fn in_photos(store: &dyn EntityStore, user: &User) -> Result<Vec<Photo>, AppError> {
    let photo_ids: Vec<String> = store
        .list_tags()
        .await?
        .into_iter()
        .filter(|tag| tag.user_login == user.github_login)
        .map(|tag| tag.photo_id)
        .collect();

    let mut photos = Vec::with_capacity(photo_ids.len());
    for id in photo_ids {
        match store.find_photo(&id).await? {
            Some(photo) => photos.push(photo),
            None => tracing::debug!(photo_id = %id, login = %user.github_login, "Dropping tag for unknown photo"),
        }
    }
    Ok(photos)
}
