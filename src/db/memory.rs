//! In-memory entity store.
//!
//! Keeps each collection in a vector behind a single lock, so insertion order is the
//! enumeration order.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::EntityStore;
use crate::auth::constant_time_compare;
use crate::errors::AppError;
use crate::models::{DateTime, Photo, Tag, User};

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    photos: Vec<Photo>,
    tags: Vec<Tag>,
}

/// Entity store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.users.len() as i64)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn find_user(&self, github_login: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.github_login == github_login)
            .cloned())
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| {
                u.github_token
                    .as_deref()
                    .is_some_and(|stored| constant_time_compare(stored, token))
            })
            .cloned())
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), AppError> {
        let mut data = self.inner.write().await;

        for (i, user) in users.iter().enumerate() {
            let taken = data.users.iter().any(|u| u.github_login == user.github_login)
                || users[..i].iter().any(|u| u.github_login == user.github_login);
            if taken {
                return Err(AppError::Conflict(format!(
                    "User {} already exists",
                    user.github_login
                )));
            }
        }

        data.users.extend_from_slice(users);
        Ok(())
    }

    async fn upsert_user(&self, user: &User) -> Result<User, AppError> {
        let mut data = self.inner.write().await;

        match data
            .users
            .iter_mut()
            .find(|u| u.github_login == user.github_login)
        {
            Some(existing) => *existing = user.clone(),
            None => data.users.push(user.clone()),
        }

        Ok(user.clone())
    }

    async fn count_photos(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.photos.len() as i64)
    }

    async fn list_photos(&self, after: Option<DateTime>) -> Result<Vec<Photo>, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .photos
            .iter()
            .filter(|p| after.map_or(true, |after| p.created > after))
            .cloned()
            .collect())
    }

    async fn find_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let data = self.inner.read().await;
        Ok(data.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        if data.photos.iter().any(|p| p.id == photo.id) {
            return Err(AppError::Conflict(format!("Photo {} already exists", photo.id)));
        }
        data.photos.push(photo.clone());
        Ok(())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        Ok(self.inner.read().await.tags.clone())
    }

    async fn insert_tags(&self, tags: &[Tag]) -> Result<(), AppError> {
        self.inner.write().await.tags.extend_from_slice(tags);
        Ok(())
    }
}
