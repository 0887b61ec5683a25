//! The entity store contract shared by every persistence backend.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{DateTime, Photo, Tag, User};

/// Persistence over the users, photos and tags collections.
///
/// List operations return records in insertion order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    async fn count_users(&self) -> Result<i64, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn find_user(&self, github_login: &str) -> Result<Option<User>, AppError>;

    /// Find the user holding exactly this bearer token.
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, AppError>;

    /// Insert all users or none; a login that already exists is a conflict.
    async fn insert_users(&self, users: &[User]) -> Result<(), AppError>;

    /// Replace the user with the same login, inserting it if absent.
    async fn upsert_user(&self, user: &User) -> Result<User, AppError>;

    async fn count_photos(&self) -> Result<i64, AppError>;

    /// List photos, optionally only those created strictly after `after`.
    async fn list_photos(&self, after: Option<DateTime>) -> Result<Vec<Photo>, AppError>;

    async fn find_photo(&self, id: &str) -> Result<Option<Photo>, AppError>;

    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError>;

    async fn insert_tags(&self, tags: &[Tag]) -> Result<(), AppError>;
}
