//! SQLite-backed entity store.
//!
//! Enumeration order is rowid order, which is insertion order; an upsert keeps the row.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::EntityStore;
use crate::errors::AppError;
use crate::models::{DateTime, Photo, PhotoCategory, Tag, User};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for Repository {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Database not reachable: {}", e)))?;
        Ok(())
    }

    // ==================== USER OPERATIONS ====================

    async fn count_users(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT github_login, name, avatar, github_token FROM users ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn find_user(&self, github_login: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT github_login, name, avatar, github_token FROM users WHERE github_login = ?",
        )
        .bind(github_login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT github_login, name, avatar, github_token FROM users WHERE github_token = ? ORDER BY rowid LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for user in users {
            sqlx::query(
                "INSERT INTO users (github_login, name, avatar, github_token) VALUES (?, ?, ?, ?)",
            )
            .bind(&user.github_login)
            .bind(&user.name)
            .bind(&user.avatar)
            .bind(&user.github_token)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert_user(&self, user: &User) -> Result<User, AppError> {
        sqlx::query(
            r#"INSERT INTO users (github_login, name, avatar, github_token) VALUES (?, ?, ?, ?)
               ON CONFLICT(github_login) DO UPDATE SET
                   name = excluded.name,
                   avatar = excluded.avatar,
                   github_token = excluded.github_token"#,
        )
        .bind(&user.github_login)
        .bind(&user.name)
        .bind(&user.avatar)
        .bind(&user.github_token)
        .execute(&self.pool)
        .await?;

        Ok(user.clone())
    }

    // ==================== PHOTO OPERATIONS ====================

    async fn count_photos(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM photos")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    async fn list_photos(&self, after: Option<DateTime>) -> Result<Vec<Photo>, AppError> {
        // created is stored as epoch milliseconds
        let rows = match after {
            Some(after) => {
                sqlx::query(
                    "SELECT id, name, description, category, owner_login, created FROM photos WHERE created > ? ORDER BY rowid",
                )
                .bind(after.timestamp_millis())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, description, category, owner_login, created FROM photos ORDER BY rowid",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(photo_from_row).collect()
    }

    async fn find_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, category, owner_login, created FROM photos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(photo_from_row).transpose()
    }

    async fn insert_photo(&self, photo: &Photo) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO photos (id, name, description, category, owner_login, created) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&photo.id)
        .bind(&photo.name)
        .bind(&photo.description)
        .bind(photo.category.as_str())
        .bind(&photo.owner_login)
        .bind(photo.created.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ==================== TAG OPERATIONS ====================

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let rows = sqlx::query("SELECT photo_id, user_login FROM tags ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                photo_id: row.get("photo_id"),
                user_login: row.get("user_login"),
            })
            .collect())
    }

    async fn insert_tags(&self, tags: &[Tag]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for tag in tags {
            sqlx::query("INSERT INTO tags (photo_id, user_login) VALUES (?, ?)")
                .bind(&tag.photo_id)
                .bind(&tag.user_login)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        github_login: row.get("github_login"),
        name: row.get("name"),
        avatar: row.get("avatar"),
        github_token: row.get("github_token"),
    }
}

fn photo_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Photo, AppError> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let created: i64 = row.get("created");

    let created = DateTime::from_timestamp_millis(created).ok_or_else(|| {
        AppError::Database(format!("Photo {} has an out-of-range timestamp: {}", id, created))
    })?;

    Ok(Photo {
        name: row.get("name"),
        description: row.get("description"),
        category: category.parse().unwrap_or_else(|_| {
            tracing::warn!("Photo {} has unknown category {:?}", id, category);
            PhotoCategory::default()
        }),
        owner_login: row.get("owner_login"),
        created,
        id,
    })
}
