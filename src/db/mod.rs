//! Persistence for users, photos and tags.
//!
//! Both backends implement [`EntityStore`]; SQLite is the durable one.

mod memory;
mod repository;
pub mod seed;
mod store;

pub use memory::MemoryStore;
pub use repository::*;
pub use store::EntityStore;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::{Config, StoreKind};
use crate::errors::AppError;

/// Open the configured store and verify it is reachable.
pub async fn open_store(config: &Config) -> Result<Arc<dyn EntityStore>, AppError> {
    let store: Arc<dyn EntityStore> = match config.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Sqlite => {
            let pool = init_database(&config.db_path).await.map_err(|e| {
                AppError::StoreUnavailable(format!(
                    "Cannot open database {}: {}",
                    config.db_path.display(),
                    e
                ))
            })?;
            Arc::new(Repository::new(pool))
        }
    };

    store.ping().await?;
    Ok(store)
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            github_login TEXT PRIMARY KEY,
            name TEXT,
            avatar TEXT,
            github_token TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    // owner_login is not a foreign key
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photos (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL DEFAULT 'PORTRAIT',
            owner_login TEXT NOT NULL,
            created INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            photo_id TEXT NOT NULL,
            user_login TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_users_github_token ON users(github_token);
        CREATE INDEX IF NOT EXISTS idx_photos_owner_login ON photos(owner_login);
        CREATE INDEX IF NOT EXISTS idx_photos_created ON photos(created);
        CREATE INDEX IF NOT EXISTS idx_tags_photo_id ON tags(photo_id);
        CREATE INDEX IF NOT EXISTS idx_tags_user_login ON tags(user_login);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
