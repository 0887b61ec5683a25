//! Query root.

use async_graphql::{Context, Object, Result, ResultExt, ID};

use super::request_context;
use crate::models::{DateTime, Photo, User};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated caller, or null for anonymous requests.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        Ok(request_context(ctx)?.current_user.clone())
    }

    async fn total_photos(&self, ctx: &Context<'_>) -> Result<i64> {
        request_context(ctx)?.store.count_photos().await.extend()
    }

    /// All photos in posting order, optionally only those created after `after`.
    async fn all_photos(&self, ctx: &Context<'_>, after: Option<DateTime>) -> Result<Vec<Photo>> {
        request_context(ctx)?.store.list_photos(after).await.extend()
    }

    async fn total_users(&self, ctx: &Context<'_>) -> Result<i64> {
        request_context(ctx)?.store.count_users().await.extend()
    }

    async fn all_users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        request_context(ctx)?.store.list_users().await.extend()
    }

    async fn user(&self, ctx: &Context<'_>, login: ID) -> Result<Option<User>> {
        request_context(ctx)?.store.find_user(&login).await.extend()
    }

    async fn photo(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Photo>> {
        request_context(ctx)?.store.find_photo(&id).await.extend()
    }
}
