//! GraphQL object types for photos and users.

use async_graphql::{Context, Object, Result, ResultExt, SimpleObject, ID};

use super::{relations, request_context};
use crate::models::{DateTime, Photo, PhotoCategory, User};

#[Object]
impl Photo {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn url(&self) -> String {
        self.image_url()
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    async fn category(&self) -> PhotoCategory {
        self.category
    }

    /// Null when the owning login has no user record.
    async fn posted_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let rc = request_context(ctx)?;
        relations::posted_by(rc.store.as_ref(), self).await.extend()
    }

    async fn tagged_users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let rc = request_context(ctx)?;
        relations::tagged_users(rc.store.as_ref(), self).await.extend()
    }

    async fn created(&self) -> DateTime {
        self.created
    }
}

#[Object]
impl User {
    async fn github_login(&self) -> ID {
        ID(self.github_login.clone())
    }

    async fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    async fn posted_photos(&self, ctx: &Context<'_>) -> Result<Vec<Photo>> {
        let rc = request_context(ctx)?;
        relations::posted_photos(rc.store.as_ref(), self).await.extend()
    }

    async fn in_photos(&self, ctx: &Context<'_>) -> Result<Vec<Photo>> {
        let rc = request_context(ctx)?;
        relations::in_photos(rc.store.as_ref(), self).await.extend()
    }
}

/// Result of a login: the caller's token and user record.
#[derive(SimpleObject, Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}
