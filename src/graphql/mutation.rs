//! Mutation root and the operations behind it.

use async_graphql::{Context, Object, Result, ResultExt, ID};
use uuid::Uuid;

use super::{collaborator, request_context};
use super::types::AuthPayload;
use crate::auth::RequestContext;
use crate::errors::AppError;
use crate::github::GithubClient;
use crate::models::{DateTime, Photo, PostPhotoInput, User};
use crate::randomuser::{self, RandomUserClient};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Post a photo as the authenticated caller.
    async fn post_photo(&self, ctx: &Context<'_>, input: PostPhotoInput) -> Result<Photo> {
        post_photo(request_context(ctx)?, input).await.extend()
    }

    /// Log in with a GitHub OAuth authorization code.
    async fn github_auth(&self, ctx: &Context<'_>, code: String) -> Result<AuthPayload> {
        let github = collaborator::<GithubClient>(ctx)?;
        github_auth(request_context(ctx)?, github, &code).await.extend()
    }

    /// Create `count` users from the random user generator.
    async fn add_fake_users(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 1)] count: i32,
    ) -> Result<Vec<User>> {
        let random_users = collaborator::<RandomUserClient>(ctx)?;
        add_fake_users(request_context(ctx)?, random_users, count)
            .await
            .extend()
    }

    /// Log in as an existing fake user without GitHub.
    async fn fake_user_auth(&self, ctx: &Context<'_>, github_login: ID) -> Result<AuthPayload> {
        fake_user_auth(request_context(ctx)?, &github_login)
            .await
            .extend()
    }
}

pub async fn post_photo(rc: &RequestContext, input: PostPhotoInput) -> Result<Photo, AppError> {
    let user = rc.require_user("only an authorized user can post a photo")?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Photo name is required".to_string()));
    }

    let photo = Photo {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: input.description,
        category: input.category.unwrap_or_default(),
        owner_login: user.github_login.clone(),
        created: DateTime::now(),
    };

    rc.store.insert_photo(&photo).await?;
    tracing::info!(photo_id = %photo.id, login = %photo.owner_login, "Photo posted");
    Ok(photo)
}

pub async fn github_auth(
    rc: &RequestContext,
    github: &GithubClient,
    code: &str,
) -> Result<AuthPayload, AppError> {
    let authorization = github.authorize(code).await?;

    let latest = User {
        name: authorization.profile.name,
        avatar: authorization.profile.avatar_url,
        github_token: Some(authorization.access_token.clone()),
        ..User::new(authorization.profile.login)
    };
    let user = rc.store.upsert_user(&latest).await?;

    Ok(AuthPayload {
        token: authorization.access_token,
        user,
    })
}

pub async fn add_fake_users(
    rc: &RequestContext,
    random_users: &RandomUserClient,
    count: i32,
) -> Result<Vec<User>, AppError> {
    if !(1..=randomuser::MAX_RESULTS).contains(&count) {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {}",
            randomuser::MAX_RESULTS
        )));
    }

    let users = random_users.fetch_users(count).await?;
    rc.store.insert_users(&users).await?;

    tracing::info!(count = users.len(), "Added fake users");
    Ok(users)
}

pub async fn fake_user_auth(rc: &RequestContext, github_login: &str) -> Result<AuthPayload, AppError> {
    let user = rc.store.find_user(github_login).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "Cannot find user with githubLogin \"{}\"",
            github_login
        ))
    })?;

    Ok(AuthPayload {
        token: user.github_token.clone().unwrap_or_default(),
        user,
    })
}
