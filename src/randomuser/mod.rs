//! Client for the random user generator API used to seed fake accounts.

use std::time::Duration;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::User;

/// Largest batch the generator serves in one request.
pub const MAX_RESULTS: i32 = 5000;

#[derive(Debug, Deserialize)]
struct RandomUserResponse {
    results: Vec<RandomUser>,
}

#[derive(Debug, Deserialize)]
struct RandomUser {
    login: RandomLogin,
    name: RandomName,
    #[serde(default)]
    picture: Option<RandomPicture>,
}

#[derive(Debug, Deserialize)]
struct RandomLogin {
    username: String,
    sha1: String,
}

#[derive(Debug, Deserialize)]
struct RandomName {
    first: String,
    last: String,
}

#[derive(Debug, Deserialize)]
struct RandomPicture {
    thumbnail: String,
}

impl From<RandomUser> for User {
    fn from(r: RandomUser) -> Self {
        User {
            github_login: r.login.username,
            name: Some(format!("{} {}", r.name.first, r.name.last)),
            avatar: r.picture.map(|p| p.thumbnail),
            github_token: Some(r.login.sha1),
        }
    }
}

#[derive(Clone)]
pub struct RandomUserClient {
    http: reqwest::Client,
    url: String,
}

impl RandomUserClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetch `count` generated users, each carrying its own token.
    pub async fn fetch_users(&self, count: i32) -> Result<Vec<User>, AppError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("results", count)])
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let parsed: RandomUserResponse = serde_json::from_str(&text)?;

        tracing::debug!(requested = count, received = parsed.results.len(), "Fetched random users");
        Ok(parsed.results.into_iter().map(User::from).collect())
    }
}
