//! GitHub OAuth exchange.
//!
//! Two strictly ordered calls: the authorization code is exchanged for an access token,
//! then the token is used to fetch the user's profile. A token response that carries
//! an error message ends the exchange before the profile request is made.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const USER_AGENT: &str = concat!("photoshare-backend/", env!("CARGO_PKG_VERSION"));

/// Body of the token exchange request.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Token endpoint answer: either an access token or an error message.
#[derive(Debug, Default, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AccessTokenResponse {
    /// The access token, or the provider's message explaining why there is none.
    pub fn into_token(self) -> Result<String, AppError> {
        if let Some(message) = self.message.or(self.error_description).or(self.error) {
            return Err(AppError::UpstreamAuth(message));
        }

        self.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::UpstreamAuth("GitHub did not return an access token".to_string())
            })
    }
}

/// Subset of the GitHub user profile the service keeps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Merged result of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubAuthorization {
    pub profile: GithubProfile,
    pub access_token: String,
}

/// Client for the GitHub OAuth token endpoint and user API.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    oauth_url: String,
    api_url: String,
}

impl GithubClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        oauth_url: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            oauth_url: oauth_url.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run the full exchange for an authorization code.
    pub async fn authorize(&self, code: &str) -> Result<GithubAuthorization, AppError> {
        let access_token = self.request_token(code).await?.into_token()?;
        let profile = self.request_user_account(&access_token).await?;

        tracing::info!(login = %profile.login, "GitHub authorization succeeded");
        Ok(GithubAuthorization {
            profile,
            access_token,
        })
    }

    /// Step 1: exchange the authorization code.
    pub async fn request_token(&self, code: &str) -> Result<AccessTokenResponse, AppError> {
        let body = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
        };

        let response = self
            .http
            .post(&self.oauth_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<AccessTokenResponse>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(AppError::UpstreamAuth(format!(
                "GitHub token endpoint returned {}",
                status
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Step 2: fetch the profile of the token's owner.
    pub async fn request_user_account(&self, access_token: &str) -> Result<GithubProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/user", self.api_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("GitHub user API returned {}", status));
            return Err(AppError::UpstreamAuth(message));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
