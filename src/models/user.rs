//! User model.

use serde::{Deserialize, Serialize};

/// A PhotoShare user, keyed by GitHub login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub github_login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Opaque bearer token; only authenticated or seeded users carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl User {
    pub fn new(github_login: impl Into<String>) -> Self {
        Self {
            github_login: github_login.into(),
            name: None,
            avatar: None,
            github_token: None,
        }
    }
}
