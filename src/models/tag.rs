//! Tag model: the join record between photos and users.

use serde::{Deserialize, Serialize};

/// Marks a user as appearing in a photo. Pairs are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(rename = "photoID")]
    pub photo_id: String,
    #[serde(rename = "userID")]
    pub user_login: String,
}

#[cfg(test)]
impl Tag {
    pub fn new(photo_id: impl Into<String>, user_login: impl Into<String>) -> Self {
        Self {
            photo_id: photo_id.into(),
            user_login: user_login.into(),
        }
    }
}
