//! Photo model.

use std::str::FromStr;

use async_graphql::{Enum, InputObject};
use serde::{Deserialize, Serialize};

use super::DateTime;
use crate::errors::AppError;

/// Base URL photos are served from.
pub const PHOTO_URL_BASE: &str = "http://sample.com/img";

/// Photo category.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoCategory {
    Selfie,
    #[default]
    Portrait,
    Action,
    Landscape,
    Graphic,
}

impl PhotoCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoCategory::Selfie => "SELFIE",
            PhotoCategory::Portrait => "PORTRAIT",
            PhotoCategory::Action => "ACTION",
            PhotoCategory::Landscape => "LANDSCAPE",
            PhotoCategory::Graphic => "GRAPHIC",
        }
    }

}

impl FromStr for PhotoCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELFIE" => Ok(PhotoCategory::Selfie),
            "PORTRAIT" => Ok(PhotoCategory::Portrait),
            "ACTION" => Ok(PhotoCategory::Action),
            "LANDSCAPE" => Ok(PhotoCategory::Landscape),
            "GRAPHIC" => Ok(PhotoCategory::Graphic),
            _ => Err(AppError::Validation(format!("Unknown photo category {:?}", s))),
        }
    }
}

/// A posted photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: PhotoCategory,
    /// Login of the posting user; not checked against the user collection
    #[serde(rename = "githubUser")]
    pub owner_login: String,
    pub created: DateTime,
}

impl Photo {
    pub fn image_url(&self) -> String {
        format!("{}/{}.jpg", PHOTO_URL_BASE, self.id)
    }
}

/// Input for the `postPhoto` mutation.
#[derive(InputObject, Debug, Clone)]
pub struct PostPhotoInput {
    pub name: String,
    /// Explicit null falls back to the default category
    #[graphql(default_with = "Some(PhotoCategory::Portrait)")]
    pub category: Option<PhotoCategory>,
    pub description: Option<String>,
}
