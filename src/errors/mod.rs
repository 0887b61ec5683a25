//! Error handling module for the PhotoShare backend.
//!
//! Provides the centralized error type and its mapping onto GraphQL error extensions.

use async_graphql::ErrorExtensions;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UPSTREAM_AUTH_FAILED: &str = "UPSTREAM_AUTH_FAILED";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Mutation requires an authenticated caller
    Unauthorized(String),
    /// Referenced entity does not exist
    NotFound(String),
    /// OAuth provider answered with a message instead of a token
    UpstreamAuth(String),
    /// Outbound HTTP call failed
    Upstream(String),
    /// Validation error
    Validation(String),
    /// Entity with the same key already exists
    Conflict(String),
    /// Database error
    Database(String),
    /// Store could not be reached at startup
    StoreUnavailable(String),
    /// Missing or malformed configuration
    Config(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::UpstreamAuth(_) => codes::UPSTREAM_AUTH_FAILED,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::StoreUnavailable(_) => codes::STORE_UNAVAILABLE,
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::UpstreamAuth(msg)
            | AppError::Upstream(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Database(msg)
            | AppError::StoreUnavailable(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                tracing::warn!("Unique constraint violated: {}", db_err);
                return AppError::Conflict(format!("Duplicate record: {}", db_err.message()));
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Upstream HTTP error: {:?}", err);
        if err.is_timeout() {
            AppError::Upstream("Upstream request timed out".to_string())
        } else {
            AppError::Upstream(format!("Upstream request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::warn!("JSON error: {:?}", err);
        AppError::Upstream(format!("JSON error: {}", err))
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.message()).extend_with(|_, e| e.set("code", self.error_code()))
    }
}
