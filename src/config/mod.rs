//! Configuration module for the PhotoShare backend.
//!
//! All configuration is loaded from environment variables with sensible defaults. The
//! GitHub OAuth credentials have no default and must be present at startup.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

/// Which entity store backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            _ => Err(AppError::Config(format!(
                "Invalid PHOTOSHARE_STORE {:?}, expected \"sqlite\" or \"memory\"",
                s
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// GitHub OAuth application client id
    pub github_client_id: String,
    /// GitHub OAuth application client secret
    pub github_client_secret: String,
    /// Entity store backend
    pub store: StoreKind,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Seed fixture users, photos and tags into an empty store
    pub seed_fixtures: bool,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,
    /// GitHub endpoint exchanging an authorization code for a token
    pub github_oauth_url: String,
    /// GitHub REST API base URL
    pub github_api_url: String,
    /// Random user generator endpoint
    pub random_user_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_client_id", &self.github_client_id)
            .field("github_client_secret", &"<redacted>")
            .field("store", &self.store)
            .field("db_path", &self.db_path)
            .field("seed_fixtures", &self.seed_fixtures)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("http_timeout", &self.http_timeout)
            .field("github_oauth_url", &self.github_oauth_url)
            .field("github_api_url", &self.github_api_url)
            .field("random_user_url", &self.random_user_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| AppError::Config(format!("{} must be set", key)))
        };

        let github_client_id = required("PHOTOSHARE_GITHUB_CLIENT_ID")?;
        let github_client_secret = required("PHOTOSHARE_GITHUB_CLIENT_SECRET")?;

        let store = match var("PHOTOSHARE_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreKind::Sqlite,
        };

        let db_path = var("PHOTOSHARE_DB_PATH")
            .unwrap_or_else(|| "./data/photoshare.sqlite".to_string())
            .into();

        let seed_fixtures = match var("PHOTOSHARE_SEED_FIXTURES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("Invalid PHOTOSHARE_SEED_FIXTURES {:?}", raw))
            })?,
            None => true,
        };

        let bind_addr = var("PHOTOSHARE_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:4000".to_string());
        let bind_addr = bind_addr.parse().map_err(|_| {
            AppError::Config(format!("Invalid PHOTOSHARE_BIND_ADDR format: {}", bind_addr))
        })?;

        let log_level = var("PHOTOSHARE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let http_timeout = match var("PHOTOSHARE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!("Invalid PHOTOSHARE_HTTP_TIMEOUT_SECS {:?}", raw))
                })?,
            None => Duration::from_secs(10),
        };

        let github_oauth_url = var("PHOTOSHARE_GITHUB_OAUTH_URL")
            .unwrap_or_else(|| "https://github.com/login/oauth/access_token".to_string());
        let github_api_url =
            var("PHOTOSHARE_GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".to_string());
        let random_user_url = var("PHOTOSHARE_RANDOM_USER_URL")
            .unwrap_or_else(|| "https://randomuser.me/api/".to_string());

        Ok(Self {
            github_client_id,
            github_client_secret,
            store,
            db_path,
            seed_fixtures,
            bind_addr,
            log_level,
            http_timeout,
            github_oauth_url,
            github_api_url,
            random_user_url,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
