//! PhotoShare Backend
//!
//! A GraphQL API for posting and browsing photos, with GitHub OAuth login and a
//! pluggable entity store (SQLite or in-memory).

mod auth;
mod config;
mod db;
mod errors;
mod github;
mod graphql;
mod models;
mod randomuser;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::EntityStore;
use github::GithubClient;
use graphql::PhotoShareSchema;
use randomuser::RandomUserClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub schema: PhotoShareSchema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PhotoShare Backend");
    tracing::info!("Store: {:?}", config.store);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Open the store; an unreachable store is fatal
    let store = match db::open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Entity store unavailable: {}", e);
            return Err(e.into());
        }
    };

    if config.seed_fixtures {
        db::seed::seed_if_empty(store.as_ref()).await?;
    }

    let github = GithubClient::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.github_oauth_url.clone(),
        config.github_api_url.clone(),
        config.http_timeout,
    )?;
    let random_users = RandomUserClient::new(config.random_user_url.clone(), config.http_timeout)?;

    // Create application state
    let state = AppState {
        store,
        schema: graphql::build_schema(github, random_users),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("GraphQL service running on http://{}/graphql", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
