//! Per-request caller identity.
//!
//! The `Authorization` header carries an opaque token that is matched verbatim against
//! the tokens stored on users. Unknown or missing tokens make the request anonymous.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::db::EntityStore;
use crate::errors::AppError;
use crate::models::User;

/// Context handed to every resolver of one GraphQL request.
#[derive(Clone)]
pub struct RequestContext {
    pub store: Arc<dyn EntityStore>,
    pub current_user: Option<User>,
}

impl RequestContext {
    pub fn anonymous(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            current_user: None,
        }
    }

    /// The authenticated caller, or `Unauthorized` with the given message.
    pub fn require_user(&self, message: &str) -> Result<&User, AppError> {
        self.current_user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized(message.to_string()))
    }
}

/// Extract the caller's token, accepting both `Bearer <token>` and a bare token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Build the request context, looking up the caller by token.
pub async fn resolve_context(store: Arc<dyn EntityStore>, token: Option<&str>) -> RequestContext {
    let Some(token) = token else {
        return RequestContext::anonymous(store);
    };

    let current_user = match store.find_user_by_token(token).await {
        Ok(Some(user)) => {
            tracing::debug!(login = %user.github_login, "Authenticated request");
            Some(user)
        }
        Ok(None) => {
            tracing::debug!("Unknown bearer token, treating request as anonymous");
            None
        }
        Err(e) => {
            tracing::warn!("Failed to resolve bearer token: {}", e);
            None
        }
    };

    RequestContext {
        store,
        current_user,
    }
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}
