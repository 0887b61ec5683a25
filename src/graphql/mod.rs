//! GraphQL API module.
//!
//! Schema construction and the HTTP handlers serving it.

mod mutation;
mod query;
mod relations;
mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use std::any::{type_name, Any};

use async_graphql::{
    extensions::Tracing, http::GraphiQLSource, Context, EmptySubscription, ErrorExtensions, Schema,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
};

use crate::auth::{self, RequestContext};
use crate::errors::AppError;
use crate::github::GithubClient;
use crate::randomuser::RandomUserClient;
use crate::AppState;

/// The complete GraphQL schema type.
pub type PhotoShareSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema. Process-wide collaborators live in schema data; the store and
/// caller identity arrive per request in a [`RequestContext`].
pub fn build_schema(github: GithubClient, random_users: RandomUserClient) -> PhotoShareSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .extension(Tracing)
        .data(github)
        .data(random_users)
        .finish()
}

pub(crate) fn request_context<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a RequestContext> {
    collaborator(ctx)
}

/// Look up a value placed in schema or request data.
pub(crate) fn collaborator<'a, T>(ctx: &Context<'a>) -> async_graphql::Result<&'a T>
where
    T: Any + Send + Sync,
{
    ctx.data_opt::<T>().ok_or_else(|| {
        tracing::error!("{} missing from GraphQL context", type_name::<T>());
        AppError::Internal("Server is missing a required component".to_string()).extend()
    })
}

/// POST /graphql - Execute a query or mutation.
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let token = auth::bearer_token(&headers);
    let ctx = auth::resolve_context(state.store.clone(), token.as_deref()).await;

    state.schema.execute(req.into_inner().data(ctx)).await.into()
}

/// GET /graphql - GraphiQL explorer.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
