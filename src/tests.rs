//! Integration tests for the PhotoShare backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{self, seed, EntityStore, MemoryStore};
use crate::github::GithubClient;
use crate::randomuser::RandomUserClient;
use crate::{create_router, graphql, AppState};

/// Fake GitHub and random-user endpoints, counting the calls they receive.
#[derive(Clone, Default)]
struct Upstream {
    token_calls: Arc<AtomicUsize>,
    profile_calls: Arc<AtomicUsize>,
    random_calls: Arc<AtomicUsize>,
}

async fn fake_token(State(up): State<Upstream>, Json(body): Json<Value>) -> Json<Value> {
    up.token_calls.fetch_add(1, Ordering::SeqCst);
    match body["code"].as_str() {
        Some("octo-code") => Json(json!({ "access_token": "gho_octo", "token_type": "bearer" })),
        Some("octo-code-2") => Json(json!({ "access_token": "gho_octo_2" })),
        _ => Json(json!({ "message": "bad_verification_code" })),
    }
}

async fn fake_profile(
    State(up): State<Upstream>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    up.profile_calls.fetch_add(1, Ordering::SeqCst);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer gho_octo") | Some("Bearer gho_octo_2") => Ok(Json(json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.example/octocat.png"
        }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn fake_random_users(
    State(up): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let batch = up.random_calls.fetch_add(1, Ordering::SeqCst);
    let count: usize = params
        .get("results")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let results: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "login": {
                    "username": format!("fake{}_{}", batch, i),
                    "sha1": format!("sha-{}-{}", batch, i)
                },
                "name": { "first": "Fake", "last": format!("User{}", i) },
                "picture": { "thumbnail": format!("https://pics.example/{}.jpg", i) }
            })
        })
        .collect();
    Json(json!({ "results": results }))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    store: Arc<dyn EntityStore>,
    upstream: Upstream,
    _temp_dir: Option<TempDir>,
}

impl TestFixture {
    async fn new() -> Self {
        let store = MemoryStore::new();
        seed::seed_if_empty(&store).await.expect("Failed to seed");
        Self::with_store(Arc::new(store), None).await
    }

    async fn sqlite() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let db_path = db_path.to_string_lossy().to_string();

        let vars: HashMap<&str, &str> = HashMap::from([
            ("PHOTOSHARE_GITHUB_CLIENT_ID", "id"),
            ("PHOTOSHARE_GITHUB_CLIENT_SECRET", "secret"),
            ("PHOTOSHARE_STORE", "sqlite"),
            ("PHOTOSHARE_DB_PATH", db_path.as_str()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("Failed to build config");

        let store = db::open_store(&config).await.expect("Failed to open store");
        seed::seed_if_empty(store.as_ref())
            .await
            .expect("Failed to seed");

        Self::with_store(store, Some(temp_dir)).await
    }

    async fn with_store(store: Arc<dyn EntityStore>, temp_dir: Option<TempDir>) -> Self {
        let upstream = Upstream::default();
        let upstream_url = spawn(
            Router::new()
                .route("/login/oauth/access_token", post(fake_token))
                .route("/user", get(fake_profile))
                .route("/api/", get(fake_random_users))
                .with_state(upstream.clone()),
        )
        .await;

        let timeout = std::time::Duration::from_secs(5);
        let github = GithubClient::new(
            "id",
            "secret",
            format!("{}/login/oauth/access_token", upstream_url),
            upstream_url.clone(),
            timeout,
        )
        .expect("Failed to build GitHub client");
        let random_users = RandomUserClient::new(format!("{}/api/", upstream_url), timeout)
            .expect("Failed to build random user client");

        let state = AppState {
            store: store.clone(),
            schema: graphql::build_schema(github, random_users),
        };
        let base_url = spawn(create_router(state)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            store,
            upstream,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn gql(&self, token: Option<&str>, query: &str, variables: Value) -> Value {
        let mut request = self
            .client
            .post(self.url("/graphql"))
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

fn error_code(body: &Value) -> &str {
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_graphiql_page() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/graphql"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("graphiql"));
}

#[tokio::test]
async fn test_anonymous_queries() {
    let fixture = TestFixture::new().await;

    let body = fixture
        .gql(
            None,
            "{ me { githubLogin } totalPhotos totalUsers allUsers { githubLogin } }",
            json!({}),
        )
        .await;

    assert!(body.get("errors").is_none(), "{}", body);
    assert_eq!(body["data"]["me"], Value::Null);
    assert_eq!(body["data"]["totalPhotos"], 3);
    assert_eq!(body["data"]["totalUsers"], 3);
    assert_eq!(
        body["data"]["allUsers"],
        json!([
            { "githubLogin": "mHattrup" },
            { "githubLogin": "gPlake" },
            { "githubLogin": "sSchmidt" }
        ])
    );
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let fixture = TestFixture::new().await;

    let body = fixture
        .gql(Some("not-a-token"), "{ me { githubLogin } }", json!({}))
        .await;

    assert!(body.get("errors").is_none(), "{}", body);
    assert_eq!(body["data"]["me"], Value::Null);
}

#[tokio::test]
async fn test_github_auth_then_post_photo() {
    let fixture = TestFixture::new().await;

    let login = fixture
        .gql(
            None,
            r#"mutation($code: String!) { githubAuth(code: $code) { token user { githubLogin name avatar } } }"#,
            json!({ "code": "octo-code" }),
        )
        .await;

    assert!(login.get("errors").is_none(), "{}", login);
    let token = login["data"]["githubAuth"]["token"].as_str().unwrap();
    assert_eq!(token, "gho_octo");
    assert_eq!(
        login["data"]["githubAuth"]["user"],
        json!({
            "githubLogin": "octocat",
            "name": "The Octocat",
            "avatar": "https://avatars.example/octocat.png"
        })
    );

    let me = fixture.gql(Some(token), "{ me { githubLogin } }", json!({})).await;
    assert_eq!(me["data"]["me"]["githubLogin"], "octocat");

    let posted = fixture
        .gql(
            Some(token),
            r#"mutation($input: PostPhotoInput!) {
                postPhoto(input: $input) { id name category created postedBy { githubLogin } }
            }"#,
            json!({ "input": { "name": "Octo selfie", "category": "SELFIE" } }),
        )
        .await;

    assert!(posted.get("errors").is_none(), "{}", posted);
    let photo = &posted["data"]["postPhoto"];
    assert_eq!(photo["name"], "Octo selfie");
    assert_eq!(photo["category"], "SELFIE");
    assert_eq!(photo["postedBy"]["githubLogin"], "octocat");
    let created = photo["created"].as_str().unwrap();
    assert!(created.ends_with('Z') && created.len() == "2018-04-15T19:09:57.308Z".len());

    let mine = fixture
        .gql(
            None,
            r#"{ user(login: "octocat") { postedPhotos { name } } totalPhotos }"#,
            json!({}),
        )
        .await;
    assert_eq!(
        mine["data"]["user"]["postedPhotos"],
        json!([{ "name": "Octo selfie" }])
    );
    assert_eq!(mine["data"]["totalPhotos"], 4);
}

#[tokio::test]
async fn test_github_auth_again_replaces_user() {
    let fixture = TestFixture::new().await;
    let query = r#"mutation($code: String!) { githubAuth(code: $code) { token } }"#;

    fixture.gql(None, query, json!({ "code": "octo-code" })).await;
    let second = fixture.gql(None, query, json!({ "code": "octo-code-2" })).await;
    assert_eq!(second["data"]["githubAuth"]["token"], "gho_octo_2");

    assert_eq!(fixture.store.count_users().await.unwrap(), 4);

    let stale = fixture.gql(Some("gho_octo"), "{ me { githubLogin } }", json!({})).await;
    assert_eq!(stale["data"]["me"], Value::Null);

    let fresh = fixture
        .gql(Some("gho_octo_2"), "{ me { githubLogin } }", json!({}))
        .await;
    assert_eq!(fresh["data"]["me"]["githubLogin"], "octocat");
}

#[tokio::test]
async fn test_github_auth_bad_code_skips_profile() {
    let fixture = TestFixture::new().await;

    let body = fixture
        .gql(
            None,
            r#"mutation { githubAuth(code: "wrong") { token } }"#,
            json!({}),
        )
        .await;

    assert_eq!(error_code(&body), "UPSTREAM_AUTH_FAILED");
    assert_eq!(body["errors"][0]["message"], "bad_verification_code");
    assert_eq!(fixture.upstream.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.upstream.profile_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.store.count_users().await.unwrap(), 3);
}

#[tokio::test]
async fn test_post_photo_requires_token() {
    let fixture = TestFixture::new().await;

    let body = fixture
        .gql(
            None,
            r#"mutation { postPhoto(input: { name: "Anonymous" }) { id } }"#,
            json!({}),
        )
        .await;

    assert_eq!(error_code(&body), "UNAUTHORIZED");
    assert_eq!(
        body["errors"][0]["message"],
        "only an authorized user can post a photo"
    );
    assert_eq!(fixture.store.count_photos().await.unwrap(), 3);
}

#[tokio::test]
async fn test_fake_users_flow() {
    let fixture = TestFixture::new().await;

    let added = fixture
        .gql(
            None,
            "mutation { addFakeUsers(count: 3) { githubLogin name avatar } }",
            json!({}),
        )
        .await;

    assert!(added.get("errors").is_none(), "{}", added);
    let users = added["data"]["addFakeUsers"].as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["githubLogin"], "fake0_0");
    assert_eq!(users[0]["name"], "Fake User0");
    assert_eq!(fixture.store.count_users().await.unwrap(), 6);

    let auth = fixture
        .gql(
            None,
            r#"mutation { fakeUserAuth(githubLogin: "fake0_1") { token user { githubLogin } } }"#,
            json!({}),
        )
        .await;
    let token = auth["data"]["fakeUserAuth"]["token"].as_str().unwrap();
    assert_eq!(token, "sha-0-1");

    let me = fixture.gql(Some(token), "{ me { githubLogin } }", json!({})).await;
    assert_eq!(me["data"]["me"]["githubLogin"], "fake0_1");

    let default_count = fixture
        .gql(None, "mutation { addFakeUsers { githubLogin } }", json!({}))
        .await;
    assert_eq!(
        default_count["data"]["addFakeUsers"].as_array().unwrap().len(),
        1
    );
    assert_eq!(fixture.upstream.random_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fake_user_auth_unknown_login() {
    let fixture = TestFixture::new().await;

    let body = fixture
        .gql(
            None,
            r#"mutation { fakeUserAuth(githubLogin: "nobody") { token } }"#,
            json!({}),
        )
        .await;

    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_sqlite_backed_relations() {
    let fixture = TestFixture::sqlite().await;

    let body = fixture
        .gql(
            None,
            r#"{
                photo(id: "1") { name taggedUsers { githubLogin } postedBy { name } }
                user(login: "gPlake") { inPhotos { id } postedPhotos { id } }
            }"#,
            json!({}),
        )
        .await;

    assert!(body.get("errors").is_none(), "{}", body);
    assert_eq!(body["data"]["photo"]["name"], "Dropping the Heart Chute");
    assert_eq!(
        body["data"]["photo"]["taggedUsers"],
        json!([{ "githubLogin": "gPlake" }])
    );
    assert_eq!(body["data"]["photo"]["postedBy"]["name"], "Glen Plake");
    assert_eq!(
        body["data"]["user"]["inPhotos"],
        json!([{ "id": "1" }, { "id": "2" }])
    );
    assert_eq!(body["data"]["user"]["postedPhotos"], json!([{ "id": "1" }]));
}

#[tokio::test]
async fn test_sqlite_github_auth_persists_token() {
    let fixture = TestFixture::sqlite().await;

    fixture
        .gql(
            None,
            r#"mutation { githubAuth(code: "octo-code") { token } }"#,
            json!({}),
        )
        .await;

    let stored = fixture.store.find_user("octocat").await.unwrap().unwrap();
    assert_eq!(stored.github_token.as_deref(), Some("gho_octo"));

    let me = fixture.gql(Some("gho_octo"), "{ me { name } }", json!({})).await;
    assert_eq!(me["data"]["me"]["name"], "The Octocat");
}
