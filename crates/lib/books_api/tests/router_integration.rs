//! Integration tests: build the router over in-memory backends and drive it
//! with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use books_api::config::ApiConfig;
use books_api::{AppState, Backends};
use books_core::cache::MemoryCache;
use books_core::models::UserPermission;
use books_core::store::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        page_size: 2,
        jwt_secret: "integration-secret".into(),
        token_validity_hours: 1,
        cache_ttl_secs: 3600,
        cache_timeout_secs: 1,
        request_timeout_secs: 5,
        bcrypt_cost: 4,
    }
}

struct TestApp {
    state: AppState,
    store: Arc<MemoryStore>,
}

impl TestApp {
    fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new(config.page_size));
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(config.cache_ttl_secs)));
        let backends = Backends::in_memory(store.clone(), cache);
        Self {
            state: AppState::new(config, backends).expect("app state"),
            store,
        }
    }

    fn router(&self) -> Router {
        books_api::router(self.state.clone())
    }

    fn token(&self, permission: UserPermission) -> String {
        self.state
            .keeper
            .issue_token(1, "tester@x.com", permission)
            .expect("issue token")
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("request");

        let resp = self.router().oneshot(req).await.expect("response");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }
}

fn book(title: &str) -> Value {
    json!({
        "title": title,
        "author": "Ursula K. Le Guin",
        "published_at": "1969",
        "description": "",
        "isbn": "",
        "total_pages": 300
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn book_writes_require_author() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::POST, "/books", None, Some(book("A"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "token is required"}));

    let user = app.token(UserPermission::User);
    let (status, body) = app
        .send(Method::POST, "/books", Some(&user), Some(book("A")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    let author = app.token(UserPermission::Author);
    let (status, body) = app
        .send(Method::POST, "/books", Some(&author), Some(book("A")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "A");
    assert!(body["id"].as_i64().is_some());
}

#[tokio::test]
async fn listing_is_cached_per_offset() {
    let app = TestApp::new();
    let admin = app.token(UserPermission::Admin);
    for title in ["A", "B", "C"] {
        let (status, _) = app
            .send(Method::POST, "/books", Some(&admin), Some(book(title)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, first) = app.send(Method::GET, "/books?o=0", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.as_array().map(Vec::len), Some(2));

    let (_, second_page) = app.send(Method::GET, "/books?o=2", None, None).await;
    assert_eq!(second_page.as_array().map(Vec::len), Some(1));

    // Cached page survives a mutation until its TTL runs out.
    let (status, _) = app
        .send(Method::DELETE, "/books/1", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, again) = app.send(Method::GET, "/books?o=0", None, None).await;
    assert_eq!(again, first);

    // A search goes to storage and sees the delete.
    let (_, searched) = app.send(Method::GET, "/books?q=le%20guin", None, None).await;
    assert_eq!(searched.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn invalid_offset_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/books?o=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid offset"}));
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/books/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = app.send(Method::GET, "/books/nope", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_book_keeps_absent_fields() {
    let app = TestApp::new();
    let author = app.token(UserPermission::Author);
    let (_, created) = app
        .send(Method::POST, "/books", Some(&author), Some(book("Old")))
        .await;
    let id = created["id"].as_i64().expect("id");

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/books/{id}"),
            Some(&author),
            Some(json!({"title": "New"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "New");
    assert_eq!(updated["author"], created["author"]);
}

#[tokio::test]
async fn sign_up_sign_in_and_review() {
    let app = TestApp::new();
    let credential = json!({"email": "reader@x.com", "password": "pw"});

    let (status, view) = app
        .send(Method::POST, "/users", None, Some(credential.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["email"], "reader@x.com");
    assert!(view.get("password_hash").is_none());
    assert!(view.get("salt").is_none());

    let (status, signed_in) = app
        .send(Method::POST, "/users/sign-in", None, Some(credential))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signed_in["id"], view["id"]);
    let token = signed_in["token"].as_str().expect("token").to_string();
    let claims = app.state.keeper.verify_and_decode(&token).expect("claims");
    assert_eq!(Some(claims.user_id), view["id"].as_i64());
    assert_eq!(claims.permission, UserPermission::User);

    let (status, review) = app
        .send(
            Method::POST,
            "/reviews",
            Some(&token),
            Some(json!({"book_id": 1, "title": "Loved it", "content": "Great"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["author"], "reader@x.com");
    let id = review["id"].as_str().expect("id").to_string();

    let (status, listed) = app
        .send(Method::GET, "/books/1/reviews?q=great", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/reviews/{id}"),
            Some(&token),
            Some(json!({"title": "", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("/reviews/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Plain users may review but not edit books.
    let (status, _) = app
        .send(Method::POST, "/books", Some(&token), Some(book("Nope")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_sign_in_can_write_books() {
    let app = TestApp::new();
    let credential = json!({"email": "root@x.com", "password": "pw"});
    app.send(Method::POST, "/users", None, Some(credential.clone()))
        .await;
    app.store.set_admin("root@x.com", true).expect("set admin");

    let (_, signed_in) = app
        .send(Method::POST, "/users/sign-in", None, Some(credential))
        .await;
    let token = signed_in["token"].as_str().expect("token").to_string();

    let (status, _) = app
        .send(Method::POST, "/books", Some(&token), Some(book("Mine")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn failed_sign_in_is_generic() {
    let app = TestApp::new();
    app.send(
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "a@x.com", "password": "pw"})),
    )
    .await;

    let (status, wrong_pw) = app
        .send(
            Method::POST,
            "/users/sign-in",
            None,
            Some(json!({"email": "a@x.com", "password": "bad"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = app
        .send(
            Method::POST,
            "/users/sign-in",
            None,
            Some(json!({"email": "ghost@x.com", "password": "pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(unknown, json!({"error": "invalid credentials"}));
}

#[tokio::test]
async fn empty_sign_up_fields_are_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            None,
            Some(json!({"email": "", "password": "pw"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_token_is_invalid_not_a_claims_error() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/books", Some("abcd.abcd.abcd"), Some(book("A")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid token"}));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let resp = app.router().oneshot(req).await.expect("response");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
