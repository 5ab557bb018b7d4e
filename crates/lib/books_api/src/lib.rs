//! # books_api
//!
//! HTTP API library for the books catalog.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use books_core::auth::{TokenKeeper, UserOperator};
use books_core::cache::CacheHelper;
use books_core::catalog::{BookOperator, ReviewOperator};
use books_core::models::UserPermission;
use books_core::store::{BookStore, MemoryStore, ReviewStore, UserStore};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, ConfigError};
use crate::handlers::{books, health, reviews, users};
use crate::middleware::auth::{PermissionGate, require_permission};

/// Storage and cache collaborators the operators are built from.
#[derive(Clone)]
pub struct Backends {
    pub books: Arc<dyn BookStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub users: Arc<dyn UserStore>,
    pub cache: Arc<dyn CacheHelper>,
}

impl Backends {
    /// One [`MemoryStore`] behind all three stores, with the given cache.
    pub fn in_memory(store: Arc<MemoryStore>, cache: Arc<dyn CacheHelper>) -> Self {
        Self {
            books: store.clone(),
            reviews: store.clone(),
            users: store,
            cache,
        }
    }
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub books: BookOperator,
    pub reviews: ReviewOperator,
    pub users: UserOperator,
    /// Token authority shared by the gates and sign-in.
    pub keeper: Arc<TokenKeeper>,
    pub config: ApiConfig,
}

impl AppState {
    /// Build the operators. Fails only on a token validity out of range.
    pub fn new(config: ApiConfig, backends: Backends) -> Result<Self, ConfigError> {
        let keeper = Arc::new(TokenKeeper::new(
            config.jwt_secret.as_bytes(),
            config.token_validity()?,
        ));
        Ok(Self {
            books: BookOperator::new(backends.books, backends.cache),
            reviews: ReviewOperator::new(backends.reviews),
            users: UserOperator::new(backends.users, keeper.clone(), config.bcrypt_cost),
            keeper,
            config,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `books_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    books_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Reads, sign-up and sign-in are public. Book writes need `author`, review
/// writes need `user`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/", get(health::health))
        .route("/books", get(books::list_books))
        .route("/books/{id}", get(books::get_book))
        .route("/books/{id}/reviews", get(reviews::list_reviews_of_book))
        .route("/reviews/{id}", get(reviews::get_review))
        .route("/users", post(users::sign_up))
        .route("/users/sign-in", post(users::sign_in));

    let authors = Router::new()
        .route("/books", post(books::create_book))
        .route(
            "/books/{id}",
            put(books::update_book).delete(books::delete_book),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            PermissionGate::new(state.keeper.clone(), UserPermission::Author),
            require_permission,
        ));

    let reviewers = Router::new()
        .route("/reviews", post(reviews::create_review))
        .route(
            "/reviews/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            PermissionGate::new(state.keeper.clone(), UserPermission::User),
            require_permission,
        ));

    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(public)
        .merge(authors)
        .merge(reviewers)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
