//! Books catalog API server binary.

use std::sync::Arc;
use std::time::Duration;

use books_api::config::ApiConfig;
use books_api::{AppState, Backends};
use books_core::cache::{CacheHelper, MemoryCache, RedisCache};
use books_core::store::{MemoryStore, PgDocumentStore, PgStore};
use clap::{Parser, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    /// Books and users in tables, reviews as JSONB documents.
    Postgres,
    /// Everything in process memory; lost on exit.
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CacheKind {
    Redis,
    Memory,
}

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "books_api_server", about = "Books catalog API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,

    #[arg(long, env = "STORAGE", value_enum, default_value_t = StorageKind::Postgres)]
    storage: StorageKind,

    #[arg(long, env = "CACHE", value_enum, default_value_t = CacheKind::Redis)]
    cache: CacheKind,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/books"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,books_api=debug,books_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig {
        bind_addr: args.bind_addr.clone(),
        ..ApiConfig::from_env()?
    };

    info!(
        storage = ?args.storage,
        cache = ?args.cache,
        bind_addr = %config.bind_addr,
        "starting books_api_server"
    );

    let cache: Arc<dyn CacheHelper> = match args.cache {
        CacheKind::Redis => {
            let redis = RedisCache::connect(
                &args.redis_url,
                Duration::from_secs(config.cache_ttl_secs),
                Duration::from_secs(config.cache_timeout_secs),
            )?;
            if let Err(e) = redis.ping().await {
                warn!(redis_url = %args.redis_url, error = %e, "redis not reachable yet");
            }
            Arc::new(redis)
        }
        CacheKind::Memory => Arc::new(MemoryCache::new(Duration::from_secs(config.cache_ttl_secs))),
    };

    let backends = match args.storage {
        StorageKind::Postgres => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&args.database_url)
                .await?;

            info!("running database migrations");
            books_api::migrate(&pool).await?;

            let relational = Arc::new(PgStore::new(pool.clone(), config.page_size));
            Backends {
                books: relational.clone(),
                reviews: Arc::new(PgDocumentStore::new(pool)),
                users: relational,
                cache,
            }
        }
        StorageKind::Memory => {
            Backends::in_memory(Arc::new(MemoryStore::new(config.page_size)), cache)
        }
    };

    let state = AppState::new(config.clone(), backends)?;
    let app = books_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for shutdown signal");
                return;
            }
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("server stopped");
    Ok(())
}
