//! Cache collaborators.
//!
//! A deliberately small surface: `load` and `save`. Entries expire on their
//! own after the backend's fixed TTL; there is no delete.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCache;
pub use self::redis::RedisCache;

/// Time-to-live applied to every saved entry unless configured otherwise.
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Per-command timeout for remote cache backends unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Cache errors. None of these is ever turned into a silent miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache backend timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Cached value could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Value could not be encoded for the cache: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Reads and writes string values by key.
#[async_trait]
pub trait CacheHelper: Send + Sync {
    /// Store `value` under `key` with the backend's TTL.
    async fn save(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Read the value under `key`. An absent or expired key is `Ok(None)`.
    async fn load(&self, key: &str) -> Result<Option<String>, CacheError>;
}
