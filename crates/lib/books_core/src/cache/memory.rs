//! In-memory cache with TTL-based expiration.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{CacheError, CacheHelper, DEFAULT_TTL_SECS};

/// A cached value with its expiry.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local [`CacheHelper`]. Expired entries read as absent and are
/// dropped lazily on the next load.
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

#[async_trait]
impl CacheHelper for MemoryCache {
    async fn save(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| CacheError::Backend(format!("ttl out of range: {e}")))?;
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(key)
            && now < entry.expires_at
        {
            return Ok(Some(entry.value.clone()));
        }
        self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_returns_none_for_missing_key() {
        let cache = MemoryCache::default();
        assert_eq!(cache.load("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let cache = MemoryCache::default();
        cache.save("k1", "val1").await.unwrap();
        assert_eq!(cache.load("k1").await.unwrap().as_deref(), Some("val1"));
    }

    #[tokio::test]
    async fn save_overwrites_previous_value() {
        let cache = MemoryCache::default();
        cache.save("k1", "old").await.unwrap();
        cache.save("k1", "new").await.unwrap();
        assert_eq!(cache.load("k1").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent_and_is_dropped() {
        // Zero TTL expires immediately.
        let cache = MemoryCache::new(Duration::ZERO);
        cache.save("k1", "val1").await.unwrap();
        assert_eq!(cache.load("k1").await.unwrap(), None);
        assert!(cache.is_empty());
    }
}
