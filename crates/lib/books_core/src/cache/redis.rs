//! Redis-backed cache.

use std::future::Future;
use std::time::Duration;

use ::redis::AsyncCommands;
use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use tracing::debug;

use super::{CacheError, CacheHelper};

/// [`CacheHelper`] over a pooled Redis connection. Every command is bounded by
/// `timeout`; every write carries `EX ttl`.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
    ttl: Duration,
    timeout: Duration,
}

impl RedisCache {
    /// Build the pool. No connection is opened until the first command.
    pub fn connect(url: &str, ttl: Duration, timeout: Duration) -> Result<Self, CacheError> {
        let mut redis_config = Config::from_url(url);
        let mut pool_config = PoolConfig::default();
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::Backend(format!("redis pool: {e}")))?;
        Ok(Self { pool, ttl, timeout })
    }

    /// Round-trip a `PING` to verify the backend is reachable.
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let _pong: String = ::redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(format!("redis PING: {e}")))?;
            Ok(())
        })
        .await
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(format!("redis connection: {e}")))
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))?
    }

    /// Redis rejects `EX 0`; sub-second TTLs round up to one second.
    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl CacheHelper for RedisCache {
    async fn save(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let ttl_secs = self.ttl_secs();
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                .await
                .map_err(|e| CacheError::Backend(format!("redis SET: {e}")))
        })
        .await?;
        debug!(key, ttl_secs, "cache set");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.get::<_, Option<String>>(key)
                .await
                .map_err(|e| CacheError::Backend(format!("redis GET: {e}")))
        })
        .await
    }
}
