//! API server configuration.

use std::str::FromStr;

use books_core::auth::jwt::{DEFAULT_TOKEN_VALIDITY_HOURS, resolve_jwt_secret};
use books_core::auth::password::DEFAULT_BCRYPT_COST;
use books_core::cache::{DEFAULT_TIMEOUT_SECS, DEFAULT_TTL_SECS};
use books_core::store::DEFAULT_PAGE_SIZE;
use chrono::TimeDelta;
use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// Books per listing page.
    pub page_size: u32,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub token_validity_hours: i64,
    /// TTL of cached listing pages.
    pub cache_ttl_secs: u64,
    /// Per-command timeout of the remote cache.
    pub cache_timeout_secs: u64,
    /// Deadline for a whole request, cancelling in-flight backend calls.
    pub request_timeout_secs: u64,
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                             |
    /// |------------------------|-------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:8080`                    |
    /// | `PAGE_SIZE`            | `5`                                 |
    /// | `JWT_SECRET`           | generated & persisted to file       |
    /// | `TOKEN_VALIDITY_HOURS` | `24`                                |
    /// | `CACHE_TTL_SECS`       | `3600`                              |
    /// | `CACHE_TIMEOUT_SECS`   | `10`                                |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                |
    /// | `BCRYPT_COST`          | `12`                                |
    ///
    /// Unparseable values fall back to the default. A token validity that is
    /// not a positive number of hours in range is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            page_size: env_or("PAGE_SIZE", DEFAULT_PAGE_SIZE),
            jwt_secret: resolve_jwt_secret(),
            token_validity_hours: env_or("TOKEN_VALIDITY_HOURS", DEFAULT_TOKEN_VALIDITY_HOURS),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", DEFAULT_TTL_SECS),
            cache_timeout_secs: env_or("CACHE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            bcrypt_cost: env_or("BCRYPT_COST", DEFAULT_BCRYPT_COST),
        };
        config.token_validity()?;
        Ok(config)
    }

    /// Token lifetime as a duration.
    pub fn token_validity(&self) -> Result<TimeDelta, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name: "TOKEN_VALIDITY_HOURS",
            reason: format!("{reason}, got {}", self.token_validity_hours),
        };
        if self.token_validity_hours <= 0 {
            return Err(invalid("must be positive"));
        }
        TimeDelta::try_hours(self.token_validity_hours).ok_or_else(|| invalid("out of range"))
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
