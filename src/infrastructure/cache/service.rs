//! Cache contract for code → URL lookups.

use async_trait::async_trait;

/// Errors raised while setting up a cache backend.
///
/// Lookups and writes never return these: a broken cache degrades to a store
/// read instead of failing the redirect.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache in front of the link store.
///
/// Links are immutable once created, so entries only need a TTL and never an
/// explicit invalidation.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, fail-open
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Cached target URL for `code`. Errors count as a miss.
    async fn get(&self, code: &str) -> Option<String>;

    /// Caches `url` under `code`. `ttl_seconds = None` uses the backend default.
    async fn put(&self, code: &str, url: &str, ttl_seconds: Option<u64>);

    /// Whether the backend answers. Used by `/health`.
    async fn ping(&self) -> bool;
}
