//! No-op cache used when Redis is not configured or unreachable.

use super::service::CacheService;
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing. Every lookup is a miss.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _code: &str) -> Option<String> {
        None
    }

    async fn put(&self, _code: &str, _url: &str, _ttl_seconds: Option<u64>) {}

    async fn ping(&self) -> bool {
        true
    }
}
