//! Caching layer for redirect lookups.
//!
//! - [`RedisCache`] - Redis-backed cache
//! - [`NullCache`] - no-op fallback

mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
