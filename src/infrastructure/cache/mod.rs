//! Resolution cache in front of the persistence gateway.
//!
//! Provides a [`ResolutionCache`] trait with three implementations:
//! - [`MokaResolutionCache`] - In-process cache, LRU eviction and per-entry TTL
//! - [`RedisResolutionCache`] - Shared Redis-backed cache
//! - [`NullCache`] - No-op implementation for disabled caching

mod moka_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use moka_cache::MokaResolutionCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisResolutionCache;
pub use service::{CacheError, CacheResult, ResolutionCache, effective_ttl};
