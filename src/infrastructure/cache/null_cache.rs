//! No-op cache for disabled caching.

use std::time::Duration;

use super::service::{CacheResult, ResolutionCache};
use crate::domain::entities::ShortUrl;
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing. Every lookup is a miss.
///
/// Used when `CACHE_ENABLED=false`, when Redis is configured but unreachable at
/// startup, and by tools that must always read the store.
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
impl ResolutionCache for NullCache {
    async fn get(&self, _code: &str) -> CacheResult<Option<ShortUrl>> {
        Ok(None)
    }

    async fn put(
        &self,
        _code: &str,
        _record: &ShortUrl,
        _ttl: Option<Duration>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
