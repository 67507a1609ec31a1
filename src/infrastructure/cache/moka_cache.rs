//! In-process resolution cache backed by `moka`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::{EvictionPolicy, Expiry};
use tracing::debug;

use super::service::{CacheResult, ResolutionCache, effective_ttl};
use crate::domain::entities::ShortUrl;

#[derive(Clone)]
struct CachedEntry {
    record: Arc<ShortUrl>,
    ttl: Duration,
}

/// Per-entry expiry: each entry carries the TTL it was inserted with, and a
/// replacement restarts the clock.
struct EntryExpiry;

impl Expiry<String, CachedEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Capacity- and TTL-bounded cache with least-recently-used eviction.
pub struct MokaResolutionCache {
    inner: Cache<String, CachedEntry>,
    default_ttl: Duration,
}

impl MokaResolutionCache {
    /// Creates a cache holding at most `max_entries` records.
    pub fn new(max_entries: u64, default_ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MokaResolutionCache initialized with max entries: {}, default TTL: {}s",
            max_entries,
            default_ttl.as_secs()
        );

        Self { inner, default_ttl }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flushes pending evictions so that [`Self::entry_count`] is current.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl ResolutionCache for MokaResolutionCache {
    async fn get(&self, code: &str) -> CacheResult<Option<ShortUrl>> {
        match self.inner.get(code).await {
            Some(entry) => {
                debug!("Cache HIT: {}", code);
                Ok(Some(entry.record.as_ref().clone()))
            }
            None => {
                debug!("Cache MISS: {}", code);
                Ok(None)
            }
        }
    }

    async fn put(&self, code: &str, record: &ShortUrl, ttl: Option<Duration>) -> CacheResult<()> {
        let ttl = effective_ttl(record, ttl.unwrap_or(self.default_ttl));
        let entry = CachedEntry {
            record: Arc::new(record.clone()),
            ttl,
        };

        self.inner.insert(code.to_string(), entry).await;
        debug!("Cache SET: {} (TTL: {}ms)", code, ttl.as_millis());
        Ok(())
    }

    async fn invalidate(&self, code: &str) -> CacheResult<()> {
        self.inner.invalidate(code).await;
        debug!("Cache INVALIDATE: {}", code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(code: &str, title: &str) -> ShortUrl {
        let now = Utc::now();
        ShortUrl {
            id: 1,
            short_code: code.to_string(),
            long_url: format!("https://example.com/{code}"),
            title: Some(title.to_string()),
            description: None,
            click_count: 0,
            is_active: true,
            expires_at: None,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MokaResolutionCache::new(100, Duration::from_secs(60));
        let r = record("abc1234", "first");

        cache.put("abc1234", &r, None).await.unwrap();

        assert_eq!(cache.get("abc1234").await.unwrap(), Some(r));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let cache = MokaResolutionCache::new(100, Duration::from_secs(60));
        cache
            .put("abc1234", &record("abc1234", "first"), None)
            .await
            .unwrap();
        cache
            .put("abc1234", &record("abc1234", "second"), None)
            .await
            .unwrap();

        let cached = cache.get("abc1234").await.unwrap().unwrap();
        assert_eq!(cached.title.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MokaResolutionCache::new(100, Duration::from_secs(60));
        cache
            .put("abc1234", &record("abc1234", "t"), None)
            .await
            .unwrap();

        cache.invalidate("abc1234").await.unwrap();

        assert!(cache.get("abc1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = MokaResolutionCache::new(100, Duration::from_secs(60));
        cache
            .put(
                "short01",
                &record("short01", "t"),
                Some(Duration::from_millis(50)),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(cache.get("short01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = MokaResolutionCache::new(2, Duration::from_secs(60));
        for i in 0..10 {
            let code = format!("code{i:03}");
            cache.put(&code, &record(&code, "t"), None).await.unwrap();
        }

        cache.run_pending_tasks().await;

        assert!(cache.entry_count() <= 2);
    }
}
