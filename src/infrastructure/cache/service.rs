//! Resolution cache trait and error types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::entities::ShortUrl;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of resolved records keyed by short code.
///
/// Implementations must be safe for concurrent `get`/`put`/`invalidate` from
/// many tasks; `put` replaces an entry atomically. Cached click counts may lag
/// the store and must not be served as authoritative.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MokaResolutionCache`] - in-process, LRU + TTL
/// - [`crate::infrastructure::cache::RedisResolutionCache`] - shared Redis cache
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[async_trait]
pub trait ResolutionCache: Send + Sync {
    /// Returns the cached record for a code.
    ///
    /// Backend failures are logged and reported as a miss.
    async fn get(&self, code: &str) -> CacheResult<Option<ShortUrl>>;

    /// Inserts or replaces the record for a code.
    ///
    /// `ttl = None` uses the backend's default time-to-live. Either way the TTL
    /// is clamped to the record's remaining lifetime (see [`effective_ttl`]).
    async fn put(&self, code: &str, record: &ShortUrl, ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes the entry for a code, if any.
    async fn invalidate(&self, code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reports and logs.
    fn backend(&self) -> &'static str;
}

/// Computes how long a record may stay cached.
///
/// A record that expires in the future is never cached past its expiry. Records
/// that have already expired keep the requested TTL: they resolve to an
/// expiration error either way and are invalidated when their expiry is edited.
pub fn effective_ttl(record: &ShortUrl, requested: Duration) -> Duration {
    match record.expires_at {
        Some(expires_at) => {
            let remaining = expires_at - Utc::now();
            match remaining.to_std() {
                Ok(remaining) if !remaining.is_zero() => requested.min(remaining),
                _ => requested,
            }
        }
        None => requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn record(expires_in: Option<ChronoDuration>) -> ShortUrl {
        let now = Utc::now();
        ShortUrl {
            id: 1,
            short_code: "abc1234".to_string(),
            long_url: "https://example.com".to_string(),
            title: None,
            description: None,
            click_count: 0,
            is_active: true,
            expires_at: expires_in.map(|d| now + d),
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
        }
    }

    #[test]
    fn test_ttl_without_expiry_is_unchanged() {
        let ttl = Duration::from_secs(300);
        assert_eq!(effective_ttl(&record(None), ttl), ttl);
    }

    #[test]
    fn test_ttl_clamped_to_remaining_lifetime() {
        let ttl = effective_ttl(
            &record(Some(ChronoDuration::seconds(10))),
            Duration::from_secs(300),
        );
        assert!(ttl <= Duration::from_secs(10));
        assert!(ttl > Duration::from_secs(5));
    }

    #[test]
    fn test_ttl_for_expired_record() {
        let ttl = Duration::from_secs(60);
        assert_eq!(
            effective_ttl(&record(Some(ChronoDuration::seconds(-10))), ttl),
            ttl
        );
    }
}
