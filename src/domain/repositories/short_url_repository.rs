//! Persistence gateway for short URL records.

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable store of [`ShortUrl`] records.
///
/// Every operation is atomic at the storage layer. The store is the final
/// authority on short code uniqueness and the only authority on click counts.
/// Implementations hold no caching logic.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryShortUrlRepository`] - in-process
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the short code already exists,
    /// whether the existing record is active or not.
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Fetches a record by short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record carries the code.
    async fn fetch_by_code(&self, code: &str) -> Result<ShortUrl, AppError>;

    /// Returns true if any record, active or not, carries the code.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Increments the click counter and advances `last_accessed_at` to
    /// `accessed_at` in a single atomic storage operation.
    ///
    /// `last_accessed_at` never moves backwards, so clicks applied out of
    /// order keep the latest resolution time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record carries the code.
    async fn increment_click_and_touch(
        &self,
        code: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Applies a partial update to the mutable fields and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record carries the code.
    async fn update_metadata(&self, code: &str, patch: ShortUrlPatch)
    -> Result<ShortUrl, AppError>;

    /// Marks the record inactive. Deactivating an inactive record succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record carries the code.
    async fn deactivate(&self, code: &str) -> Result<(), AppError>;

    /// Returns the next value of the strictly increasing sequence used to seed
    /// sequentially encoded codes.
    async fn next_code_sequence(&self) -> Result<u64, AppError>;

    /// Checks connectivity with the underlying store.
    async fn health_check(&self) -> bool;
}
