//! In-process implementation of the short URL repository.
//!
//! Selected with `STORAGE_BACKEND=memory`. Data lives as long as the process.
//! Each operation runs under the lock of the `DashMap` shard owning the code,
//! which gives the same per-record atomicity as the SQL statements of
//! [`super::PgShortUrlRepository`].

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

#[derive(Debug, Default)]
pub struct MemoryShortUrlRepository {
    records: DashMap<String, ShortUrl>,
    next_id: AtomicI64,
    code_sequence: AtomicU64,
}

impl MemoryShortUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, active or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ShortUrlRepository for MemoryShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        match self.records.entry(new_short_url.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateCode {
                code: new_short_url.short_code,
            }),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let record = ShortUrl {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    short_code: new_short_url.short_code,
                    long_url: new_short_url.long_url,
                    title: new_short_url.title,
                    description: new_short_url.description,
                    click_count: 0,
                    is_active: true,
                    expires_at: new_short_url.expires_at,
                    created_at: now,
                    updated_at: now,
                    last_accessed_at: None,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn fetch_by_code(&self, code: &str) -> Result<ShortUrl, AppError> {
        self.records
            .get(code)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::unknown_code(code))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.records.contains_key(code))
    }

    async fn increment_click_and_touch(
        &self,
        code: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(code)
            .ok_or_else(|| AppError::unknown_code(code))?;

        record.click_count += 1;
        record.last_accessed_at = record.last_accessed_at.max(Some(accessed_at));
        Ok(())
    }

    async fn update_metadata(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<ShortUrl, AppError> {
        let mut record = self
            .records
            .get_mut(code)
            .ok_or_else(|| AppError::unknown_code(code))?;

        patch.apply_to(record.value_mut(), Utc::now());
        Ok(record.value().clone())
    }

    async fn deactivate(&self, code: &str) -> Result<(), AppError> {
        let mut record = self
            .records
            .get_mut(code)
            .ok_or_else(|| AppError::unknown_code(code))?;

        record.is_active = false;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn next_code_sequence(&self) -> Result<u64, AppError> {
        Ok(self.code_sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_url(code: &str) -> NewShortUrl {
        NewShortUrl {
            short_code: code.to_string(),
            long_url: "https://example.com".to_string(),
            title: None,
            description: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = MemoryShortUrlRepository::new();
        let a = repo.create(new_url("aaaaa")).await.unwrap();
        let b = repo.create(new_url("bbbbb")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.click_count, 0);
        assert!(a.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_even_when_inactive() {
        let repo = MemoryShortUrlRepository::new();
        repo.create(new_url("taken")).await.unwrap();
        repo.deactivate("taken").await.unwrap();

        let err = repo.create(new_url("taken")).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateCode { code } if code == "taken"));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_errors() {
        let repo = MemoryShortUrlRepository::new();

        assert!(matches!(
            repo.fetch_by_code("nope1").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.increment_click_and_touch("nope1", Utc::now()).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.deactivate("nope1").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update_metadata("nope1", ShortUrlPatch::default()).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(!repo.exists("nope1").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = Arc::new(MemoryShortUrlRepository::new());
        repo.create(new_url("hot01")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..200 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.increment_click_and_touch("hot01", Utc::now()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = repo.fetch_by_code("hot01").await.unwrap();
        assert_eq!(record.click_count, 200);
        assert!(record.last_accessed_at.is_some());
    }

    #[tokio::test]
    async fn test_last_access_keeps_latest_resolution() {
        let repo = MemoryShortUrlRepository::new();
        repo.create(new_url("late1")).await.unwrap();

        let newer = Utc::now();
        let older = newer - chrono::Duration::seconds(30);
        repo.increment_click_and_touch("late1", newer).await.unwrap();
        repo.increment_click_and_touch("late1", older).await.unwrap();

        let record = repo.fetch_by_code("late1").await.unwrap();
        assert_eq!(record.click_count, 2);
        assert_eq!(record.last_accessed_at, Some(newer));
    }

    #[tokio::test]
    async fn test_sequence_is_strictly_increasing() {
        let repo = MemoryShortUrlRepository::new();
        let a = repo.next_code_sequence().await.unwrap();
        let b = repo.next_code_sequence().await.unwrap();
        assert!(b > a);
    }
}
