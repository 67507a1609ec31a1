//! Short URL creation, resolution and lifecycle service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use serde_json::json;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use super::collision_resolver::{CollisionResolver, DEFAULT_MAX_ATTEMPTS};
use super::invalidation::InvalidationEpochs;
use crate::domain::click_worker::ClickRecorder;
use crate::domain::entities::{CreateShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::ResolutionCache;
use crate::utils::code_generator::{
    CodeGenerator, CodeStrategy, DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, MIN_CODE_LENGTH, is_base62,
    validate_custom_code,
};
use crate::utils::url_validation::validate_target_url;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 255;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(2);
const INVALIDATE_RETRIES: usize = 3;

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    pub code_length: usize,
    pub strategy: CodeStrategy,
    pub max_attempts: u32,
    /// Deadline applied to every individual storage call.
    pub storage_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            strategy: CodeStrategy::Random,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }
}

/// Coordinates code allocation, storage, caching and click accounting.
///
/// One instance is shared by every request task behind an `Arc`. The service
/// holds no lock of its own: uniqueness is enforced by the store and the cache
/// synchronizes internally.
///
/// # Read path
///
/// Resolution reads the cache first and falls back to the store, filling the
/// cache on a miss. A fill is skipped, or evicted again, when a write to the
/// same code overlapped the store read (see [`InvalidationEpochs`]). Clicks are queued on a [`ClickRecorder`] and applied by the
/// background worker, so a redirect never waits on the counter update.
///
/// # Write path
///
/// Updates and deactivations write to the store first and then invalidate the
/// cache entry, so the next resolution observes the new state. Invalidation is
/// retried; if it still fails the write reports
/// [`AppError::StorageUnavailable`]. The store write stands and repeating the
/// call is safe.
pub struct ShortenerService {
    repository: Arc<dyn ShortUrlRepository>,
    cache: Arc<dyn ResolutionCache>,
    clicks: ClickRecorder,
    generator: CodeGenerator,
    resolver: CollisionResolver,
    strategy: CodeStrategy,
    storage_timeout: Duration,
    epochs: InvalidationEpochs,
}

impl ShortenerService {
    /// Creates a new shortening service.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the code length is out of range.
    pub fn new(
        repository: Arc<dyn ShortUrlRepository>,
        cache: Arc<dyn ResolutionCache>,
        clicks: ClickRecorder,
        settings: ShortenerSettings,
    ) -> Result<Self, AppError> {
        Ok(Self {
            repository,
            cache,
            clicks,
            generator: CodeGenerator::new(settings.code_length)?,
            resolver: CollisionResolver::new(settings.max_attempts),
            strategy: settings.strategy,
            storage_timeout: settings.storage_timeout,
            epochs: InvalidationEpochs::new(),
        })
    }

    /// Creates a short URL.
    ///
    /// Validates the request, allocates a code (the caller's alias, or a
    /// generated one through the collision loop), stores the record and warms
    /// the cache with it.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a bad URL, alias, expiry or metadata
    /// - [`AppError::DuplicateCode`] if the custom alias is taken
    /// - [`AppError::CollisionExhausted`] if no free generated code was found
    /// - [`AppError::StorageUnavailable`] / [`AppError::Timeout`] on storage failure
    pub async fn create_short_url(&self, request: CreateShortUrl) -> Result<ShortUrl, AppError> {
        let request = self.validate_create(request)?;

        let record = match request.custom_code.clone() {
            Some(alias) => {
                self.with_deadline(self.repository.create(request.to_new_short_url(alias)))
                    .await?
            }
            None => {
                let request = &request;
                self.resolver
                    .create_with_generated_code(
                        || self.next_candidate(),
                        |code| async move {
                            self.with_deadline(self.repository.exists(&code)).await
                        },
                        |code| async move {
                            self.with_deadline(
                                self.repository.create(request.to_new_short_url(code)),
                            )
                            .await
                        },
                    )
                    .await?
            }
        };

        info!(
            id = record.id,
            code = %record.short_code,
            "Short URL created"
        );

        if let Err(e) = self.cache.put(&record.short_code, &record, None).await {
            warn!(error = %e, code = %record.short_code, "Failed to warm cache after create");
        }

        Ok(record)
    }

    /// Resolves a short code to its target URL and queues a click.
    ///
    /// Checks run in order: unknown code, deactivated, expired. Only a
    /// successful resolution records a click.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record carries the code
    /// - [`AppError::Gone`] if the record was deactivated
    /// - [`AppError::Expired`] if the record's expiry has passed
    /// - [`AppError::StorageUnavailable`] / [`AppError::Timeout`] on a cache miss
    ///   with a failing store
    pub async fn resolve_short_url(&self, code: &str) -> Result<String, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::unknown_code(code));
        }

        let record = self.lookup(code).await?;
        record.ensure_resolvable(Utc::now())?;

        self.clicks.record(code);
        Ok(record.long_url)
    }

    /// Returns the stored record, bypassing the cache.
    ///
    /// Used for details and analytics where `click_count` must be current.
    pub async fn get_short_url(&self, code: &str) -> Result<ShortUrl, AppError> {
        self.with_deadline(self.repository.fetch_by_code(code))
            .await
    }

    /// Applies a partial metadata update and invalidates the cache entry.
    ///
    /// An empty patch returns the stored record without writing.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if title or description are too long
    /// - [`AppError::NotFound`] if no record carries the code
    /// - [`AppError::StorageUnavailable`] if the cache entry could not be evicted
    pub async fn update_short_url(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<ShortUrl, AppError> {
        validate_metadata(
            patch.title.as_ref().and_then(Option::as_deref),
            patch.description.as_ref().and_then(Option::as_deref),
        )?;

        if patch.is_empty() {
            return self.get_short_url(code).await;
        }

        let record = self
            .with_deadline(self.repository.update_metadata(code, patch))
            .await?;

        self.invalidate(code, "update").await?;
        info!(code, "Short URL updated");

        Ok(record)
    }

    /// Deactivates a short URL. Deactivating an inactive record succeeds.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record carries the code
    /// - [`AppError::StorageUnavailable`] if the cache entry could not be evicted
    pub async fn deactivate_short_url(&self, code: &str) -> Result<(), AppError> {
        self.with_deadline(self.repository.deactivate(code)).await?;

        self.invalidate(code, "deactivate").await?;
        info!(code, "Short URL deactivated");

        Ok(())
    }

    /// Builds the public short URL for a code.
    pub fn short_url(base_url: &str, code: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), code)
    }

    async fn lookup(&self, code: &str) -> Result<ShortUrl, AppError> {
        match self.cache.get(code).await {
            Ok(Some(record)) => {
                counter!("shortener_cache_hits_total").increment(1);
                debug!(code, "Cache hit");
                return Ok(record);
            }
            Ok(None) => {
                debug!(code, "Cache miss");
            }
            Err(e) => {
                warn!(error = %e, code, "Cache read failed, falling back to storage");
            }
        }
        counter!("shortener_cache_misses_total").increment(1);

        let epoch = self.epochs.current(code);
        let record = self
            .with_deadline(self.repository.fetch_by_code(code))
            .await?;

        if self.epochs.current(code) != epoch {
            debug!(code, "Skipping cache fill after concurrent write");
            return Ok(record);
        }

        if let Err(e) = self.cache.put(code, &record, None).await {
            warn!(error = %e, code, "Failed to populate cache");
        }

        // A writer may have invalidated between the check and the put.
        if self.epochs.current(code) != epoch
            && let Err(e) = self.cache.invalidate(code).await
        {
            warn!(error = %e, code, "Failed to evict stale cache fill");
        }

        Ok(record)
    }

    async fn next_candidate(&self) -> Result<String, AppError> {
        let seed = match self.strategy {
            CodeStrategy::Random => None,
            CodeStrategy::Sequential => Some(
                self.with_deadline(self.repository.next_code_sequence())
                    .await?,
            ),
        };
        self.generator.generate(self.strategy, seed)
    }

    async fn invalidate(&self, code: &str, operation: &'static str) -> Result<(), AppError> {
        self.epochs.bump(code);

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(200))
            .map(jitter)
            .take(INVALIDATE_RETRIES);

        Retry::spawn(strategy, || self.cache.invalidate(code))
            .await
            .map_err(|e| {
                warn!(error = %e, code, operation, "Failed to invalidate cache");
                AppError::storage_unavailable(format!("cache invalidation failed: {e}"))
            })
    }

    async fn with_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.storage_timeout, operation)
            .await
            .map_err(|_| AppError::Timeout {
                elapsed_ms: u64::try_from(self.storage_timeout.as_millis()).unwrap_or(u64::MAX),
            })?
    }

    fn validate_create(&self, mut request: CreateShortUrl) -> Result<CreateShortUrl, AppError> {
        request.long_url = validate_target_url(&request.long_url).map_err(|e| {
            AppError::bad_request("Invalid URL", json!({ "url": e.to_string() }))
        })?;

        validate_metadata(request.title.as_deref(), request.description.as_deref())?;

        if let Some(expires_at) = request.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        if let Some(alias) = &request.custom_code {
            validate_custom_code(alias)?;
        }

        Ok(request)
    }
}

/// Rejects codes that no allocation path can produce, without a storage call.
fn is_well_formed_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) && is_base62(code)
}

fn validate_metadata(title: Option<&str>, description: Option<&str>) -> Result<(), AppError> {
    if let Some(title) = title
        && title.chars().count() > MAX_TITLE_LENGTH
    {
        return Err(AppError::bad_request(
            format!("Title cannot exceed {MAX_TITLE_LENGTH} characters"),
            json!({ "field": "title", "max": MAX_TITLE_LENGTH }),
        ));
    }

    if let Some(description) = description
        && description.chars().count() > MAX_DESCRIPTION_LENGTH
    {
        return Err(AppError::bad_request(
            format!("Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"),
            json!({ "field": "description", "max": MAX_DESCRIPTION_LENGTH }),
        ));
    }

    Ok(())
}
