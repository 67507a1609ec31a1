//! Shared state injected into every request handler.

use std::sync::Arc;

use crate::application::services::{ShortenerService, ShortenerSettings};
use crate::domain::click_worker::ClickRecorder;
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::ResolutionCache;

/// Cheap-to-clone handle on the service and its backends.
///
/// `repository`, `cache` and `click_recorder` are the same instances the
/// shortener uses; handlers reach them directly only for health reporting.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub repository: Arc<dyn ShortUrlRepository>,
    pub cache: Arc<dyn ResolutionCache>,
    pub click_recorder: ClickRecorder,
    pub base_url: String,
}

impl AppState {
    /// Builds the shortener over the given backends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the settings are out of range.
    pub fn new(
        repository: Arc<dyn ShortUrlRepository>,
        cache: Arc<dyn ResolutionCache>,
        click_recorder: ClickRecorder,
        settings: ShortenerSettings,
        base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let shortener = ShortenerService::new(
            repository.clone(),
            cache.clone(),
            click_recorder.clone(),
            settings,
        )?;

        Ok(Self {
            shortener: Arc::new(shortener),
            repository,
            cache,
            click_recorder,
            base_url: base_url.into(),
        })
    }

    /// Public short URL for a code under the configured base URL.
    pub fn short_url(&self, code: &str) -> String {
        ShortenerService::short_url(&self.base_url, code)
    }
}
