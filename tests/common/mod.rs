#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use url_shortener::application::services::ShortenerSettings;
use url_shortener::domain::click_worker::{ClickRecorder, run_click_worker};
use url_shortener::domain::entities::ShortUrl;
use url_shortener::domain::repositories::ShortUrlRepository;
use url_shortener::infrastructure::cache::{MokaResolutionCache, ResolutionCache};
use url_shortener::infrastructure::persistence::MemoryShortUrlRepository;
use url_shortener::routes::unlimited_router;
use url_shortener::state::AppState;

pub const BASE_URL: &str = "http://sho.rt";

/// In-memory state with a Moka cache and a running click worker.
pub fn create_test_state() -> AppState {
    create_test_state_with(ShortenerSettings::default())
}

pub fn create_test_state_with(settings: ShortenerSettings) -> AppState {
    build_state(Arc::new(MemoryShortUrlRepository::new()), settings)
}

/// Test state over a caller-supplied repository.
pub fn create_test_state_over(repository: Arc<dyn ShortUrlRepository>) -> AppState {
    build_state(repository, ShortenerSettings::default())
}

fn build_state(repository: Arc<dyn ShortUrlRepository>, settings: ShortenerSettings) -> AppState {
    let cache: Arc<dyn ResolutionCache> =
        Arc::new(MokaResolutionCache::new(1_000, Duration::from_secs(60)));
    let (click_recorder, click_rx) = ClickRecorder::channel(1_000);

    tokio::spawn(run_click_worker(click_rx, repository.clone(), 4));

    AppState::new(repository, cache, click_recorder, settings, BASE_URL).unwrap()
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(unlimited_router(state)).unwrap()
}

pub async fn create_short_url(state: &AppState, long_url: &str) -> ShortUrl {
    state
        .shortener
        .create_short_url(url_shortener::domain::entities::CreateShortUrl::new(long_url))
        .await
        .unwrap()
}

/// Polls storage until the click count reaches `expected` or two seconds pass.
pub async fn wait_for_clicks(state: &AppState, code: &str, expected: i64) -> i64 {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let count = state.shortener.get_short_url(code).await.unwrap().click_count;
        if count >= expected || tokio::time::Instant::now() >= deadline {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
