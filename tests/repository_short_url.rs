use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use url_shortener::domain::entities::{NewShortUrl, ShortUrlPatch};
use url_shortener::domain::repositories::ShortUrlRepository;
use url_shortener::error::AppError;
use url_shortener::infrastructure::persistence::PgShortUrlRepository;

fn new_short_url(code: &str, url: &str) -> NewShortUrl {
    NewShortUrl {
        short_code: code.to_string(),
        long_url: url.to_string(),
        title: None,
        description: None,
        expires_at: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_fetch(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let created = repo
        .create(NewShortUrl {
            title: Some("Example".to_string()),
            ..new_short_url("abc1234", "https://example.com")
        })
        .await
        .unwrap();

    assert_eq!(created.short_code, "abc1234");
    assert_eq!(created.click_count, 0);
    assert!(created.is_active);

    let fetched = repo.fetch_by_code("abc1234").await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.long_url, "https://example.com");
    assert_eq!(fetched.title.as_deref(), Some("Example"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_code_rejected(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    repo.create(new_short_url("dup1234", "https://a.example.com"))
        .await
        .unwrap();
    let err = repo
        .create(new_short_url("dup1234", "https://b.example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateCode { .. }));
    assert_eq!(
        repo.fetch_by_code("dup1234").await.unwrap().long_url,
        "https://a.example.com"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_code(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    assert!(!repo.exists("missing").await.unwrap());
    assert!(matches!(
        repo.fetch_by_code("missing").await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.increment_click_and_touch("missing", Utc::now()).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.deactivate("missing").await,
        Err(AppError::NotFound { .. })
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let repo = Arc::new(PgShortUrlRepository::new(Arc::new(pool)));
    repo.create(new_short_url("clk1234", "https://example.com"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.increment_click_and_touch("clk1234", Utc::now()).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = repo.fetch_by_code("clk1234").await.unwrap();
    assert_eq!(record.click_count, 20);
    assert!(record.last_accessed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_last_access_never_moves_backwards(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(new_short_url("ts01234", "https://example.com"))
        .await
        .unwrap();

    let newer = Utc::now();
    repo.increment_click_and_touch("ts01234", newer).await.unwrap();
    repo.increment_click_and_touch("ts01234", newer - Duration::minutes(5))
        .await
        .unwrap();

    let record = repo.fetch_by_code("ts01234").await.unwrap();
    assert_eq!(record.click_count, 2);
    let stored = record.last_accessed_at.unwrap();
    assert!((stored - newer).num_milliseconds().abs() < 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_metadata_sets_and_clears(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(NewShortUrl {
        title: Some("Old".to_string()),
        description: Some("Keep".to_string()),
        ..new_short_url("upd1234", "https://example.com")
    })
    .await
    .unwrap();

    let updated = repo
        .update_metadata(
            "upd1234",
            ShortUrlPatch {
                title: Some(None),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, None);
    assert_eq!(updated.description.as_deref(), Some("Keep"));
    assert!(!updated.is_active);
    assert_eq!(updated.long_url, "https://example.com");
    assert!(updated.updated_at >= updated.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_is_idempotent(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));
    repo.create(new_short_url("off1234", "https://example.com"))
        .await
        .unwrap();

    repo.deactivate("off1234").await.unwrap();
    repo.deactivate("off1234").await.unwrap();

    assert!(!repo.fetch_by_code("off1234").await.unwrap().is_active);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_code_sequence_increases(pool: PgPool) {
    let repo = PgShortUrlRepository::new(Arc::new(pool));

    let first = repo.next_code_sequence().await.unwrap();
    let second = repo.next_code_sequence().await.unwrap();

    assert!(second > first);
    assert!(repo.health_check().await);
}
