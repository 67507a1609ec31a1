mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use url_shortener::domain::entities::{CreateShortUrl, ShortUrlPatch};

#[tokio::test]
async fn test_redirect_success() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com/landing?x=1").await;
    let server = common::create_test_server(state.clone());

    let response = server.get(&format!("/{}", record.short_code)).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://example.com/landing?x=1"
    );
}

#[tokio::test]
async fn test_redirect_non_ascii_target_is_percent_encoded() {
    let state = common::create_test_state();
    let server = common::create_test_server(state);

    let created = server
        .post("/api/shorten")
        .json(&serde_json::json!({ "url": "https://example.com/päth" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let code = created.json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://example.com/p%C3%A4th"
    );
}

#[tokio::test]
async fn test_redirect_records_click() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state.clone());

    for _ in 0..3 {
        server
            .get(&format!("/{}", record.short_code))
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }

    assert_eq!(common::wait_for_clicks(&state, &record.short_code, 3).await, 3);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let server = common::create_test_server(common::create_test_state());

    let response = server.get("/zzzzzzz").await;

    response.assert_status(StatusCode::NOT_FOUND);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_malformed_code_not_found() {
    let server = common::create_test_server(common::create_test_state());

    server.get("/ab").await.assert_status(StatusCode::NOT_FOUND);
    server
        .get("/bad_code!")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_deactivated_is_gone_without_click() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state.clone());

    // warm the cache so deactivation has to invalidate it
    server
        .get(&format!("/{}", record.short_code))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::wait_for_clicks(&state, &record.short_code, 1).await, 1);

    state
        .shortener
        .deactivate_short_url(&record.short_code)
        .await
        .unwrap();

    let response = server.get(&format!("/{}", record.short_code)).await;

    response.assert_status(StatusCode::GONE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "gone");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let stored = state
        .shortener
        .get_short_url(&record.short_code)
        .await
        .unwrap();
    assert_eq!(stored.click_count, 1);
}

#[tokio::test]
async fn test_redirect_expired_is_gone() {
    let state = common::create_test_state();
    let record = state
        .shortener
        .create_short_url(
            CreateShortUrl::new("https://example.com")
                .with_expires_at(Utc::now() + Duration::hours(1)),
        )
        .await
        .unwrap();

    // move the expiry into the past through the store
    state
        .repository
        .update_metadata(
            &record.short_code,
            ShortUrlPatch {
                expires_at: Some(Some(Utc::now() - Duration::seconds(1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    state.cache.invalidate(&record.short_code).await.unwrap();

    let server = common::create_test_server(state);
    let response = server.get(&format!("/{}", record.short_code)).await;

    response.assert_status(StatusCode::GONE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "expired");
}
