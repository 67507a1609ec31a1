mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_get_url_details() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state);

    let response = server.get(&format!("/api/urls/{}", record.short_code)).await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_code"], record.short_code.as_str());
    assert_eq!(json["long_url"], "https://example.com");
    assert_eq!(json["click_count"], 0);
    assert_eq!(json["is_active"], true);
}

#[tokio::test]
async fn test_get_unknown_url_not_found() {
    let server = common::create_test_server(common::create_test_state());

    server
        .get("/api/urls/nothere")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_reflects_redirects() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state.clone());

    for _ in 0..2 {
        server.get(&format!("/{}", record.short_code)).await;
    }
    common::wait_for_clicks(&state, &record.short_code, 2).await;

    let response = server
        .get(&format!("/api/urls/{}/analytics", record.short_code))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["click_count"], 2);
    assert!(json["last_accessed"].is_string());
}

#[tokio::test]
async fn test_patch_updates_and_clears_metadata() {
    let state = common::create_test_state();
    let record = state
        .shortener
        .create_short_url(
            url_shortener::domain::entities::CreateShortUrl::new("https://example.com")
                .with_title("Old title"),
        )
        .await
        .unwrap();
    let server = common::create_test_server(state);
    let path = format!("/api/urls/{}", record.short_code);

    let response = server
        .patch(&path)
        .json(&json!({ "description": "New description" }))
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["title"], "Old title");
    assert_eq!(json["description"], "New description");
    assert_eq!(json["long_url"], "https://example.com");

    let response = server.patch(&path).json(&json!({ "title": null })).await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert!(json.get("title").is_none());
    assert_eq!(json["description"], "New description");
}

#[tokio::test]
async fn test_patch_rejects_long_title() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state);

    let response = server
        .patch(&format!("/api/urls/{}", record.short_code))
        .json(&json!({ "title": "x".repeat(256) }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_unknown_code_not_found() {
    let server = common::create_test_server(common::create_test_state());

    server
        .patch("/api/urls/nothere")
        .json(&json!({ "title": "t" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_deactivates_and_is_idempotent() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state);
    let path = format!("/api/urls/{}", record.short_code);

    server
        .get(&format!("/{}", record.short_code))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    server
        .delete(&path)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&path)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/{}", record.short_code))
        .await
        .assert_status(StatusCode::GONE);

    let json = server.get(&path).await.json::<serde_json::Value>();
    assert_eq!(json["is_active"], false);
}

#[tokio::test]
async fn test_patch_reactivates() {
    let state = common::create_test_state();
    let record = common::create_short_url(&state, "https://example.com").await;
    let server = common::create_test_server(state);
    let path = format!("/api/urls/{}", record.short_code);

    server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
    server
        .patch(&path)
        .json(&json!({ "is_active": true }))
        .await
        .assert_status_ok();

    server
        .get(&format!("/{}", record.short_code))
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_delete_unknown_code_not_found() {
    let server = common::create_test_server(common::create_test_state());

    server
        .delete("/api/urls/nothere")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
