//! Handlers for reading and managing existing short URLs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::update_url::UpdateUrlRequest;
use crate::api::dto::url_details::{UrlAnalyticsResponse, UrlDetailsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored record for a short code.
///
/// # Endpoint
///
/// `GET /api/urls/{code}`
///
/// Reads storage directly, so `click_count` reflects every recorded click.
/// Deactivated and expired records are returned as well.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn get_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlDetailsResponse>, AppError> {
    let record = state.shortener.get_short_url(&code).await?;
    let short_url = state.short_url(&record.short_code);

    Ok(Json(UrlDetailsResponse::new(record, short_url)))
}

/// Returns click analytics for a short code.
///
/// # Endpoint
///
/// `GET /api/urls/{code}/analytics`
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aZ3kT9q",
///   "click_count": 42,
///   "created_at": "2025-01-01T00:00:00Z",
///   "last_accessed": "2025-01-02T10:30:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn url_analytics_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlAnalyticsResponse>, AppError> {
    let record = state.shortener.get_short_url(&code).await?;

    Ok(Json(record.into()))
}

/// Partially updates a short URL's metadata.
///
/// # Endpoint
///
/// `PATCH /api/urls/{code}`
///
/// The target URL and click count cannot be changed. The cache entry for the
/// code is invalidated so the next redirect sees the new state.
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 404 Not Found if the short code doesn't exist
pub async fn update_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUrlRequest>,
) -> Result<Json<UrlDetailsResponse>, AppError> {
    payload.validate()?;

    let record = state
        .shortener
        .update_short_url(&code, payload.into())
        .await?;
    let short_url = state.short_url(&record.short_code);

    Ok(Json(UrlDetailsResponse::new(record, short_url)))
}

/// Deactivates a short URL.
///
/// # Endpoint
///
/// `DELETE /api/urls/{code}`
///
/// The record is kept and its code is never reused. Redirects return
/// 410 Gone from then on. Deactivating twice succeeds.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn deactivate_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.shortener.deactivate_short_url(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}
