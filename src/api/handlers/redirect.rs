//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the resolution cache
/// 2. On cache miss, fetch from storage and populate the cache
/// 3. Reject deactivated and expired records
/// 4. Queue a click event for the background worker
/// 5. Return 307 Temporary Redirect
///
/// # Click Tracking
///
/// Click events go to a bounded channel. When it is full the event waits in
/// a bounded overflow stage, so the redirect is never delayed by click
/// accounting.
///
/// # Errors
///
/// - 404 Not Found if the short code doesn't exist
/// - 410 Gone if the short URL was deactivated or has expired
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.shortener.resolve_short_url(&code).await?;

    let location = HeaderValue::try_from(long_url).map_err(|_| {
        AppError::internal(
            "Stored target URL is not a valid Location header",
            json!({ "short_code": code }),
        )
    })?;

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]))
}
