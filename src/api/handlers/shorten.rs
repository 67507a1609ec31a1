//! Handlers for the shortening endpoints.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{
    BatchResultItem, BatchShortenRequest, BatchShortenResponse, BatchSummary, ShortenRequest,
    ShortenResponse,
};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/a/b",
///   "title": "Example",                    // optional
///   "description": "Landing page",         // optional
///   "expires_at": "2030-01-01T00:00:00Z",  // optional
///   "custom_code": "promo2025"             // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 1,
///   "short_code": "aZ3kT9q",
///   "short_url": "http://localhost:8080/aZ3kT9q",
///   "long_url": "https://example.com/a/b",
///   "title": "Example",
///   "created_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if validation fails
/// - 409 Conflict if the custom code is taken
/// - 503 Service Unavailable if no free code could be allocated
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let record = state.shortener.create_short_url(payload.into()).await?;
    let short_url = state.short_url(&record.short_code);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(record, short_url)),
    ))
}

/// Creates short URLs for up to 100 long URLs.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Batch Processing
///
/// Processes URLs independently. If one fails, others continue processing.
/// Each result includes either success data or error information.
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 2, "successful": 1, "failed": 1 },
///   "items": [
///     {
///       "long_url": "https://example.com",
///       "short_code": "aZ3kT9q",
///       "short_url": "http://localhost:8080/aZ3kT9q"
///     },
///     {
///       "long_url": "ftp://example.com",
///       "error": { "code": "validation_error", "message": "Invalid URL", "details": {} }
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the batch itself is empty or too large.
/// Individual URL errors are returned in the response items array.
pub async fn batch_shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<BatchShortenRequest>,
) -> Result<Json<BatchShortenResponse>, AppError> {
    payload.validate()?;

    let total = payload.urls.len();
    let mut items = Vec::with_capacity(total);
    let mut successful = 0;

    for item in payload.urls {
        let long_url = item.url.clone();

        match process_single_url(&state, item).await {
            Ok((short_code, short_url)) => {
                successful += 1;
                items.push(BatchResultItem::Success {
                    long_url,
                    short_code,
                    short_url,
                });
            }
            Err(err) => {
                items.push(BatchResultItem::Error {
                    long_url,
                    error: err.to_error_info(),
                });
            }
        }
    }

    Ok(Json(BatchShortenResponse {
        summary: BatchSummary {
            total,
            successful,
            failed: total - successful,
        },
        items,
    }))
}

async fn process_single_url(
    state: &AppState,
    item: ShortenRequest,
) -> Result<(String, String), AppError> {
    item.validate()?;

    let record = state.shortener.create_short_url(item.into()).await?;
    let short_url = state.short_url(&record.short_code);

    Ok((record.short_code, short_url))
}
