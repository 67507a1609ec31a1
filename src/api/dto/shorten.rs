//! DTOs for the shortening endpoints.

use crate::domain::entities::{CreateShortUrl, ShortUrl};
use crate::error::ErrorInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
///
/// Field lengths are checked here; URL syntax, alias characters and expiry
/// are checked by the service so every caller gets the same rules.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (absolute HTTP/HTTPS).
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    #[validate(length(max = 255, message = "Title cannot exceed 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    /// RFC 3339 timestamp. After this time, the short URL returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional alias (5-10 letters and digits).
    #[validate(length(min = 5, max = 10, message = "Custom code must be 5-10 characters"))]
    pub custom_code: Option<String>,
}

impl From<ShortenRequest> for CreateShortUrl {
    fn from(req: ShortenRequest) -> Self {
        Self {
            long_url: req.url,
            title: req.title,
            description: req.description,
            expires_at: req.expires_at,
            custom_code: req.custom_code,
        }
    }
}

/// Response for a created short URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn new(record: ShortUrl, short_url: String) -> Self {
        Self {
            id: record.id,
            short_code: record.short_code,
            short_url,
            long_url: record.long_url,
            title: record.title,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// Request to shorten up to 100 URLs at once.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchShortenRequest {
    /// Items are validated one by one so a bad item fails alone.
    #[validate(length(min = 1, max = 100, message = "Provide 1-100 URLs"))]
    pub urls: Vec<ShortenRequest>,
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct BatchShortenResponse {
    pub summary: BatchSummary,
    pub items: Vec<BatchResultItem>,
}

/// Individual result for a URL in the batch.
///
/// Uses untagged enum for cleaner JSON structure (no discriminator field).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchResultItem {
    Success {
        long_url: String,
        short_code: String,
        short_url: String,
    },
    Error {
        long_url: String,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
