//! DTOs for reading a short URL and its analytics.

use crate::domain::entities::ShortUrl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full record as returned by `GET /api/urls/{code}` and `PATCH`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlDetailsResponse {
    pub id: i64,
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub click_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlDetailsResponse {
    pub fn new(record: ShortUrl, short_url: String) -> Self {
        Self {
            id: record.id,
            short_code: record.short_code,
            short_url,
            long_url: record.long_url,
            title: record.title,
            description: record.description,
            click_count: record.click_count,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            expires_at: record.expires_at,
        }
    }
}

/// Click analytics for `GET /api/urls/{code}/analytics`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlAnalyticsResponse {
    pub short_code: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl From<ShortUrl> for UrlAnalyticsResponse {
    fn from(record: ShortUrl) -> Self {
        Self {
            short_code: record.short_code,
            click_count: record.click_count,
            created_at: record.created_at,
            last_accessed: record.last_accessed_at,
        }
    }
}
