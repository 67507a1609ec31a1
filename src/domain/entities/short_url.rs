//! Short URL record and its input/patch companions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A stored short URL.
///
/// `short_code` and `long_url` never change after creation. `click_count` is
/// only ever increased by the storage layer's atomic increment; values held in
/// a cache may lag behind the stored count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub click_count: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl ShortUrl {
    /// Returns true if the expiry is set and `now` is at or past it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks whether the record may be redirected to at `now`.
    ///
    /// Deactivation is checked before expiry: an inactive record reports
    /// [`AppError::Gone`] even when it has also expired.
    pub fn ensure_resolvable(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if !self.is_active {
            return Err(AppError::Gone {
                code: self.short_code.clone(),
            });
        }

        if let Some(expired_at) = self.expires_at.filter(|e| now >= *e) {
            return Err(AppError::Expired {
                code: self.short_code.clone(),
                expired_at,
            });
        }

        Ok(())
    }
}

/// Input for inserting a record whose short code has already been chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortUrl {
    pub short_code: String,
    pub long_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Create request handed to the shortening service by the validation layer.
#[derive(Debug, Clone, Default)]
pub struct CreateShortUrl {
    pub long_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Caller-chosen code. A taken alias is reported, never retried.
    pub custom_code: Option<String>,
}

impl CreateShortUrl {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Builds the storage input for a chosen code.
    pub fn to_new_short_url(&self, short_code: String) -> NewShortUrl {
        NewShortUrl {
            short_code,
            long_url: self.long_url.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Partial update of the mutable fields of a record.
///
/// `None` leaves a field unchanged. For optional fields `Some(None)` clears the
/// value and `Some(Some(v))` sets it. The target URL and the click counter are
/// deliberately not part of the patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlPatch {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl ShortUrlPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.expires_at.is_none()
            && self.is_active.is_none()
    }

    /// Applies the patch in place and bumps `updated_at`.
    pub fn apply_to(&self, record: &mut ShortUrl, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(expires_at) = self.expires_at {
            record.expires_at = expires_at;
        }
        if let Some(is_active) = self.is_active {
            record.is_active = is_active;
        }
        record.updated_at = now;
    }
}
