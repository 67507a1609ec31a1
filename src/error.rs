//! Typed errors returned by the shortening core.
//!
//! The core never chooses HTTP status codes. [`AppError`] carries enough
//! structure for the API layer ([`crate::api::error`]) to map each variant to a
//! user-visible response, and for callers to decide whether a retry makes sense
//! ([`AppError::is_retryable`]).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

/// Machine-readable error payload shared by the API envelope and batch results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Error taxonomy of the shortening core.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad input. Caller's fault, never retried.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The storage layer rejected a short code that is already taken.
    #[error("short code '{code}' is already taken")]
    DuplicateCode { code: String },

    /// Code generation kept colliding until the attempt cap was reached.
    #[error("could not allocate a free short code after {attempts} attempts")]
    CollisionExhausted { attempts: u32 },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The short URL exists but was deactivated.
    #[error("short URL '{code}' has been deactivated")]
    Gone { code: String },

    /// The short URL exists and is active, but its expiry has passed.
    #[error("short URL '{code}' expired at {expired_at}")]
    Expired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    /// Transient infrastructure failure; safe to retry with backoff.
    #[error("storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// A storage call did not complete within its deadline.
    #[error("storage operation timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    /// Not-found error for an unknown short code.
    pub fn unknown_code(code: &str) -> Self {
        Self::not_found("Short URL not found", json!({ "short_code": code }))
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Returns true for transient failures a caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. } | Self::Timeout { .. })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::CollisionExhausted { .. } => "collision_exhausted",
            Self::NotFound { .. } => "not_found",
            Self::Gone { .. } => "gone",
            Self::Expired { .. } => "expired",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Structured details attached to the error.
    pub fn details(&self) -> Value {
        match self {
            Self::Validation { details, .. }
            | Self::NotFound { details, .. }
            | Self::Internal { details, .. } => details.clone(),
            Self::DuplicateCode { code } | Self::Gone { code } => json!({ "short_code": code }),
            Self::CollisionExhausted { attempts } => json!({ "attempts": attempts }),
            Self::Expired { code, expired_at } => {
                json!({ "short_code": code, "expired_at": expired_at })
            }
            Self::StorageUnavailable { .. } => json!({}),
            Self::Timeout { elapsed_ms } => json!({ "timeout_ms": elapsed_ms }),
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::not_found("Record not found", json!({})),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::storage_unavailable(e.to_string()),
            sqlx::Error::Database(db) => Self::internal(
                "Database error",
                json!({ "constraint": db.constraint(), "reason": db.message() }),
            ),
            other => Self::internal("Database error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        Self::bad_request("Validation failed", details)
    }
}
