//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlPatch};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;
use serde_json::json;

/// Row shape shared by every query returning a full record.
#[derive(Debug, sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    short_code: String,
    long_url: String,
    title: Option<String>,
    description: Option<String>,
    click_count: i64,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(r: ShortUrlRow) -> Self {
        Self {
            id: r.id,
            short_code: r.short_code,
            long_url: r.long_url,
            title: r.title,
            description: r.description,
            click_count: r.click_count,
            is_active: r.is_active,
            expires_at: r.expires_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
            last_accessed_at: r.last_accessed_at,
        }
    }
}

/// PostgreSQL repository for short URL records.
///
/// Uniqueness of `short_code` is enforced by the `short_urls_short_code_key`
/// constraint; click accounting is a single in-place `UPDATE`.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            INSERT INTO short_urls (short_code, long_url, title, description, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, short_code, long_url, title, description, click_count,
                      is_active, expires_at, created_at, updated_at, last_accessed_at
            "#,
        )
        .bind(&new_short_url.short_code)
        .bind(&new_short_url.long_url)
        .bind(&new_short_url.title)
        .bind(&new_short_url.description)
        .bind(new_short_url.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on_code(&e) {
                AppError::DuplicateCode {
                    code: new_short_url.short_code.clone(),
                }
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn fetch_by_code(&self, code: &str) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            SELECT id, short_code, long_url, title, description, click_count,
                   is_active, expires_at, created_at, updated_at, last_accessed_at
            FROM short_urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::from)
            .ok_or_else(|| AppError::unknown_code(code))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM short_urls WHERE short_code = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn increment_click_and_touch(
        &self,
        code: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // GREATEST ignores NULL, so the first click sets the timestamp
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET click_count = click_count + 1,
                last_accessed_at = GREATEST(last_accessed_at, $2)
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .bind(accessed_at)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::unknown_code(code));
        }

        Ok(())
    }

    async fn update_metadata(
        &self,
        code: &str,
        patch: ShortUrlPatch,
    ) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrlRow>(
            r#"
            UPDATE short_urls
            SET title       = CASE WHEN $2 THEN $3 ELSE title END,
                description = CASE WHEN $4 THEN $5 ELSE description END,
                expires_at  = CASE WHEN $6 THEN $7 ELSE expires_at END,
                is_active   = COALESCE($8, is_active),
                updated_at  = NOW()
            WHERE short_code = $1
            RETURNING id, short_code, long_url, title, description, click_count,
                      is_active, expires_at, created_at, updated_at, last_accessed_at
            "#,
        )
        .bind(code)
        .bind(patch.title.is_some())
        .bind(patch.title.flatten())
        .bind(patch.description.is_some())
        .bind(patch.description.flatten())
        .bind(patch.expires_at.is_some())
        .bind(patch.expires_at.flatten())
        .bind(patch.is_active)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::from)
            .ok_or_else(|| AppError::unknown_code(code))
    }

    async fn deactivate(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET is_active = FALSE,
                updated_at = NOW()
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::unknown_code(code));
        }

        Ok(())
    }

    async fn next_code_sequence(&self) -> Result<u64, AppError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT nextval('short_code_seq')")
            .fetch_one(self.pool.as_ref())
            .await?;

        u64::try_from(value).map_err(|_| {
            AppError::internal(
                "Code sequence returned a negative value",
                json!({ "value": value }),
            )
        })
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
