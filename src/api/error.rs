//! HTTP mapping of [`AppError`].
//!
//! Every error leaves the API as
//! `{"error": {"code": "...", "message": "...", "details": {...}}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, ErrorInfo};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Status code returned for an error.
pub fn status_code(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::DuplicateCode { .. } => StatusCode::CONFLICT,
        AppError::CollisionExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Gone { .. } | AppError::Expired { .. } => StatusCode::GONE,
        AppError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::bad_request("bad", json!({})), StatusCode::BAD_REQUEST),
            (
                AppError::DuplicateCode {
                    code: "taken".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                AppError::CollisionExhausted { attempts: 5 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::unknown_code("nope1"), StatusCode::NOT_FOUND),
            (AppError::Gone { code: "x".into() }, StatusCode::GONE),
            (
                AppError::Expired {
                    code: "x".into(),
                    expired_at: Utc::now(),
                },
                StatusCode::GONE,
            ),
            (
                AppError::storage_unavailable("down"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Timeout { elapsed_ms: 2000 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::internal("boom", json!({})),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(status_code(&err), expected, "{err:?}");
        }
    }

    #[test]
    fn test_response_status_matches_mapping() {
        let response = AppError::Gone {
            code: "abc1234".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }
}
