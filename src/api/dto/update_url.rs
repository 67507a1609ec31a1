//! DTO for the short URL update endpoint.

use crate::domain::entities::ShortUrlPatch;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::serde_as;
use validator::Validate;

/// Request body for `PATCH /api/urls/{code}`.
///
/// All fields are optional. Only provided fields are changed.
///
/// # Nullable fields
///
/// `title`, `description` and `expires_at` distinguish three states:
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear the value
/// - **Value** → set it
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUrlRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 255, message = "Title cannot exceed 255 characters"))]
    pub title: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,

    /// `false` deactivates, `true` reactivates.
    pub is_active: Option<bool>,
}

impl From<UpdateUrlRequest> for ShortUrlPatch {
    fn from(req: UpdateUrlRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            expires_at: req.expires_at,
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let req: UpdateUrlRequest = serde_json::from_value(json!({
            "title": "Docs",
            "description": null
        }))
        .unwrap();

        let patch = ShortUrlPatch::from(req);
        assert_eq!(patch.title, Some(Some("Docs".to_string())));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.expires_at, None);
        assert_eq!(patch.is_active, None);
    }

    #[test]
    fn test_expiry_parsed_as_rfc3339() {
        let req: UpdateUrlRequest = serde_json::from_value(json!({
            "expires_at": "2030-01-01T00:00:00Z",
            "is_active": false
        }))
        .unwrap();

        assert!(matches!(req.expires_at, Some(Some(_))));
        assert_eq!(req.is_active, Some(false));
    }

    #[test]
    fn test_title_length_validated() {
        let req = UpdateUrlRequest {
            title: Some(Some("t".repeat(256))),
            ..UpdateUrlRequest::default()
        };
        assert!(req.validate().is_err());
    }
}
