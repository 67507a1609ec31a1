//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

/// A successful resolution waiting to be counted.
///
/// Sent from the redirect path to [`crate::domain::click_worker::run_click_worker`]
/// through a bounded channel so that the redirect response never waits on the
/// counter update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub resolved_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            resolved_at: Utc::now(),
        }
    }
}
