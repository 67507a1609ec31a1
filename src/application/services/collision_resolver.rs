//! Bounded retry loop that turns candidate codes into a stored record.

use std::future::Future;

use metrics::counter;
use tracing::{debug, warn};

use crate::error::AppError;

/// Default cap on generate-and-insert attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Retries code generation until a free code is found or the cap is hit.
///
/// The pre-check only narrows the race window. The storage unique constraint
/// decides: an insert rejected with [`AppError::DuplicateCode`] consumes an
/// attempt exactly like a pre-check hit. Nothing is ever overwritten.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    max_attempts: u32,
}

impl CollisionResolver {
    /// Creates a resolver. A cap of zero is raised to one attempt.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draws candidates until `is_taken` reports a free one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CollisionExhausted`] once every attempt collided.
    /// Errors from `generate` or `is_taken` are returned as-is.
    pub async fn ensure_unique<G, GFut, C, CFut>(
        &self,
        mut generate: G,
        mut is_taken: C,
    ) -> Result<String, AppError>
    where
        G: FnMut() -> GFut,
        GFut: Future<Output = Result<String, AppError>>,
        C: FnMut(String) -> CFut,
        CFut: Future<Output = Result<bool, AppError>>,
    {
        for attempt in 1..=self.max_attempts {
            let code = generate().await?;
            if !is_taken(code.clone()).await? {
                return Ok(code);
            }
            self.note_collision(attempt, &code);
        }

        Err(self.exhausted())
    }

    /// Generates, pre-checks and inserts in one closed loop.
    ///
    /// `insert` failing with [`AppError::DuplicateCode`] means another writer
    /// claimed the code between the pre-check and the insert; the loop then
    /// continues with a fresh candidate. Any other insert error ends the loop.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CollisionExhausted`] once every attempt collided.
    pub async fn create_with_generated_code<G, GFut, C, CFut, I, IFut, T>(
        &self,
        mut generate: G,
        mut is_taken: C,
        mut insert: I,
    ) -> Result<T, AppError>
    where
        G: FnMut() -> GFut,
        GFut: Future<Output = Result<String, AppError>>,
        C: FnMut(String) -> CFut,
        CFut: Future<Output = Result<bool, AppError>>,
        I: FnMut(String) -> IFut,
        IFut: Future<Output = Result<T, AppError>>,
    {
        for attempt in 1..=self.max_attempts {
            let code = generate().await?;

            if is_taken(code.clone()).await? {
                self.note_collision(attempt, &code);
                continue;
            }

            match insert(code.clone()).await {
                Ok(created) => {
                    debug!(attempt, code = %code, "Short code allocated");
                    return Ok(created);
                }
                Err(AppError::DuplicateCode { .. }) => {
                    self.note_collision(attempt, &code);
                }
                Err(e) => return Err(e),
            }
        }

        Err(self.exhausted())
    }

    fn note_collision(&self, attempt: u32, code: &str) {
        counter!("shortener_code_collisions_total").increment(1);
        warn!(
            attempt,
            max_attempts = self.max_attempts,
            code,
            "Short code collision, retrying"
        );
    }

    fn exhausted(&self) -> AppError {
        AppError::CollisionExhausted {
            attempts: self.max_attempts,
        }
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
