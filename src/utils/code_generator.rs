//! Short code generation and validation.
//!
//! Codes are drawn from the base62 alphabet (`0-9A-Za-z`). Two strategies are
//! supported:
//!
//! - [`CodeStrategy::Random`] draws every character uniformly at random. With
//!   the default length of 7 the code space holds 62^7 (about 3.5 * 10^12)
//!   values.
//! - [`CodeStrategy::Sequential`] encodes a strictly increasing number. Codes
//!   never collide with each other but reveal creation order and volume.
//!
//! Everything here is pure: no I/O and no shared state.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde_json::json;

use crate::error::AppError;

/// Base62 alphabet in ascending value order.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const MIN_CODE_LENGTH: usize = 5;
pub const MAX_CODE_LENGTH: usize = 10;
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Codes that would shadow service routes.
const RESERVED_CODES: &[&str] = &["health", "admin", "static", "shorten"];

/// How new short codes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStrategy {
    #[default]
    Random,
    Sequential,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown code strategy '{other}', expected 'random' or 'sequential'"
            )),
        }
    }
}

impl fmt::Display for CodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// Produces short codes of a fixed configured length.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `length` is outside
    /// [`MIN_CODE_LENGTH`]..=[`MAX_CODE_LENGTH`].
    pub fn new(length: usize) -> Result<Self, AppError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(AppError::bad_request(
                format!("Code length must be {MIN_CODE_LENGTH}-{MAX_CODE_LENGTH} characters"),
                json!({ "length": length }),
            ));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a code with the given strategy.
    ///
    /// `seed` is ignored by [`CodeStrategy::Random`] and required by
    /// [`CodeStrategy::Sequential`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when a sequential code is requested
    /// without a seed.
    pub fn generate(&self, strategy: CodeStrategy, seed: Option<u64>) -> Result<String, AppError> {
        match (strategy, seed) {
            (CodeStrategy::Random, _) => Ok(self.random()),
            (CodeStrategy::Sequential, Some(seed)) => self.sequential(seed),
            (CodeStrategy::Sequential, None) => Err(AppError::internal(
                "Sequential code generation requires a seed",
                json!({}),
            )),
        }
    }

    /// Draws a random code using the thread-local generator.
    pub fn random(&self) -> String {
        self.random_with(&mut rand::rng())
    }

    /// Draws a random code from the supplied generator.
    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| BASE62_ALPHABET[rng.random_range(0..BASE62_ALPHABET.len())] as char)
            .collect()
    }

    /// Encodes `seed` in base62, left-padded with `'0'` to the configured length.
    ///
    /// Seeds beyond 62^length produce longer codes rather than wrapping, up to
    /// [`MAX_CODE_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] once the seed needs more than
    /// [`MAX_CODE_LENGTH`] digits.
    pub fn sequential(&self, seed: u64) -> Result<String, AppError> {
        let encoded = encode_base62(seed);
        if encoded.len() > MAX_CODE_LENGTH {
            return Err(AppError::internal(
                "Sequential code space exhausted",
                json!({ "seed": seed, "max_length": MAX_CODE_LENGTH }),
            ));
        }
        if encoded.len() >= self.length {
            return Ok(encoded);
        }
        let mut padded = "0".repeat(self.length - encoded.len());
        padded.push_str(&encoded);
        Ok(padded)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

/// Encodes a number in base62, most significant digit first.
pub fn encode_base62(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while n > 0 {
        digits.push(BASE62_ALPHABET[(n % 62) as usize]);
        n /= 62;
    }
    digits.reverse();

    digits.into_iter().map(char::from).collect()
}

pub fn is_base62(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Validates a caller-chosen short code.
///
/// # Rules
///
/// - Length: 5-10 characters
/// - Allowed characters: base62 (`0-9A-Za-z`)
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) {
        return Err(AppError::bad_request(
            format!("Custom code must be {MIN_CODE_LENGTH}-{MAX_CODE_LENGTH} characters"),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !is_base62(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
