//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Base62 short code generation and custom code validation
//! - [`url_validation`] - Target URL validation
//! - [`db_error`] - Classification of PostgreSQL constraint violations

pub mod code_generator;
pub mod db_error;
pub mod url_validation;
