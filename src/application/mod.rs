//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache access, validation, and business rules. Services consume the
//! repository and cache traits and provide a clean API for HTTP handlers and
//! the admin CLI.
//!
//! # Available Services
//!
//! - [`services::ShortenerService`] - Short URL creation, resolution and lifecycle
//! - [`services::CollisionResolver`] - Bounded code allocation loop

pub mod services;
