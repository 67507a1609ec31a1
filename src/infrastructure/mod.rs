//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache backends (in-process, Redis, no-op)
//! - [`persistence`] - Repository implementations (PostgreSQL, in-memory)

pub mod cache;
pub mod persistence;
