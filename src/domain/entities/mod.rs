//! Core domain entities.
//!
//! Entities are plain data structures. Creation and partial updates use
//! separate companion types:
//! - [`NewShortUrl`] - a record with its code already chosen, ready to insert
//! - [`CreateShortUrl`] - a validated create request before code allocation
//! - [`ShortUrlPatch`] - a partial update of mutable metadata

pub mod short_url;

pub use short_url::{CreateShortUrl, NewShortUrl, ShortUrl, ShortUrlPatch};
