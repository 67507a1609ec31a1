//! Business logic services for the application layer.

pub mod collision_resolver;
pub mod invalidation;
pub mod shortener_service;

pub use collision_resolver::CollisionResolver;
pub use invalidation::InvalidationEpochs;
pub use shortener_service::{ShortenerService, ShortenerSettings};
