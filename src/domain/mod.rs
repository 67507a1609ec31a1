//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Persistence gateway trait
//! - [`click_event`] - Click accounting event model
//! - [`click_worker`] - Asynchronous click accounting worker
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Orchestration lives in [`crate::application::services`].
//!
//! # Click Accounting Flow
//!
//! 1. A successful resolution calls [`click_worker::ClickRecorder::record`]
//! 2. The [`click_event::ClickEvent`] is queued on a bounded channel
//! 3. [`click_worker::run_click_worker`] applies it with retry
//! 4. The repository increments the counter in a single atomic statement

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
