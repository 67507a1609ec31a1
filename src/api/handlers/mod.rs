//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod redirect;
pub mod shorten;
pub mod urls;

pub use health::{health_handler, index_handler};
pub use redirect::redirect_handler;
pub use shorten::{batch_shorten_handler, shorten_handler};
pub use urls::{
    deactivate_url_handler, get_url_handler, update_url_handler, url_analytics_handler,
};
