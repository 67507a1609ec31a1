//! API route configuration.

use crate::api::handlers::{
    batch_shorten_handler, deactivate_url_handler, get_url_handler, shorten_handler,
    update_url_handler, url_analytics_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All `/api` routes, without rate limiting.
///
/// # Endpoints
///
/// - `POST   /shorten`               - Create a short URL
/// - `POST   /shorten/batch`         - Create up to 100 short URLs
/// - `GET    /urls/{code}`           - Stored record with current click count
/// - `GET    /urls/{code}/analytics` - Click count and last access
/// - `PATCH  /urls/{code}`           - Partially update metadata
/// - `DELETE /urls/{code}`           - Deactivate
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/batch", post(batch_shorten_handler))
        .route(
            "/urls/{code}",
            get(get_url_handler)
                .patch(update_url_handler)
                .delete(deactivate_url_handler),
        )
        .route("/urls/{code}/analytics", get(url_analytics_handler))
}
