//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`            - Service banner
//! - `GET  /{code}`      - Short URL redirect
//! - `GET  /health`      - Health check: storage, cache, click queue
//! - `GET  /ping`        - Alias of `/health`
//! - `/api/*`            - REST API (rate limited)
//!
//! # Middleware
//!
//! - **CORS** - Any origin, answered before rate limiting
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/api` (configurable for proxy deployments)
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, index_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::http::Method;
use axum::routing::get;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let api_router = api::routes::api_routes().layer(rate_limit::layer(behind_proxy));

    NormalizePathLayer::trim_trailing_slash().layer(base_router(api_router, state))
}

/// Routes of [`app_router`] without rate limiting or path normalization.
///
/// Suitable for in-process callers and tests that have no peer address.
pub fn unlimited_router(state: AppState) -> Router {
    base_router(api::routes::api_routes(), state)
}

fn base_router(api_router: Router<AppState>, state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ping", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}
