//! campus-server: site API for the campus marketing site
//!
//! This crate provides:
//! - Listing endpoints backed by a stale-while-revalidate cache
//! - Detail, "recent" and view counting endpoints
//! - Contact and enquiry form submission
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error responses
//!
//! Listings never fail: when the CMS is unavailable they come back empty
//! with status 200, so pages render without their content sections.
//!
//! # Usage
//!
//! ```rust,ignore
//! use campus_server::{build_app, config::ServerConfig, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let app = build_app(AppState::new(config)?);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod listing;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer, request_span};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use campus_client;
pub use campus_core;

/// Build the router with the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);

    // Ids are assigned before the trace span is opened so every log line
    // of a request carries one
    routes::build_router(state).layer(
        ServiceBuilder::new()
            .layer(request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(cors)
            .layer(axum::middleware::from_fn(propagate_request_id)),
    )
}

/// Build CORS layer from configuration.
///
/// Origins that do not parse as header values are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    // Parse comma-separated origins
    let origins: Vec<http::HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = s, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
