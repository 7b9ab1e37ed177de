//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over the rental service
//! - JSON error responses
//! - A notifier that reports through tracing

pub mod error;
pub mod notifier;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use fleetrent_core::RentalService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use notifier::TracingNotifier;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The rental engine.
    pub service: Arc<RentalService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
