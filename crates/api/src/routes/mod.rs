//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod rentals;
pub mod tickets;
pub mod vehicles;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(vehicles::routes())
        .merge(rentals::routes())
        .merge(tickets::routes())
}
