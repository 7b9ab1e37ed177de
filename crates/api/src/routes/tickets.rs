//! Pickup counter routes.

use axum::{Json, Router, extract::State, routing::post};
use fleetrent_core::ticket::Ticket;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Creates the ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tickets/validate", post(validate_ticket))
}

/// Request body for validating a ticket at pickup.
#[derive(Debug, Deserialize)]
pub struct ValidateTicketRequest {
    /// Code printed on the ticket.
    pub code: String,
    /// Name on the customer's ID.
    pub name: String,
}

/// POST `/tickets/validate` - Hand over the vehicle against its ticket.
async fn validate_ticket(
    State(state): State<AppState>,
    Json(payload): Json<ValidateTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state
        .service
        .validate_ticket(&payload.code, &payload.name)
        .await?;
    Ok(Json(ticket))
}
