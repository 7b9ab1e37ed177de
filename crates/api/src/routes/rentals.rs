//! Rental routes: requests, lifecycle transitions and tickets.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use fleetrent_core::ticket::Ticket;
use fleetrent_core::{CreateRental, Rental};
use fleetrent_shared::types::RentalId;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError};

/// Creates the rental routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rentals", get(list_rentals).post(create_rental))
        .route("/rentals/{rental_id}", get(get_rental))
        .route("/rentals/{rental_id}/approve", post(approve_rental))
        .route("/rentals/{rental_id}/cancel", post(cancel_rental))
        .route("/rentals/{rental_id}/return", post(return_rental))
        .route("/rentals/{rental_id}/extend", post(extend_rental))
        .route("/rentals/{rental_id}/ticket", get(get_ticket))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query for listing rentals.
#[derive(Debug, Deserialize)]
pub struct ListRentalsQuery {
    /// Only this user's rentals.
    pub user: Option<String>,
}

/// Request body for cancelling a rental.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    /// Why the request is cancelled; sent to the customer.
    pub reason: String,
}

/// Request body for returning a vehicle.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    /// Damage noted at the counter, one entry per item.
    #[serde(default)]
    pub damages: Vec<String>,
}

/// Request body for extending a rental.
#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    /// New last rental day.
    pub new_end: NaiveDate,
    /// Insurance for the whole extended rental; unchanged when omitted.
    pub insurance: Option<bool>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/rentals` - All rentals, or one user's.
async fn list_rentals(
    State(state): State<AppState>,
    Query(query): Query<ListRentalsQuery>,
) -> impl IntoResponse {
    let rentals = state.service.rentals(query.user.as_deref()).await;
    Json(json!({ "rentals": rentals }))
}

/// POST `/rentals` - Request a rental.
async fn create_rental(
    State(state): State<AppState>,
    Json(payload): Json<CreateRental>,
) -> Result<impl IntoResponse, ApiError> {
    let rental = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// GET `/rentals/{rental_id}` - One rental.
async fn get_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
) -> Result<Json<Rental>, ApiError> {
    Ok(Json(state.service.rental(rental_id).await?))
}

/// POST `/rentals/{rental_id}/approve` - Approve and issue the pickup ticket.
async fn approve_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
) -> Result<Json<Rental>, ApiError> {
    Ok(Json(state.service.approve(rental_id).await?))
}

/// POST `/rentals/{rental_id}/cancel` - Cancel a pending request.
async fn cancel_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<Rental>, ApiError> {
    Ok(Json(state.service.cancel(rental_id, payload.reason).await?))
}

/// POST `/rentals/{rental_id}/return` - Take the vehicle back today.
async fn return_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
    payload: Option<Json<ReturnRequest>>,
) -> Result<Json<Rental>, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    Ok(Json(
        state
            .service
            .return_rental(rental_id, &payload.damages)
            .await?,
    ))
}

/// POST `/rentals/{rental_id}/extend` - Move the end date later.
async fn extend_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
    Json(payload): Json<ExtendRequest>,
) -> Result<Json<Rental>, ApiError> {
    let insurance = match payload.insurance {
        Some(insurance) => insurance,
        None => state.service.rental(rental_id).await?.insurance,
    };
    Ok(Json(
        state
            .service
            .extend(rental_id, payload.new_end, insurance)
            .await?,
    ))
}

/// GET `/rentals/{rental_id}/ticket` - The current pickup ticket.
async fn get_ticket(
    State(state): State<AppState>,
    Path(rental_id): Path<RentalId>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.service.ticket_for_rental(rental_id).await?))
}
