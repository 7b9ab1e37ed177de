//! Fleet routes: vehicles, availability and the maintenance log.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use fleetrent_core::vehicle::{BookingConflict, NewIssue, NewVehicle, Vehicle};
use fleetrent_shared::types::{IssueId, VehicleId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Creates the vehicle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(register_vehicle))
        .route("/vehicles/available", get(available_vehicles))
        .route("/vehicles/{vehicle_id}", get(get_vehicle))
        .route("/vehicles/{vehicle_id}/conflicts", get(check_conflicts))
        .route("/vehicles/{vehicle_id}/issues", post(report_issue))
        .route(
            "/vehicles/{vehicle_id}/issues/{issue_id}/resolve",
            post(resolve_issue),
        )
        .route("/vehicles/{vehicle_id}/service", post(set_service_state))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query for date-based lookups.
#[derive(Debug, Deserialize)]
pub struct DateWindowQuery {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Requesting user; their own adjacent bookings count as extensions.
    #[serde(default)]
    pub user: String,
}

/// Availability answer for one vehicle.
#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    /// True when the dates can be booked.
    pub available: bool,
    /// What blocks the dates, if anything.
    pub conflict: Option<BookingConflict>,
}

/// Request body for taking a vehicle out of, or back into, service.
#[derive(Debug, Deserialize)]
pub struct ServiceStateRequest {
    /// Withdraw the vehicle from the fleet.
    pub out_of_service: bool,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/vehicles` - The fleet, ordered by plate.
async fn list_vehicles(State(state): State<AppState>) -> impl IntoResponse {
    let vehicles = state.service.vehicles().await;
    Json(json!({ "vehicles": vehicles }))
}

/// POST `/vehicles` - Register a vehicle.
async fn register_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<NewVehicle>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicle = state.service.register_vehicle(payload).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// GET `/vehicles/available` - Vehicles bookable for a date range.
async fn available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<DateWindowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let vehicles = state
        .service
        .available_vehicles(query.start, query.end, &query.user)
        .await?;
    Ok(Json(json!({ "vehicles": vehicles })))
}

/// GET `/vehicles/{vehicle_id}` - One vehicle with schedule and issues.
async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<VehicleId>,
) -> Result<Json<Vehicle>, ApiError> {
    Ok(Json(state.service.vehicle(vehicle_id).await?))
}

/// GET `/vehicles/{vehicle_id}/conflicts` - Explain why dates cannot be booked.
async fn check_conflicts(
    State(state): State<AppState>,
    Path(vehicle_id): Path<VehicleId>,
    Query(query): Query<DateWindowQuery>,
) -> Result<Json<ConflictResponse>, ApiError> {
    let conflict = state
        .service
        .conflicts(vehicle_id, query.start, query.end, &query.user)
        .await?;
    Ok(Json(ConflictResponse {
        available: conflict.is_none(),
        conflict,
    }))
}

/// POST `/vehicles/{vehicle_id}/issues` - Log a maintenance issue.
async fn report_issue(
    State(state): State<AppState>,
    Path(vehicle_id): Path<VehicleId>,
    Json(payload): Json<NewIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state.service.report_issue(vehicle_id, payload).await?;
    Ok((StatusCode::CREATED, Json(update.vehicle)))
}

/// POST `/vehicles/{vehicle_id}/issues/{issue_id}/resolve` - Close an issue.
async fn resolve_issue(
    State(state): State<AppState>,
    Path((vehicle_id, issue_id)): Path<(VehicleId, IssueId)>,
) -> Result<Json<Vehicle>, ApiError> {
    let update = state.service.resolve_issue(vehicle_id, issue_id).await?;
    Ok(Json(update.vehicle))
}

/// POST `/vehicles/{vehicle_id}/service` - Withdraw or reinstate a vehicle.
async fn set_service_state(
    State(state): State<AppState>,
    Path(vehicle_id): Path<VehicleId>,
    Json(payload): Json<ServiceStateRequest>,
) -> Result<Json<Vehicle>, ApiError> {
    let update = state
        .service
        .set_out_of_service(vehicle_id, payload.out_of_service)
        .await?;
    info!(vehicle_id = %vehicle_id, status = %update.vehicle.status, "Service state updated via API");
    Ok(Json(update.vehicle))
}
