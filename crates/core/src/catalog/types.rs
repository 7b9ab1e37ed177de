//! Catalog inputs and outcomes.

use chrono::NaiveDate;
use fleetrent_shared::types::VehicleId;
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::rental::{CustomerRef, Rental};
use crate::ticket::Ticket;
use crate::vehicle::Vehicle;

/// Input for requesting a rental.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRental {
    /// Customer placing the request.
    pub customer: CustomerRef,
    /// Vehicle to book.
    pub vehicle_id: VehicleId,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Add insurance to the fee.
    #[serde(default)]
    pub insurance: bool,
    /// Account that owns the rental.
    pub username: String,
}

/// Result of a rental transition: the updated record and what happened.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Rental after the transition.
    pub rental: Rental,
    /// Events for the dispatcher.
    pub events: Vec<DomainEvent>,
}

/// Result of a vehicle-level change.
#[derive(Debug, Clone)]
pub struct VehicleUpdate {
    /// Vehicle after the change.
    pub vehicle: Vehicle,
    /// Events for the dispatcher.
    pub events: Vec<DomainEvent>,
}

/// Everything the catalog persists, in stable id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Fleet with schedules and maintenance logs.
    pub vehicles: Vec<Vehicle>,
    /// All rentals, including finished ones.
    pub rentals: Vec<Rental>,
    /// Current tickets.
    pub tickets: Vec<Ticket>,
}
