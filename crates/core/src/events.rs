//! Domain events emitted by catalog transitions.
//!
//! Transitions are pure: they mutate the catalog and describe what happened.
//! Persistence and notification react to these events afterwards.

use serde::Serialize;

use crate::rental::Rental;
use crate::ticket::Ticket;
use crate::vehicle::{MaintenanceIssue, Vehicle};

/// Something that happened to a rental or vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A booking request was accepted as Pending.
    RentalRequested {
        /// The new rental.
        rental: Rental,
    },
    /// A rental was approved and its ticket issued.
    RentalApproved {
        /// The rental, now Active.
        rental: Rental,
        /// The pickup ticket.
        ticket: Ticket,
    },
    /// A pending rental was cancelled.
    RentalRejected {
        /// The rental, now Cancelled.
        rental: Rental,
        /// Why.
        reason: String,
    },
    /// The vehicle was handed over against the ticket.
    PickupConfirmed {
        /// The rental.
        rental: Rental,
        /// The ticket, now used.
        ticket: Ticket,
    },
    /// The vehicle came back.
    RentalReturned {
        /// The rental, now Returned with its actual fee.
        rental: Rental,
    },
    /// An active rental got a later end date.
    RentalExtended {
        /// The rental with its new end date and fee.
        rental: Rental,
        /// The replacement ticket.
        ticket: Ticket,
    },
    /// A critical issue grounded a vehicle.
    CriticalMaintenance {
        /// The vehicle, after the status change.
        vehicle: Vehicle,
        /// The issue.
        issue: MaintenanceIssue,
    },
    /// An active rental ends soon.
    DueSoon {
        /// The rental.
        rental: Rental,
    },
    /// An active rental is past its end date.
    Overdue {
        /// The rental.
        rental: Rental,
    },
}

impl DomainEvent {
    /// Stable name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RentalRequested { .. } => "rental_requested",
            Self::RentalApproved { .. } => "rental_approved",
            Self::RentalRejected { .. } => "rental_rejected",
            Self::PickupConfirmed { .. } => "pickup_confirmed",
            Self::RentalReturned { .. } => "rental_returned",
            Self::RentalExtended { .. } => "rental_extended",
            Self::CriticalMaintenance { .. } => "critical_maintenance",
            Self::DueSoon { .. } => "due_soon",
            Self::Overdue { .. } => "overdue",
        }
    }
}
