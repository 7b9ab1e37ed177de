//! Rental error types.
//!
//! Every catalog operation returns these as typed failures; a caller only
//! assumes a state change happened after an `Ok`.

use fleetrent_shared::AppError;
use fleetrent_shared::types::RentalId;
use thiserror::Error;

use crate::pricing::PricingError;
use crate::rental::types::{RentalAction, RentalStatus};
use crate::ticket::TicketRejection;
use crate::vehicle::availability::BookingConflict;
use crate::vehicle::schedule::InvalidDateRange;

/// Errors that can occur during rental operations.
#[derive(Debug, Error)]
pub enum RentalError {
    /// The requested dates collide with another booking or the vehicle is grounded.
    #[error("Booking conflict: {0}")]
    Conflict(BookingConflict),

    /// The rental's status does not allow the operation.
    #[error("Cannot {action} a rental in status {from}")]
    InvalidState {
        /// Current status.
        from: RentalStatus,
        /// Attempted operation.
        action: RentalAction,
    },

    /// Unknown rental, vehicle, issue or ticket.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Return attempted before the pickup ticket was validated.
    #[error("Ticket for rental {0} has not been used for pickup")]
    TicketNotUsed(RentalId),

    /// Ticket validation refused.
    #[error("Ticket rejected: {0}")]
    TicketRejected(TicketRejection),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid vehicle pricing.
    #[error("Invalid pricing: {0}")]
    Pricing(#[from] PricingError),
}

impl RentalError {
    /// Shorthand for a missing record.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Conflict(_) => 409,
            Self::InvalidState { .. } | Self::TicketNotUsed(_) | Self::TicketRejected(_) => 422,
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::Pricing(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "BOOKING_CONFLICT",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::TicketNotUsed(_) => "TICKET_NOT_USED",
            Self::TicketRejected(_) => "TICKET_REJECTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Pricing(_) => "INVALID_PRICING",
        }
    }
}

impl From<InvalidDateRange> for RentalError {
    fn from(err: InvalidDateRange) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RentalError> for AppError {
    fn from(err: RentalError) -> Self {
        let message = err.to_string();
        match err {
            RentalError::Conflict(_) => Self::Conflict(message),
            RentalError::NotFound { .. } => Self::NotFound(message),
            RentalError::InvalidState { .. }
            | RentalError::TicketNotUsed(_)
            | RentalError::TicketRejected(_) => Self::BusinessRule(message),
            RentalError::Validation(_) | RentalError::Pricing(_) => Self::Validation(message),
        }
    }
}
