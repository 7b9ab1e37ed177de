//! Pickup tickets.
//!
//! A ticket is issued when a rental is approved and validated once at the
//! counter. Returning a vehicle requires the rental's current ticket to have
//! been used.

use std::collections::HashMap;

use chrono::NaiveDate;
use fleetrent_shared::types::{RentalId, TicketId, VehicleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rental::{Rental, RentalError};
use crate::vehicle::Vehicle;

/// One-time pickup credential with a snapshot of the rental at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Code printed on the ticket, e.g. `TKT-1A2B3C4D5E6F`.
    pub code: String,
    /// Rental the ticket belongs to.
    pub rental_id: RentalId,
    /// Customer name, matched at pickup.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Vehicle to hand over.
    pub vehicle_id: VehicleId,
    /// "Make Model".
    pub vehicle_label: String,
    /// Licence plate.
    pub plate: String,
    /// First rental day; pickup is refused before it.
    pub start_date: NaiveDate,
    /// Last rental day.
    pub end_date: NaiveDate,
    /// Fee estimate at issuance.
    pub total_fee: Decimal,
    /// Day the ticket was issued.
    pub issued_on: NaiveDate,
    /// Set once the ticket has been validated.
    pub used: bool,
}

/// Why a ticket was refused at pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TicketRejection {
    /// The ticket was already validated.
    AlreadyUsed,
    /// The presented name does not match the ticket holder.
    NameMismatch,
    /// The rental has not started yet.
    NotYetValid {
        /// First day the ticket is accepted.
        start_date: NaiveDate,
    },
}

impl fmt::Display for TicketRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyUsed => f.write_str("ticket has already been used"),
            Self::NameMismatch => f.write_str("name does not match the ticket holder"),
            Self::NotYetValid { start_date } => {
                write!(f, "ticket is not valid before {start_date}")
            }
        }
    }
}

/// Issues and validates tickets, keyed by rental.
#[derive(Debug, Clone, Default)]
pub struct TicketGate {
    by_rental: HashMap<RentalId, Ticket>,
    by_code: HashMap<String, RentalId>,
}

impl TicketGate {
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the gate from persisted tickets.
    #[must_use]
    pub fn from_tickets(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        let mut gate = Self::new();
        for ticket in tickets {
            gate.store(ticket);
        }
        gate
    }

    /// Issues a fresh, unused ticket for `rental`, replacing any earlier one.
    pub fn issue(&mut self, rental: &Rental, vehicle: &Vehicle, today: NaiveDate) -> Ticket {
        self.issue_with(rental, vehicle, today, false)
    }

    /// Replaces the rental's ticket after an extension.
    ///
    /// The new ticket keeps the `used` flag of the one it replaces, so a
    /// vehicle already handed over can still be returned.
    pub fn reissue(&mut self, rental: &Rental, vehicle: &Vehicle, today: NaiveDate) -> Ticket {
        let used = self.by_rental.get(&rental.id).is_some_and(|t| t.used);
        self.issue_with(rental, vehicle, today, used)
    }

    /// Validates a ticket at pickup and marks it used.
    ///
    /// Succeeds only once per ticket, for the holder's name (case-insensitive)
    /// and not before the rental's start date.
    pub fn validate(
        &mut self,
        code: &str,
        presented_name: &str,
        today: NaiveDate,
    ) -> Result<Ticket, RentalError> {
        let code = code.trim().to_uppercase();
        let ticket = self
            .by_code
            .get(&code)
            .and_then(|rental_id| self.by_rental.get_mut(rental_id))
            .ok_or_else(|| RentalError::not_found("Ticket", &code))?;

        if ticket.used {
            return Err(RentalError::TicketRejected(TicketRejection::AlreadyUsed));
        }
        if ticket.customer_name.trim().to_lowercase() != presented_name.trim().to_lowercase() {
            return Err(RentalError::TicketRejected(TicketRejection::NameMismatch));
        }
        if today < ticket.start_date {
            return Err(RentalError::TicketRejected(TicketRejection::NotYetValid {
                start_date: ticket.start_date,
            }));
        }

        ticket.used = true;
        Ok(ticket.clone())
    }

    /// The current ticket of a rental.
    #[must_use]
    pub fn get_by_rental_id(&self, rental_id: RentalId) -> Option<&Ticket> {
        self.by_rental.get(&rental_id)
    }

    /// Rental a ticket code belongs to, without validating it.
    #[must_use]
    pub fn rental_for_code(&self, code: &str) -> Option<RentalId> {
        self.by_code.get(&code.trim().to_uppercase()).copied()
    }

    /// Drops the rental's ticket.
    pub fn revoke(&mut self, rental_id: RentalId) -> Option<Ticket> {
        let ticket = self.by_rental.remove(&rental_id)?;
        self.by_code.remove(&ticket.code);
        Some(ticket)
    }

    /// All current tickets.
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.by_rental.values()
    }

    fn issue_with(
        &mut self,
        rental: &Rental,
        vehicle: &Vehicle,
        today: NaiveDate,
        used: bool,
    ) -> Ticket {
        self.revoke(rental.id);

        let id = self.unused_ticket_id();
        let ticket = Ticket {
            id,
            code: ticket_code(id),
            rental_id: rental.id,
            customer_name: rental.customer.name.clone(),
            customer_email: rental.customer.email.clone(),
            vehicle_id: vehicle.id,
            vehicle_label: vehicle.label(),
            plate: vehicle.plate.clone(),
            start_date: rental.start_date,
            end_date: rental.end_date,
            total_fee: rental.total_fee,
            issued_on: today,
            used,
        };
        self.store(ticket.clone());
        ticket
    }

    fn unused_ticket_id(&self) -> TicketId {
        loop {
            let id = TicketId::new();
            if !self.by_code.contains_key(&ticket_code(id)) {
                return id;
            }
        }
    }

    fn store(&mut self, ticket: Ticket) {
        self.by_code.insert(ticket.code.clone(), ticket.rental_id);
        self.by_rental.insert(ticket.rental_id, ticket);
    }
}

/// `TKT-` plus the random tail of the v7 id (its head is a timestamp).
fn ticket_code(id: TicketId) -> String {
    let hex = id.into_inner().simple().to_string().to_uppercase();
    format!("TKT-{}", &hex[hex.len() - 12..])
}
