//! Rental domain types.

use chrono::NaiveDate;
use fleetrent_shared::types::{CustomerId, RentalId, VehicleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vehicle::schedule::DateRange;

/// Rental status in the booking lifecycle.
///
/// The valid transitions are:
/// - Pending → Active (approve)
/// - Pending → Cancelled (cancel)
/// - Active → Returned (return)
/// - Active → Active (extend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    /// Requested and holding a booking, awaiting approval.
    Pending,
    /// Approved; a pickup ticket exists.
    Active,
    /// Vehicle came back (terminal).
    Returned,
    /// Request withdrawn or rejected before approval (terminal).
    Cancelled,
}

impl RentalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Returned => "RETURNED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "RETURNED" => Some(Self::Returned),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// True while the rental holds a booking on its vehicle.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    /// True for statuses no transition leaves.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Returned | Self::Cancelled)
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations that move a rental through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalAction {
    /// Pending → Active.
    Approve,
    /// Pending → Cancelled.
    Cancel,
    /// Ticket validation at the counter.
    Pickup,
    /// Active → Returned.
    Return,
    /// Active → Active with a later end date.
    Extend,
}

impl fmt::Display for RentalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Approve => "approve",
            Self::Cancel => "cancel",
            Self::Pickup => "pick up",
            Self::Return => "return",
            Self::Extend => "extend",
        };
        f.write_str(s)
    }
}

/// Customer details copied onto the rental at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Customer identifier in the accounts system.
    pub id: CustomerId,
    /// Full name, matched against the name presented at pickup.
    pub name: String,
    /// Contact address for notifications.
    pub email: String,
}

/// A rental of one vehicle by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    /// Rental identifier.
    pub id: RentalId,
    /// Customer snapshot.
    pub customer: CustomerRef,
    /// Rented vehicle.
    pub vehicle_id: VehicleId,
    /// First rental day.
    pub start_date: NaiveDate,
    /// Last agreed rental day.
    pub end_date: NaiveDate,
    /// Lifecycle status.
    pub status: RentalStatus,
    /// Estimate at booking, recomputed on extension.
    pub total_fee: Decimal,
    /// Fee charged at return, zero until then.
    pub actual_fee: Decimal,
    /// Whether insurance was selected.
    pub insurance: bool,
    /// Account that owns the rental.
    pub username: String,
    /// Due-soon reminder already sent.
    #[serde(default)]
    pub due_soon_sent: bool,
    /// Overdue reminder already sent.
    #[serde(default)]
    pub overdue_sent: bool,
    /// Reason given when the request was cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Day the vehicle came back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_on: Option<NaiveDate>,
}

impl Rental {
    /// The booked date range.
    #[must_use]
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Applies a validated transition to the record.
    ///
    /// Fees are set by the caller; an extension re-arms both reminders.
    pub fn apply(&mut self, action: &LifecycleAction) {
        self.status = action.new_status();
        match action {
            LifecycleAction::Approve { .. } => {}
            LifecycleAction::Cancel { reason, .. } => {
                self.cancel_reason = Some(reason.clone());
            }
            LifecycleAction::Return { returned_on, .. } => {
                self.returned_on = Some(*returned_on);
            }
            LifecycleAction::Extend { new_end, .. } => {
                self.end_date = *new_end;
                self.due_soon_sent = false;
                self.overdue_sent = false;
            }
        }
    }
}

/// Validated transition produced by the lifecycle service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Approve a pending rental.
    Approve {
        /// Status after approval.
        new_status: RentalStatus,
    },
    /// Cancel a pending rental.
    Cancel {
        /// Status after cancellation.
        new_status: RentalStatus,
        /// Why the request was cancelled.
        reason: String,
    },
    /// Return an active rental.
    Return {
        /// Status after return.
        new_status: RentalStatus,
        /// Day of return.
        returned_on: NaiveDate,
    },
    /// Extend an active rental.
    Extend {
        /// Status after extension (unchanged).
        new_status: RentalStatus,
        /// New last rental day.
        new_end: NaiveDate,
    },
}

impl LifecycleAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> RentalStatus {
        match self {
            Self::Approve { new_status }
            | Self::Cancel { new_status, .. }
            | Self::Return { new_status, .. }
            | Self::Extend { new_status, .. } => *new_status,
        }
    }
}
