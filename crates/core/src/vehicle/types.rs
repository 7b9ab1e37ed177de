//! Vehicle domain types.

use chrono::NaiveDate;
use fleetrent_shared::types::{IssueId, VehicleId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pricing::PricingTerms;
use crate::rental::RentalError;
use crate::vehicle::schedule::ScheduleStore;

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    /// Free to book.
    Available,
    /// Holds at least one pending booking.
    Reserved,
    /// Out with a renter.
    Rented,
    /// Grounded by a critical maintenance issue.
    UnderMaintenance,
    /// Withdrawn from the fleet by an operator.
    OutOfService,
}

impl VehicleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Rented => "RENTED",
            Self::UnderMaintenance => "UNDER_MAINTENANCE",
            Self::OutOfService => "OUT_OF_SERVICE",
        }
    }

    /// False while the vehicle may not take new bookings.
    #[must_use]
    pub fn accepts_bookings(&self) -> bool {
        !matches!(self, Self::UnderMaintenance | Self::OutOfService)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entry in a vehicle's maintenance log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceIssue {
    /// Issue identifier.
    pub id: IssueId,
    /// Category, e.g. `damage` or `service`.
    pub kind: String,
    /// Free-form description.
    pub description: String,
    /// Who reported it.
    pub reported_by: String,
    /// 1 (cosmetic) to 5 (unsafe).
    pub severity: u8,
    /// Day it was logged.
    pub reported_on: NaiveDate,
    /// Closed by maintenance staff.
    #[serde(default)]
    pub resolved: bool,
}

impl MaintenanceIssue {
    /// Unresolved and at or above the critical threshold.
    #[must_use]
    pub fn is_critical(&self, threshold: u8) -> bool {
        !self.resolved && self.severity >= threshold
    }
}

/// Input for logging a maintenance issue.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIssue {
    /// Category, e.g. `damage`.
    pub kind: String,
    /// Free-form description.
    pub description: String,
    /// Who reported it.
    pub reported_by: String,
    /// 1 to 5.
    pub severity: u8,
}

/// A rentable vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle identifier.
    pub id: VehicleId,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Licence plate, unique in the fleet.
    pub plate: String,
    /// Price list.
    pub pricing: PricingTerms,
    /// Operational status.
    pub status: VehicleStatus,
    /// Booked ranges.
    #[serde(default)]
    pub schedule: ScheduleStore,
    /// Maintenance log.
    #[serde(default)]
    pub issues: Vec<MaintenanceIssue>,
}

impl Vehicle {
    /// "Make Model" label used on tickets.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    /// True if any unresolved issue reaches `threshold`.
    #[must_use]
    pub fn has_critical_issue(&self, threshold: u8) -> bool {
        self.issues.iter().any(|i| i.is_critical(threshold))
    }

    /// Appends an issue to the maintenance log.
    pub fn add_issue(
        &mut self,
        input: NewIssue,
        reported_on: NaiveDate,
    ) -> Result<MaintenanceIssue, RentalError> {
        if !(1..=5).contains(&input.severity) {
            return Err(RentalError::Validation(format!(
                "Severity must be between 1 and 5, got {}",
                input.severity
            )));
        }
        if input.description.trim().is_empty() {
            return Err(RentalError::Validation(
                "Issue description is required".to_string(),
            ));
        }

        let issue = MaintenanceIssue {
            id: IssueId::new(),
            kind: input.kind,
            description: input.description.trim().to_string(),
            reported_by: input.reported_by,
            severity: input.severity,
            reported_on,
            resolved: false,
        };
        self.issues.push(issue.clone());
        Ok(issue)
    }

    /// Marks an issue resolved. Resolving twice is a no-op.
    pub fn resolve_issue(&mut self, issue_id: IssueId) -> Result<&MaintenanceIssue, RentalError> {
        let issue = self
            .issues
            .iter_mut()
            .find(|i| i.id == issue_id)
            .ok_or_else(|| RentalError::not_found("Maintenance issue", issue_id))?;
        issue.resolved = true;
        Ok(issue)
    }
}

/// Input for registering a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Licence plate.
    pub plate: String,
    /// Price list.
    pub pricing: PricingTerms,
}
