//! Rental state machine.
//!
//! Pure transition checks: each function validates the move from the
//! current status and returns the action to apply. Schedule, ticket and
//! vehicle side effects are applied by the catalog.

use chrono::NaiveDate;

use crate::rental::error::RentalError;
use crate::rental::types::{LifecycleAction, RentalAction, RentalStatus};

/// Stateless service for rental status transitions.
pub struct LifecycleService;

impl LifecycleService {
    /// Approve a pending rental.
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::Approve)` if the rental is Pending
    /// * `Err(RentalError::InvalidState)` otherwise
    pub fn approve(current: RentalStatus) -> Result<LifecycleAction, RentalError> {
        match current {
            RentalStatus::Pending => Ok(LifecycleAction::Approve {
                new_status: RentalStatus::Active,
            }),
            _ => Err(RentalError::InvalidState {
                from: current,
                action: RentalAction::Approve,
            }),
        }
    }

    /// Cancel a pending rental. Active rentals can only be returned.
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::Cancel)` if the rental is Pending
    /// * `Err(RentalError::Validation)` if the reason is blank
    /// * `Err(RentalError::InvalidState)` otherwise
    pub fn cancel(current: RentalStatus, reason: String) -> Result<LifecycleAction, RentalError> {
        if reason.trim().is_empty() {
            return Err(RentalError::Validation(
                "Cancellation reason is required".to_string(),
            ));
        }

        match current {
            RentalStatus::Pending => Ok(LifecycleAction::Cancel {
                new_status: RentalStatus::Cancelled,
                reason,
            }),
            _ => Err(RentalError::InvalidState {
                from: current,
                action: RentalAction::Cancel,
            }),
        }
    }

    /// Return an active rental.
    ///
    /// The ticket check is not part of the status machine; the catalog
    /// enforces it after this succeeds.
    pub fn return_rental(
        current: RentalStatus,
        returned_on: NaiveDate,
    ) -> Result<LifecycleAction, RentalError> {
        match current {
            RentalStatus::Active => Ok(LifecycleAction::Return {
                new_status: RentalStatus::Returned,
                returned_on,
            }),
            _ => Err(RentalError::InvalidState {
                from: current,
                action: RentalAction::Return,
            }),
        }
    }

    /// Extend an active rental to a later end date.
    ///
    /// # Returns
    /// * `Ok(LifecycleAction::Extend)` if Active and `new_end` is after `current_end`
    /// * `Err(RentalError::InvalidState)` if not Active
    /// * `Err(RentalError::Validation)` if `new_end` does not lengthen the rental
    pub fn extend(
        current: RentalStatus,
        current_end: NaiveDate,
        new_end: NaiveDate,
    ) -> Result<LifecycleAction, RentalError> {
        if current != RentalStatus::Active {
            return Err(RentalError::InvalidState {
                from: current,
                action: RentalAction::Extend,
            });
        }
        if new_end <= current_end {
            return Err(RentalError::Validation(format!(
                "New end date {new_end} must be after current end date {current_end}"
            )));
        }

        Ok(LifecycleAction::Extend {
            new_status: RentalStatus::Active,
            new_end,
        })
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Active (approve)
    /// - Pending → Cancelled (cancel)
    /// - Active → Returned (return)
    /// - Active → Active (extend)
    #[must_use]
    pub fn is_valid_transition(from: RentalStatus, to: RentalStatus) -> bool {
        matches!(
            (from, to),
            (
                RentalStatus::Pending,
                RentalStatus::Active | RentalStatus::Cancelled
            ) | (
                RentalStatus::Active,
                RentalStatus::Returned | RentalStatus::Active
            )
        )
    }
}
