//! Contracts with the outside world.
//!
//! The catalog never performs I/O. The service reaches storage, customers
//! and the calendar only through these traits.

use chrono::{Local, NaiveDate};
use fleetrent_shared::AppResult;

use crate::rental::Rental;
use crate::ticket::Ticket;
use crate::vehicle::{MaintenanceIssue, Vehicle};

/// Durable storage for the catalog's three collections.
#[async_trait::async_trait]
pub trait Persistence: Send + Sync {
    /// Loads the fleet. An empty store yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be read.
    async fn load_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    /// Replaces the stored fleet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be written.
    async fn save_vehicles(&self, vehicles: &[Vehicle]) -> AppResult<()>;

    /// Loads all rentals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be read.
    async fn load_rentals(&self) -> AppResult<Vec<Rental>>;

    /// Replaces the stored rentals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be written.
    async fn save_rentals(&self, rentals: &[Rental]) -> AppResult<()>;

    /// Loads the current tickets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be read.
    async fn load_tickets(&self) -> AppResult<Vec<Ticket>>;

    /// Replaces the stored tickets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data cannot be written.
    async fn save_tickets(&self, tickets: &[Ticket]) -> AppResult<()>;
}

/// Customer and staff notifications.
///
/// Delivery failures are reported but never undo the transition that
/// caused them.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// The rental was approved; `ticket` is needed at pickup.
    async fn notify_approval(&self, rental: &Rental, ticket: &Ticket) -> AppResult<()>;

    /// The request was cancelled.
    async fn notify_rejection(&self, rental: &Rental, reason: &str) -> AppResult<()>;

    /// The vehicle came back; `rental.actual_fee` is the amount charged.
    async fn notify_return(&self, rental: &Rental) -> AppResult<()>;

    /// A vehicle was grounded by a critical issue.
    async fn notify_critical_maintenance(
        &self,
        vehicle: &Vehicle,
        issue: &MaintenanceIssue,
    ) -> AppResult<()>;

    /// An active rental ends soon.
    async fn notify_due_soon(&self, rental: &Rental) -> AppResult<()>;

    /// An active rental is past its end date.
    async fn notify_overdue(&self, rental: &Rental) -> AppResult<()>;
}

/// Source of "today".
pub trait Clock: Send + Sync {
    /// The current calendar day.
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one day, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
