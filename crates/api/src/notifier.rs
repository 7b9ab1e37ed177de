//! Notifier that writes customer and staff notices to the log.

use fleetrent_core::Rental;
use fleetrent_core::ports::Notifier;
use fleetrent_core::ticket::Ticket;
use fleetrent_core::vehicle::{MaintenanceIssue, Vehicle};
use fleetrent_shared::AppResult;
use tracing::{info, warn};

/// Reports every notification as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn notify_approval(&self, rental: &Rental, ticket: &Ticket) -> AppResult<()> {
        info!(
            rental_id = %rental.id,
            to = %rental.customer.email,
            ticket = %ticket.code,
            vehicle = %ticket.vehicle_label,
            plate = %ticket.plate,
            start = %ticket.start_date,
            end = %ticket.end_date,
            total_fee = %ticket.total_fee,
            "Rental approved, ticket sent"
        );
        Ok(())
    }

    async fn notify_rejection(&self, rental: &Rental, reason: &str) -> AppResult<()> {
        info!(
            rental_id = %rental.id,
            to = %rental.customer.email,
            reason,
            "Rental request cancelled"
        );
        Ok(())
    }

    async fn notify_return(&self, rental: &Rental) -> AppResult<()> {
        info!(
            rental_id = %rental.id,
            to = %rental.customer.email,
            actual_fee = %rental.actual_fee,
            "Return receipt sent"
        );
        Ok(())
    }

    async fn notify_critical_maintenance(
        &self,
        vehicle: &Vehicle,
        issue: &MaintenanceIssue,
    ) -> AppResult<()> {
        warn!(
            vehicle_id = %vehicle.id,
            plate = %vehicle.plate,
            issue_id = %issue.id,
            severity = issue.severity,
            description = %issue.description,
            "Vehicle grounded for maintenance"
        );
        Ok(())
    }

    async fn notify_due_soon(&self, rental: &Rental) -> AppResult<()> {
        info!(
            rental_id = %rental.id,
            to = %rental.customer.email,
            end = %rental.end_date,
            "Due-soon reminder sent"
        );
        Ok(())
    }

    async fn notify_overdue(&self, rental: &Rental) -> AppResult<()> {
        warn!(
            rental_id = %rental.id,
            to = %rental.customer.email,
            end = %rental.end_date,
            "Overdue reminder sent"
        );
        Ok(())
    }
}
