//! Vehicles, their schedules and booking availability.
//!
//! # Modules
//!
//! - `types` - Vehicle, status and maintenance log types
//! - `schedule` - Date ranges, bookings and the per-vehicle ScheduleStore
//! - `availability` - Buffer and extension rules deciding whether a range can be booked

pub mod availability;
pub mod schedule;
pub mod types;

#[cfg(test)]
mod availability_props;

pub use availability::{AvailabilityEngine, BookingConflict};
pub use schedule::{Booking, DateRange, InvalidDateRange, ScheduleStore};
pub use types::{MaintenanceIssue, NewIssue, NewVehicle, Vehicle, VehicleStatus};
