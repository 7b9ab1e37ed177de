//! Core rental logic for Fleetrent.
//!
//! This crate contains the booking engine, fee calculator and rental
//! lifecycle with ZERO web or database dependencies. Persistence and
//! notification are reached only through the traits in [`ports`].
//!
//! # Modules
//!
//! - `vehicle` - Vehicles, maintenance log, schedules and availability
//! - `pricing` - Discount tiers and fee calculation
//! - `rental` - Rental records and the lifecycle state machine
//! - `ticket` - One-shot pickup tickets
//! - `catalog` - The aggregate owning vehicles, rentals and tickets
//! - `events` - Domain events emitted by catalog transitions
//! - `ports` - Persistence, notification and clock contracts
//! - `service` - Serialized access to the catalog plus side-effect dispatch

pub mod catalog;
pub mod events;
pub mod policy;
pub mod ports;
pub mod pricing;
pub mod rental;
pub mod service;
pub mod ticket;
pub mod vehicle;

pub use catalog::{CatalogSnapshot, CreateRental, RentalCatalog, Transition, VehicleUpdate};
pub use events::DomainEvent;
pub use policy::RentalPolicy;
pub use rental::{Rental, RentalError, RentalStatus};
pub use service::RentalService;
