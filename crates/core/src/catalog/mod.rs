//! The rental catalog aggregate.
//!
//! # Modules
//!
//! - `types` - Catalog inputs, transition results and the persisted snapshot
//! - `aggregate` - RentalCatalog, owning vehicles, rentals and tickets

pub mod aggregate;
pub mod types;


pub use aggregate::RentalCatalog;
pub use types::{CatalogSnapshot, CreateRental, Transition, VehicleUpdate};
