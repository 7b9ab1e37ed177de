//! Rental records and lifecycle management.
//!
//! # Modules
//!
//! - `types` - Rental domain types (RentalStatus, Rental, LifecycleAction)
//! - `error` - Rental error types shared by every catalog operation
//! - `lifecycle` - Status transition logic

pub mod error;
pub mod lifecycle;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use error::RentalError;
pub use lifecycle::LifecycleService;
pub use types::{CustomerRef, LifecycleAction, Rental, RentalAction, RentalStatus};
