//! Rental fee calculation.
//!
//! Fees are `Decimal` end to end. A rental is billed per inclusive day with
//! at most one long-term discount tier, and insurance is a surcharge on the
//! discounted amount.

pub mod error;
pub mod fee;

#[cfg(test)]
mod fee_props;

pub use error::PricingError;
pub use fee::{DiscountTiers, FeeBreakdown, FeeCalculator, PricingTerms, round_money};
