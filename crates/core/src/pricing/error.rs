//! Pricing error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid pricing terms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Daily base price must be positive.
    #[error("Base price must be positive, got {0}")]
    NonPositiveBasePrice(Decimal),

    /// Insurance rate cannot be negative.
    #[error("Insurance rate cannot be negative, got {0}")]
    NegativeInsuranceRate(Decimal),

    /// Discount thresholds start at one day.
    #[error("Discount threshold must be at least one day")]
    ZeroThreshold,

    /// Discount fraction outside `[0, 1]`.
    #[error("Discount {discount} for {threshold}+ days must be between 0 and 1")]
    DiscountOutOfRange {
        /// Minimum days for the tier.
        threshold: u32,
        /// Offending fraction.
        discount: Decimal,
    },

    /// The fee does not fit a `Decimal`.
    #[error("Fee is too large to compute")]
    Overflow,
}
