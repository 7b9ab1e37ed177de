//! Fee calculator and pricing terms.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pricing::error::PricingError;
use crate::vehicle::schedule::DateRange;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use fleetrent_core::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Long-term discounts keyed by minimum rental length in days.
///
/// Thresholds are unique by construction; inserting an existing threshold
/// replaces its discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountTiers(BTreeMap<u32, Decimal>);

impl DiscountTiers {
    /// Creates an empty tier table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tier table from `(threshold, discount)` pairs.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (u32, Decimal)>,
    ) -> Result<Self, PricingError> {
        let mut tiers = Self::new();
        for (threshold, discount) in pairs {
            tiers.insert(threshold, discount)?;
        }
        Ok(tiers)
    }

    /// Adds or replaces a tier.
    pub fn insert(&mut self, threshold: u32, discount: Decimal) -> Result<(), PricingError> {
        if threshold == 0 {
            return Err(PricingError::ZeroThreshold);
        }
        if discount < Decimal::ZERO || discount > Decimal::ONE {
            return Err(PricingError::DiscountOutOfRange {
                threshold,
                discount,
            });
        }
        self.0.insert(threshold, discount);
        Ok(())
    }

    /// The largest discount among tiers whose threshold `days` reaches.
    ///
    /// Tiers never stack: a 7-day rental with `{3: 0.10, 7: 0.20}` gets 0.20.
    #[must_use]
    pub fn best_for(&self, days: i64) -> Decimal {
        self.0
            .iter()
            .filter(|(threshold, _)| i64::from(**threshold) <= days)
            .map(|(_, discount)| *discount)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Iterates tiers by ascending threshold.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.0.iter().map(|(t, d)| (*t, *d))
    }

    /// True when no tier is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<(), PricingError> {
        for (threshold, discount) in self.iter() {
            if threshold == 0 {
                return Err(PricingError::ZeroThreshold);
            }
            if discount < Decimal::ZERO || discount > Decimal::ONE {
                return Err(PricingError::DiscountOutOfRange {
                    threshold,
                    discount,
                });
            }
        }
        Ok(())
    }
}

/// Price list of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTerms {
    /// Price per day before discounts.
    pub base_price: Decimal,
    /// Insurance surcharge as a fraction of the discounted fee.
    pub insurance_rate: Decimal,
    /// Long-term discount tiers.
    #[serde(default)]
    pub discounts: DiscountTiers,
}

impl PricingTerms {
    /// Checks base price, insurance rate and every tier.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.base_price <= Decimal::ZERO {
            return Err(PricingError::NonPositiveBasePrice(self.base_price));
        }
        if self.insurance_rate < Decimal::ZERO {
            return Err(PricingError::NegativeInsuranceRate(self.insurance_rate));
        }
        self.discounts.validate()
    }
}

/// Line items of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    /// Billed days, inclusive.
    pub days: i64,
    /// Applied discount fraction.
    pub discount: Decimal,
    /// `base_price * days * (1 - discount)`.
    pub subtotal: Decimal,
    /// Insurance surcharge on the subtotal (zero when not selected).
    pub insurance: Decimal,
    /// Rounded total.
    pub total: Decimal,
}

/// Stateless fee calculator.
pub struct FeeCalculator;

impl FeeCalculator {
    /// Itemized fee for `range`.
    ///
    /// Fails with [`PricingError::Overflow`] when the amount does not fit a
    /// `Decimal`.
    pub fn breakdown(
        terms: &PricingTerms,
        range: DateRange,
        insurance: bool,
    ) -> Result<FeeBreakdown, PricingError> {
        let days = range.days();
        let discount = terms.discounts.best_for(days);
        let subtotal = terms
            .base_price
            .checked_mul(Decimal::from(days))
            .and_then(|gross| gross.checked_mul(Decimal::ONE - discount))
            .ok_or(PricingError::Overflow)?;
        let surcharge = if insurance {
            subtotal
                .checked_mul(terms.insurance_rate)
                .ok_or(PricingError::Overflow)?
        } else {
            Decimal::ZERO
        };
        let total = subtotal
            .checked_add(surcharge)
            .ok_or(PricingError::Overflow)?;

        Ok(FeeBreakdown {
            days,
            discount,
            subtotal,
            insurance: surcharge,
            total: round_money(total, 2),
        })
    }

    /// Estimated fee for booking `range`.
    pub fn estimate(
        terms: &PricingTerms,
        range: DateRange,
        insurance: bool,
    ) -> Result<Decimal, PricingError> {
        Ok(Self::breakdown(terms, range, insurance)?.total)
    }

    /// Fee charged at return.
    ///
    /// Late returns are billed through `returned_on`; early returns still pay
    /// the agreed period.
    pub fn actual_fee(
        terms: &PricingTerms,
        agreed: DateRange,
        returned_on: NaiveDate,
        insurance: bool,
    ) -> Result<Decimal, PricingError> {
        Self::estimate(terms, agreed.through(returned_on), insurance)
    }
}
