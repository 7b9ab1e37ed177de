//! Property-based tests for FeeCalculator.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::pricing::fee::{DiscountTiers, FeeCalculator, PricingTerms};
use crate::vehicle::schedule::DateRange;

fn arb_terms() -> impl Strategy<Value = PricingTerms> {
    (
        1i64..100_000,
        0i64..=100,
        proptest::collection::btree_map(1u32..60, 0i64..=100, 0..5),
    )
        .prop_map(|(base_cents, rate_pct, tiers)| PricingTerms {
            base_price: Decimal::new(base_cents, 2),
            insurance_rate: Decimal::new(rate_pct, 2),
            discounts: DiscountTiers::from_pairs(
                tiers.into_iter().map(|(t, pct)| (t, Decimal::new(pct, 2))),
            )
            .unwrap(),
        })
}

fn arb_range() -> impl Strategy<Value = DateRange> {
    (0u64..3650, 0u64..90).prop_map(|(offset, len)| {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let start = base.checked_add_days(Days::new(offset)).unwrap();
        let end = start.checked_add_days(Days::new(len)).unwrap();
        DateRange::new(start, end).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Insurance never makes a rental cheaper.
    #[test]
    fn prop_insurance_is_monotone(terms in arb_terms(), range in arb_range()) {
        let with = FeeCalculator::estimate(&terms, range, true).unwrap();
        let without = FeeCalculator::estimate(&terms, range, false).unwrap();
        prop_assert!(with >= without);
    }

    /// The applied discount is exactly one qualifying tier (or none).
    #[test]
    fn prop_discount_is_a_single_tier(terms in arb_terms(), days in 1i64..120) {
        let applied = terms.discounts.best_for(days);
        let qualifying: Vec<Decimal> = terms
            .discounts
            .iter()
            .filter(|(t, _)| i64::from(*t) <= days)
            .map(|(_, d)| d)
            .collect();

        if qualifying.is_empty() {
            prop_assert_eq!(applied, Decimal::ZERO);
        } else {
            prop_assert!(qualifying.contains(&applied));
            prop_assert!(qualifying.iter().all(|d| *d <= applied));
        }
    }

    /// Late returns are billed through the return day; early returns never refund.
    #[test]
    fn prop_actual_fee_bills_through_return_day(
        terms in arb_terms(),
        range in arb_range(),
        shift in -30i64..30,
        insurance in any::<bool>(),
    ) {
        let returned_on = if shift >= 0 {
            range.end.checked_add_days(Days::new(shift.unsigned_abs())).unwrap()
        } else {
            range.end.checked_sub_days(Days::new(shift.unsigned_abs())).unwrap()
        };
        let estimate = FeeCalculator::estimate(&terms, range, insurance).unwrap();
        let actual = FeeCalculator::actual_fee(&terms, range, returned_on, insurance).unwrap();

        if shift <= 0 {
            prop_assert_eq!(actual, estimate);
        } else {
            let billed = FeeCalculator::breakdown(&terms, range.through(returned_on), insurance).unwrap();
            prop_assert_eq!(billed.days, range.days() + shift);
            prop_assert_eq!(actual, billed.total);
        }
    }
}
