//! Property-based tests for AvailabilityEngine.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use fleetrent_shared::types::{RentalId, VehicleId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::policy::RentalPolicy;
use crate::pricing::{DiscountTiers, PricingTerms};
use crate::rental::RentalStatus;
use crate::vehicle::availability::AvailabilityEngine;
use crate::vehicle::schedule::{Booking, DateRange, ScheduleStore};
use crate::vehicle::types::{Vehicle, VehicleStatus};

fn empty_vehicle() -> Vehicle {
    Vehicle {
        id: VehicleId::new(),
        make: "Fiat".into(),
        model: "Panda".into(),
        plate: "P 1".into(),
        pricing: PricingTerms {
            base_price: Decimal::ONE_HUNDRED,
            insurance_rate: Decimal::ZERO,
            discounts: DiscountTiers::new(),
        },
        status: VehicleStatus::Available,
        schedule: ScheduleStore::new(),
        issues: Vec::new(),
    }
}

fn arb_request() -> impl Strategy<Value = DateRange> {
    (0u64..120, 0u64..10).prop_map(|(offset, len)| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap();
        DateRange::new(start, start.checked_add_days(Days::new(len)).unwrap()).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Accepted bookings by distinct renters keep the buffer between them.
    ///
    /// Widening either booking by the buffer never reaches the other's raw
    /// days, so at least `buffer_days` free days separate any two bookings.
    #[test]
    fn prop_no_double_booking(requests in proptest::collection::vec(arb_request(), 1..30)) {
        let policy = RentalPolicy::default();
        let engine = AvailabilityEngine::new(&policy);
        let mut vehicle = empty_vehicle();
        let mut statuses: HashMap<RentalId, RentalStatus> = HashMap::new();

        for (i, range) in requests.into_iter().enumerate() {
            let renter = format!("renter-{i}");
            let accepted = engine
                .can_book(&vehicle, range, &renter, |id| statuses.get(&id).copied())
                .is_ok();
            if accepted {
                let rental_id = RentalId::new();
                statuses.insert(rental_id, RentalStatus::Pending);
                AvailabilityEngine::reserve(
                    &mut vehicle,
                    Booking { rental_id, renter, range },
                );
            }
        }

        let bookings: Vec<&Booking> = vehicle.schedule.iter().collect();
        for (i, a) in bookings.iter().enumerate() {
            for b in bookings.iter().skip(i + 1) {
                prop_assert!(!a.range.widened(policy.buffer_days).overlaps(&b.range));
                prop_assert!(!b.range.widened(policy.buffer_days).overlaps(&a.range));
                let (first, second) = if a.range.start <= b.range.start { (a, b) } else { (b, a) };
                let free_days = (second.range.start - first.range.end).num_days() - 1;
                prop_assert!(free_days >= i64::from(policy.buffer_days));
            }
        }
    }

    /// Releasing the same range twice leaves the schedule as after one release.
    #[test]
    fn prop_release_is_idempotent(range in arb_request()) {
        let mut vehicle = empty_vehicle();
        let rental_id = RentalId::new();
        AvailabilityEngine::reserve(
            &mut vehicle,
            Booking { rental_id, renter: "alice".into(), range },
        );

        prop_assert!(AvailabilityEngine::release(&mut vehicle, rental_id, range));
        let after_first = vehicle.schedule.clone();
        prop_assert!(!AvailabilityEngine::release(&mut vehicle, rental_id, range));
        prop_assert_eq!(vehicle.schedule, after_first);
    }
}
