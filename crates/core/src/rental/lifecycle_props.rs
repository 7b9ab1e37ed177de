//! Property-based tests for LifecycleService.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use crate::rental::error::RentalError;
use crate::rental::lifecycle::LifecycleService;
use crate::rental::types::RentalStatus;

fn arb_status() -> impl Strategy<Value = RentalStatus> {
    prop_oneof![
        Just(RentalStatus::Pending),
        Just(RentalStatus::Active),
        Just(RentalStatus::Returned),
        Just(RentalStatus::Cancelled),
    ]
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every successful transition is one the state table allows.
    #[test]
    fn prop_successful_transitions_are_valid(
        status in arb_status(),
        date in arb_date(),
        extra in 1u64..30,
    ) {
        let later = date.checked_add_days(Days::new(extra)).unwrap();
        let attempts = [
            LifecycleService::approve(status),
            LifecycleService::cancel(status, "no longer needed".to_string()),
            LifecycleService::return_rental(status, date),
            LifecycleService::extend(status, date, later),
        ];

        for attempt in attempts {
            match attempt {
                Ok(action) => prop_assert!(
                    LifecycleService::is_valid_transition(status, action.new_status())
                ),
                Err(err) => {
                    let is_invalid_state = matches!(err, RentalError::InvalidState { .. });
                    prop_assert!(is_invalid_state);
                }
            }
        }
    }

    /// Terminal statuses reject every operation.
    #[test]
    fn prop_terminal_rejects_everything(date in arb_date()) {
        for status in [RentalStatus::Returned, RentalStatus::Cancelled] {
            prop_assert!(LifecycleService::approve(status).is_err());
            prop_assert!(LifecycleService::cancel(status, "x".to_string()).is_err());
            prop_assert!(LifecycleService::return_rental(status, date).is_err());
            prop_assert!(LifecycleService::extend(status, date, date.succ_opt().unwrap()).is_err());
        }
    }
}
