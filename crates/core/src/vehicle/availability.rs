//! Booking availability engine.
//!
//! Decides whether a vehicle can take a date range, given its schedule,
//! status and maintenance log. Ordinary requests keep a turnaround buffer
//! around every live booking; extensions by the same renter skip the buffer
//! and only collide with other renters' days.

use fleetrent_shared::types::{RentalId, VehicleId};
use serde::Serialize;
use std::fmt;

use crate::policy::RentalPolicy;
use crate::rental::RentalStatus;
use crate::vehicle::schedule::{Booking, DateRange};
use crate::vehicle::types::{Vehicle, VehicleStatus};

/// Why a request cannot be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingConflict {
    /// The vehicle is grounded or withdrawn.
    VehicleUnavailable {
        /// The vehicle.
        vehicle_id: VehicleId,
        /// Its status at check time.
        status: VehicleStatus,
        /// An unresolved critical issue exists.
        critical_issue: bool,
    },
    /// The request intersects another booking's window.
    Overlap {
        /// Rental owning the blocking booking.
        rental_id: RentalId,
        /// That rental's status.
        status: RentalStatus,
        /// That rental's renter.
        renter: String,
        /// Days actually booked.
        booked: DateRange,
        /// Blocked window (booked days plus buffer, when applied).
        window: DateRange,
    },
}

impl fmt::Display for BookingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VehicleUnavailable {
                vehicle_id,
                status,
                critical_issue,
            } => {
                if *critical_issue {
                    write!(
                        f,
                        "vehicle {vehicle_id} has an unresolved critical maintenance issue"
                    )
                } else {
                    write!(f, "vehicle {vehicle_id} is {status}")
                }
            }
            Self::Overlap {
                rental_id,
                status,
                renter,
                booked,
                window,
            } => write!(
                f,
                "rental {rental_id} ({status}) by {renter} books {booked}, blocking {window}"
            ),
        }
    }
}

/// Availability rules for one catalog.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityEngine {
    buffer_days: u32,
    critical_severity: u8,
}

impl AvailabilityEngine {
    /// Creates an engine from the booking policy.
    #[must_use]
    pub fn new(policy: &RentalPolicy) -> Self {
        Self {
            buffer_days: policy.buffer_days,
            critical_severity: policy.critical_severity,
        }
    }

    /// Checks whether `user` may book `range` on `vehicle`.
    ///
    /// `owner_status` resolves the status of the rental owning a booking;
    /// bookings whose rental is unknown or no longer live are ignored.
    /// The request is treated as an extension when `user` already holds a
    /// live booking touching `range`.
    pub fn can_book<F>(
        &self,
        vehicle: &Vehicle,
        range: DateRange,
        user: &str,
        owner_status: F,
    ) -> Result<(), BookingConflict>
    where
        F: Fn(RentalId) -> Option<RentalStatus>,
    {
        let extension = self.is_extension(vehicle, range, user, &owner_status);
        self.check(vehicle, range, user, extension, &owner_status)
    }

    /// Checks `range` with extension semantics regardless of adjacency.
    pub fn can_extend<F>(
        &self,
        vehicle: &Vehicle,
        range: DateRange,
        user: &str,
        owner_status: F,
    ) -> Result<(), BookingConflict>
    where
        F: Fn(RentalId) -> Option<RentalStatus>,
    {
        self.check(vehicle, range, user, true, &owner_status)
    }

    /// True when `user` holds a live booking adjacent to or overlapping `range`.
    pub fn is_extension<F>(
        &self,
        vehicle: &Vehicle,
        range: DateRange,
        user: &str,
        owner_status: &F,
    ) -> bool
    where
        F: Fn(RentalId) -> Option<RentalStatus>,
    {
        vehicle.schedule.iter().any(|b| {
            b.renter == user
                && b.range.touches(&range)
                && owner_status(b.rental_id).is_some_and(|s| s.is_live())
        })
    }

    /// Appends a booking. Callers must have checked availability first.
    pub fn reserve(vehicle: &mut Vehicle, booking: Booking) {
        vehicle.schedule.insert(booking);
    }

    /// Drops the booking of `rental_id` on exactly `range`; absent bookings are a no-op.
    pub fn release(vehicle: &mut Vehicle, rental_id: RentalId, range: DateRange) -> bool {
        vehicle.schedule.remove(rental_id, range).is_some()
    }

    fn check<F>(
        &self,
        vehicle: &Vehicle,
        range: DateRange,
        user: &str,
        extension: bool,
        owner_status: &F,
    ) -> Result<(), BookingConflict>
    where
        F: Fn(RentalId) -> Option<RentalStatus>,
    {
        let critical_issue = vehicle.has_critical_issue(self.critical_severity);
        if !vehicle.status.accepts_bookings() || critical_issue {
            return Err(BookingConflict::VehicleUnavailable {
                vehicle_id: vehicle.id,
                status: vehicle.status,
                critical_issue,
            });
        }

        for booking in vehicle.schedule.iter() {
            let Some(status) = owner_status(booking.rental_id).filter(RentalStatus::is_live)
            else {
                continue;
            };

            let window = if extension {
                if booking.renter == user {
                    // own booking: merged, not a conflict
                    continue;
                }
                booking.range
            } else {
                booking.range.widened(self.buffer_days)
            };

            if window.overlaps(&range) {
                return Err(BookingConflict::Overlap {
                    rental_id: booking.rental_id,
                    status,
                    renter: booking.renter.clone(),
                    booked: booking.range,
                    window,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{DiscountTiers, PricingTerms};
    use crate::vehicle::schedule::ScheduleStore;
    use crate::vehicle::types::NewIssue;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn vehicle() -> Vehicle {
        Vehicle {
            id: VehicleId::new(),
            make: "Honda".into(),
            model: "Jazz".into(),
            plate: "D 42 AB".into(),
            pricing: PricingTerms {
                base_price: dec!(100),
                insurance_rate: dec!(0.1),
                discounts: DiscountTiers::new(),
            },
            status: VehicleStatus::Available,
            schedule: ScheduleStore::new(),
            issues: Vec::new(),
        }
    }

    struct Fixture {
        vehicle: Vehicle,
        statuses: HashMap<RentalId, RentalStatus>,
        engine: AvailabilityEngine,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                vehicle: vehicle(),
                statuses: HashMap::new(),
                engine: AvailabilityEngine::new(&RentalPolicy::default()),
            }
        }

        fn book(&mut self, renter: &str, r: DateRange, status: RentalStatus) -> RentalId {
            let rental_id = RentalId::new();
            self.statuses.insert(rental_id, status);
            AvailabilityEngine::reserve(
                &mut self.vehicle,
                Booking {
                    rental_id,
                    renter: renter.into(),
                    range: r,
                },
            );
            rental_id
        }

        fn can_book(&self, r: DateRange, user: &str) -> Result<(), BookingConflict> {
            self.engine
                .can_book(&self.vehicle, r, user, |id| self.statuses.get(&id).copied())
        }
    }

    #[test]
    fn test_empty_schedule_accepts() {
        let f = Fixture::new();
        assert!(f.can_book(range(1, 5), "bob").is_ok());
    }

    #[test]
    fn test_buffer_blocks_other_renter() {
        let mut f = Fixture::new();
        let owner = f.book("alice", range(1, 5), RentalStatus::Active);

        let conflict = f.can_book(range(6, 8), "bob").unwrap_err();
        match conflict {
            BookingConflict::Overlap {
                rental_id,
                status,
                renter,
                window,
                ..
            } => {
                assert_eq!(rental_id, owner);
                assert_eq!(status, RentalStatus::Active);
                assert_eq!(renter, "alice");
                assert_eq!(window.end, date(7));
            }
            other @ BookingConflict::VehicleUnavailable { .. } => {
                panic!("unexpected conflict {other:?}")
            }
        }
    }

    #[test]
    fn test_buffer_clears_after_two_days() {
        let mut f = Fixture::new();
        f.book("alice", range(5, 10), RentalStatus::Pending);
        assert!(f.can_book(range(13, 15), "bob").is_ok());
        assert!(f.can_book(range(1, 2), "bob").is_ok());
        assert!(f.can_book(range(1, 3), "bob").is_err());
        assert!(f.can_book(range(12, 15), "bob").is_err());
    }

    #[test]
    fn test_same_renter_extension_skips_buffer() {
        let mut f = Fixture::new();
        f.book("alice", range(1, 5), RentalStatus::Active);
        assert!(f.can_book(range(6, 8), "alice").is_ok());
        assert!(f.can_book(range(3, 8), "alice").is_ok());
    }

    #[test]
    fn test_extension_still_blocked_by_other_renters_days() {
        let mut f = Fixture::new();
        f.book("alice", range(1, 5), RentalStatus::Active);
        f.book("bob", range(10, 12), RentalStatus::Pending);

        // touching bob's buffer is fine for an extension, his days are not
        assert!(f.can_book(range(6, 9), "alice").is_ok());
        assert!(matches!(
            f.can_book(range(6, 10), "alice"),
            Err(BookingConflict::Overlap { .. })
        ));
    }

    #[test]
    fn test_non_adjacent_own_booking_keeps_buffer() {
        let mut f = Fixture::new();
        f.book("alice", range(1, 5), RentalStatus::Active);
        assert!(f.can_book(range(7, 9), "alice").is_err());
    }

    #[test]
    fn test_finished_rentals_do_not_block() {
        let mut f = Fixture::new();
        f.book("alice", range(1, 5), RentalStatus::Returned);
        f.book("carol", range(6, 9), RentalStatus::Cancelled);
        assert!(f.can_book(range(4, 7), "bob").is_ok());
    }

    #[test]
    fn test_grounded_vehicle_rejects() {
        let mut f = Fixture::new();
        f.vehicle.status = VehicleStatus::OutOfService;
        assert!(matches!(
            f.can_book(range(1, 2), "bob"),
            Err(BookingConflict::VehicleUnavailable {
                critical_issue: false,
                ..
            })
        ));
    }

    #[test]
    fn test_critical_issue_rejects_even_when_available() {
        let mut f = Fixture::new();
        f.vehicle
            .add_issue(
                NewIssue {
                    kind: "damage".into(),
                    description: "brakes failing".into(),
                    reported_by: "mechanic".into(),
                    severity: 5,
                },
                date(1),
            )
            .unwrap();
        let err = f.can_book(range(3, 4), "bob").unwrap_err();
        assert!(err.to_string().contains("critical maintenance issue"));
    }

    #[test]
    fn test_can_extend_forces_extension_semantics() {
        let mut f = Fixture::new();
        f.book("bob", range(10, 12), RentalStatus::Pending);
        let r = range(1, 8);
        assert!(f.can_book(r, "alice").is_err());
        assert!(
            f.engine
                .can_extend(&f.vehicle, r, "alice", |id| f.statuses.get(&id).copied())
                .is_ok()
        );
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut f = Fixture::new();
        let id = f.book("alice", range(1, 5), RentalStatus::Active);
        assert!(AvailabilityEngine::release(&mut f.vehicle, id, range(1, 5)));
        assert!(!AvailabilityEngine::release(&mut f.vehicle, id, range(1, 5)));
        assert!(f.vehicle.schedule.is_empty());
    }

    #[test]
    fn test_conflict_description_names_window() {
        let mut f = Fixture::new();
        f.book("alice", range(10, 12), RentalStatus::Pending);
        let text = f.can_book(range(13, 14), "bob").unwrap_err().to_string();
        assert!(text.contains("PENDING"));
        assert!(text.contains("alice"));
        assert!(text.contains("2024-01-08..2024-01-14"));
    }
}
