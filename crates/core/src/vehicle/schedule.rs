//! Per-vehicle booking schedule.
//!
//! A schedule is an ordered set of inclusive date ranges, each owned by one
//! pending or active rental.

use chrono::{Days, NaiveDate};
use fleetrent_shared::types::RentalId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// End date earlier than the start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("End date {end} is before start date {start}")]
pub struct InvalidDateRange {
    /// Requested start.
    pub start: NaiveDate,
    /// Requested end.
    pub end: NaiveDate,
}

/// Inclusive `[start, end]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateRange {
    /// First booked day.
    pub start: NaiveDate,
    /// Last booked day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if end < start {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Closed-interval overlap: ranges touching on a single day overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when the ranges overlap or one starts the day after the other ends.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        let self_end = self.end.checked_add_days(Days::new(1)).unwrap_or(self.end);
        let other_end = other.end.checked_add_days(Days::new(1)).unwrap_or(other.end);
        self.start <= other_end && other.start <= self_end
    }

    /// The range grown by `days` on both sides, saturating at the calendar limits.
    #[must_use]
    pub fn widened(&self, days: u32) -> Self {
        let days = Days::new(u64::from(days));
        Self {
            start: self.start.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_add_days(days).unwrap_or(NaiveDate::MAX),
        }
    }

    /// The same start with the end moved to `max(self.end, date)`.
    #[must_use]
    pub fn through(&self, date: NaiveDate) -> Self {
        Self {
            start: self.start,
            end: self.end.max(date),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A reservation of a vehicle for one rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Rental that owns this booking.
    pub rental_id: RentalId,
    /// Username of the renter.
    pub renter: String,
    /// Booked days.
    pub range: DateRange,
}

/// Ordered bookings of a single vehicle, sorted by start then end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleStore {
    bookings: Vec<Booking>,
}

impl ScheduleStore {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a booking keeping the schedule ordered.
    pub fn insert(&mut self, booking: Booking) {
        let at = self
            .bookings
            .partition_point(|b| b.range <= booking.range);
        self.bookings.insert(at, booking);
    }

    /// Removes the booking of `rental_id` covering exactly `range`.
    ///
    /// Returns `None` when nothing matched, so repeated calls are harmless.
    pub fn remove(&mut self, rental_id: RentalId, range: DateRange) -> Option<Booking> {
        let idx = self
            .bookings
            .iter()
            .position(|b| b.rental_id == rental_id && b.range == range)?;
        Some(self.bookings.remove(idx))
    }

    /// Iterates bookings in schedule order.
    pub fn iter(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter()
    }

    /// The booking held by a rental, if any.
    #[must_use]
    pub fn for_rental(&self, rental_id: RentalId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.rental_id == rental_id)
    }

    /// Number of bookings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    /// True when nothing is booked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}
