//! Half-open occupation intervals, including midnight crossover and the
//! indefinite-reservation cutoff.

use super::slot::indefinite_cutoff;
use super::{ReservationDuration, StartSlot};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// A half-open occupation interval `[start, end)` in venue-local time.
///
/// The end of an indefinite reservation is not a guest commitment but the
/// policy cutoff: 06:00 on the day after the reservation's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Interval {
    /// Computes the occupation interval for a reservation start and
    /// duration.
    ///
    /// Finite durations extend the start directly and may cross midnight.
    /// Indefinite durations substitute the policy cutoff as the end.
    #[must_use]
    pub fn compute(slot: StartSlot, duration: ReservationDuration) -> Self {
        let start = slot.instant();
        let end = duration.as_delta().map_or_else(
            || day_after(slot.date()).and_time(indefinite_cutoff()),
            |delta| start + delta,
        );
        Self { start, end }
    }

    /// Returns the inclusive start instant.
    #[must_use]
    pub const fn start(self) -> NaiveDateTime {
        self.start
    }

    /// Returns the exclusive end instant.
    #[must_use]
    pub const fn end(self) -> NaiveDateTime {
        self.end
    }

    /// Half-open overlap test: touching endpoints do not conflict.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` when the interval extends past the midnight that ends
    /// its starting calendar date.
    #[must_use]
    pub fn crosses_midnight(self) -> bool {
        self.end > day_after(self.start.date()).and_time(NaiveTime::MIN)
    }

    /// Returns `true` when any part of the interval falls on the given
    /// calendar date.
    #[must_use]
    pub fn touches_date(self, date: NaiveDate) -> bool {
        let midnight = date.and_time(NaiveTime::MIN);
        let next_midnight = day_after(date).and_time(NaiveTime::MIN);
        self.end > midnight && self.start < next_midnight
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} .. {})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// The calendar day after `date`, saturating at the calendar maximum.
fn day_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}
