//! Operating-window and slot-grid validation for reservation starts.
//!
//! The venue takes bookings from 12:00 until 02:00 the following morning,
//! on a 15-minute grid: 56 valid start times per trading day. Early-morning
//! slots (00:00 through 01:45) belong to their own calendar date; the
//! window check simply admits both the evening and the small-hours range.

use super::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

/// Minutes between adjacent start slots.
pub const SLOT_MINUTES: u32 = 15;

/// Number of valid start slots in one trading day.
pub const SLOT_COUNT: usize = 56;

/// First bookable time of the trading day (12:00).
#[must_use]
pub fn window_open() -> NaiveTime {
    NaiveTime::MIN + TimeDelta::hours(12)
}

/// End of the bookable window (02:00, exclusive).
#[must_use]
pub fn window_close() -> NaiveTime {
    NaiveTime::MIN + TimeDelta::hours(2)
}

/// Policy cutoff for indefinite reservations: 06:00 on the day after the
/// reservation's date. An indefinite booking never blocks a table past
/// this mark.
#[must_use]
pub fn indefinite_cutoff() -> NaiveTime {
    NaiveTime::MIN + TimeDelta::hours(6)
}

/// A validated reservation start: a calendar date plus a slot-aligned local
/// time inside the operating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StartSlot {
    date: NaiveDate,
    time: NaiveTime,
}

impl StartSlot {
    /// Validates a date and local time as a reservation start.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MisalignedSlot`] when the time is not on
    /// a 15-minute boundary, or [`ValidationError::OutsideOperatingWindow`]
    /// when it falls in the closed 02:00-12:00 gap.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Result<Self, ValidationError> {
        if time.minute().rem_euclid(SLOT_MINUTES) != 0 || time.second() != 0 || time.nanosecond() != 0
        {
            return Err(ValidationError::MisalignedSlot(time));
        }
        if time < window_open() && time >= window_close() {
            return Err(ValidationError::OutsideOperatingWindow(time));
        }
        Ok(Self { date, time })
    }

    /// Returns the calendar date of the start.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.date
    }

    /// Returns the local start time.
    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.time
    }

    /// Returns the start as a single local instant.
    #[must_use]
    pub const fn instant(self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Enumerates the valid start times of one trading day, from 12:00 through
/// 01:45 the next morning (wrapping past midnight).
#[must_use]
pub fn slot_times() -> Vec<NaiveTime> {
    let step = TimeDelta::minutes(i64::from(SLOT_MINUTES));
    let mut times = Vec::with_capacity(SLOT_COUNT);
    let mut cursor = window_open();
    for _ in 0..SLOT_COUNT {
        times.push(cursor);
        cursor += step;
    }
    times
}
