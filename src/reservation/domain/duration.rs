//! Reservation duration semantics: finite decimal hours or indefinite.
//!
//! Durations are held as integer tenths of an hour so that the one-decimal
//! precision mandated by the audit log is exact and never subject to
//! floating-point drift. The storage layer exchanges the conventional
//! decimal-hours representation with `-1` as the indefinite sentinel.

use super::{ParseDurationError, ValidationError};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel value persisted for indefinite durations.
pub const INDEFINITE_SENTINEL: f64 = -1.0;

/// Longest duration accepted at booking time, in tenths of an hour.
pub const BOOKING_MAX_TENTHS: u16 = 120;

/// Billing cap applied by the auto-completion sweep to indefinite
/// reservations, in tenths of an hour.
pub const INDEFINITE_BILLING_CAP_TENTHS: u16 = 60;

/// Declared length of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationDuration {
    /// A fixed duration in tenths of an hour, always at least 1 (0.1h).
    Finite(u16),
    /// No declared end; occupation is capped by policy, not by the guest.
    Indefinite,
}

impl ReservationDuration {
    /// Creates a finite duration from tenths of an hour.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDuration`] when `tenths` is zero.
    pub const fn finite(tenths: u16) -> Result<Self, ValidationError> {
        if tenths == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(Self::Finite(tenths))
    }

    /// Derives a finite duration from an elapsed wall-clock span, rounded
    /// half-up to the nearest tenth of an hour and floored at 0.1h.
    ///
    /// Spans longer than `u16` tenths saturate rather than wrap; such spans
    /// are centuries long and cannot arise from reservation arithmetic.
    #[must_use]
    pub fn from_elapsed(elapsed: TimeDelta) -> Self {
        let minutes = elapsed.num_minutes().max(0);
        // One tenth of an hour is six minutes; +3 rounds half-up.
        let tenths = (minutes + 3).div_euclid(6).max(1);
        Self::Finite(u16::try_from(tenths).unwrap_or(u16::MAX))
    }

    /// Validates a duration against the booking-time range of (0, 12] hours.
    ///
    /// The range applies to guest-facing bookings only; a manual completion
    /// may legitimately record a longer elapsed stay.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DurationTooLong`] when a finite duration
    /// exceeds twelve hours.
    pub const fn validate_for_booking(self) -> Result<Self, ValidationError> {
        match self {
            Self::Finite(tenths) if tenths > BOOKING_MAX_TENTHS => {
                Err(ValidationError::DurationTooLong(self))
            }
            _ => Ok(self),
        }
    }

    /// Clamps a finite duration to the indefinite billing cap of six hours.
    #[must_use]
    pub fn capped_for_billing(self) -> Self {
        match self {
            Self::Finite(tenths) => Self::Finite(tenths.clamp(1, INDEFINITE_BILLING_CAP_TENTHS)),
            Self::Indefinite => Self::Indefinite,
        }
    }

    /// Returns `true` for the indefinite variant.
    #[must_use]
    pub const fn is_indefinite(self) -> bool {
        matches!(self, Self::Indefinite)
    }

    /// Returns the finite length as a [`TimeDelta`], or `None` when
    /// indefinite.
    #[must_use]
    pub const fn as_delta(self) -> Option<TimeDelta> {
        match self {
            Self::Finite(tenths) => Some(TimeDelta::minutes(tenths as i64 * 6)),
            Self::Indefinite => None,
        }
    }

    /// Returns the decimal-hours storage representation, with `-1` standing
    /// in for indefinite.
    #[must_use]
    pub fn to_storage(self) -> f64 {
        match self {
            #[expect(
                clippy::float_arithmetic,
                reason = "storage column holds decimal hours"
            )]
            Self::Finite(tenths) => f64::from(tenths) / 10.0,
            Self::Indefinite => INDEFINITE_SENTINEL,
        }
    }

    /// Decodes the decimal-hours storage representation.
    ///
    /// # Errors
    ///
    /// Returns [`ParseDurationError`] when the value is neither the `-1`
    /// sentinel nor a positive number of hours.
    pub fn from_storage(value: f64) -> Result<Self, ParseDurationError> {
        if value == INDEFINITE_SENTINEL {
            return Ok(Self::Indefinite);
        }
        if value <= 0.0 || !value.is_finite() {
            return Err(ParseDurationError(value));
        }
        #[expect(
            clippy::float_arithmetic,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "storage column holds decimal hours; range checked above"
        )]
        let rounded = (value * 10.0).round() as i64;
        let tenths = u16::try_from(rounded).map_err(|_| ParseDurationError(value))?;
        if tenths == 0 {
            return Err(ParseDurationError(value));
        }
        Ok(Self::Finite(tenths))
    }
}

impl fmt::Display for ReservationDuration {
    /// Formats as one-decimal hours, with `-1` for indefinite.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(tenths) => {
                let whole = tenths.div_euclid(10);
                let fraction = tenths.rem_euclid(10);
                write!(f, "{whole}.{fraction}")
            }
            Self::Indefinite => write!(f, "-1"),
        }
    }
}
