//! Error types for reservation domain validation and state transitions.

use super::ReservationId;
use chrono::{NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Errors returned while validating booking input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// The start time is not aligned to a 15-minute slot boundary.
    #[error("start time {0} is not on a 15-minute slot boundary")]
    MisalignedSlot(NaiveTime),

    /// The start time falls outside the 12:00-02:00 operating window.
    #[error("start time {0} is outside the operating window (12:00-02:00)")]
    OutsideOperatingWindow(NaiveTime),

    /// The finite duration is zero.
    #[error("duration must be at least 0.1 hours")]
    ZeroDuration,

    /// The finite duration exceeds the booking maximum.
    #[error("duration {0} exceeds the 12-hour booking maximum")]
    DurationTooLong(super::ReservationDuration),

    /// The reservation would start in the past.
    #[error("reservation start {requested} is before the current time {now}")]
    PastStart {
        /// Requested start instant.
        requested: NaiveDateTime,
        /// Current wall-clock instant.
        now: NaiveDateTime,
    },

    /// The party does not fit the requested table.
    #[error("party of {party_size} exceeds table capacity {capacity}")]
    PartyExceedsCapacity {
        /// Requested party size.
        party_size: u16,
        /// Seating capacity of the requested table.
        capacity: u16,
    },

    /// The party size is zero.
    #[error("party size must be at least 1")]
    EmptyParty,

    /// The guest name is empty after trimming.
    #[error("guest name must not be empty")]
    EmptyGuestName,
}

/// Errors returned when a lifecycle transition is not permitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReservationStateError {
    /// The reservation is in a terminal status and cannot be mutated.
    #[error("reservation {id} is {status} and can no longer be modified")]
    Terminal {
        /// Identifier of the reservation.
        id: ReservationId,
        /// Current terminal status.
        status: super::ReservationStatus,
    },

    /// An indefinite reservation cannot be completed before it starts.
    #[error("reservation {0} has not started yet and cannot be completed")]
    NotYetStarted(ReservationId),
}

/// Error returned while parsing reservation statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown reservation status: {0}")]
pub struct ParseReservationStatusError(pub String);

/// Error returned while parsing activity actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);

/// Error returned while decoding stored duration values.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid stored duration value: {0}")]
pub struct ParseDurationError(pub f64);
