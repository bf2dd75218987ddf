//! Pure scheduling domain: intervals, slots, durations, the reservation
//! aggregate, and the activity audit filter. No infrastructure
//! dependencies.

mod error;
mod ids;
mod interval;
mod reservation;
mod slot;
mod table;

pub mod audit;
pub mod duration;

pub use audit::{
    ActivityAction, ActivityLogEntry, FieldChange, MutationKind, cancellation_entry,
    field_changes, log_entry, snapshot,
};
pub use duration::{
    BOOKING_MAX_TENTHS, INDEFINITE_BILLING_CAP_TENTHS, INDEFINITE_SENTINEL, ReservationDuration,
};
pub use error::{
    ParseActivityActionError, ParseDurationError, ParseReservationStatusError,
    ReservationStateError, ValidationError,
};
pub use ids::{ReservationId, TableId};
pub use interval::Interval;
pub use reservation::{
    NewReservation, PersistedReservationData, Reservation, ReservationChanges, ReservationStatus,
    StatusFilter,
};
pub use slot::{
    SLOT_COUNT, SLOT_MINUTES, StartSlot, indefinite_cutoff, slot_times, window_close, window_open,
};
pub use table::{GuestName, PartySize, Table};
