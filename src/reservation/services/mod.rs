//! Application services orchestrating reservation scheduling.

mod availability;
mod booking;
mod sweep;

pub use availability::{AvailabilityError, AvailabilityResult, AvailabilityService, DateReservations};
pub use booking::{
    BookingError, BookingResult, BookingService, CreateReservationRequest, EditReservationRequest,
};
pub use sweep::{AutoCompletionService, SweepError, SweepResult};

use chrono::NaiveDateTime;
use mockable::Clock;

/// Current wall-clock instant in venue-local terms.
///
/// The engine keeps all scheduling arithmetic in naive local time; hosts
/// supply a [`Clock`] aligned with the venue's wall clock.
pub(crate) fn venue_now(clock: &impl Clock) -> NaiveDateTime {
    clock.utc().naive_utc()
}
