//! Availability checks and cross-day resolution.
//!
//! A reservation booked the previous evening can still occupy a table on
//! the queried date, so every consumer — floor display and availability
//! checks alike — goes through [`AvailabilityService::reservations_for_date`]
//! and the two can never diverge.
//!
//! The availability check here is a best-effort hint for the UI; the
//! repository's overlap constraint remains the authority at write time.

use crate::reservation::{
    domain::{
        Interval, Reservation, ReservationDuration, ReservationId, StartSlot, StatusFilter,
        TableId, ValidationError,
    },
    ports::{ReservationRepository, ReservationRepositoryError},
};
use chrono::{Days, NaiveDate, NaiveTime};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for availability queries.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// The candidate start is not a valid slot.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ReservationRepositoryError),
}

/// Result type for availability service operations.
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;

/// Reservations occupying one calendar date, split by booking date.
#[derive(Debug, Clone, Default)]
pub struct DateReservations {
    /// Reservations dated on the queried date itself.
    pub same_day: Vec<Reservation>,
    /// Previous-day reservations whose interval still reaches the queried
    /// date.
    pub previous_day: Vec<Reservation>,
}

impl DateReservations {
    /// Iterates same-day reservations first, then previous-day carryovers.
    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.same_day.iter().chain(self.previous_day.iter())
    }

    /// Consumes the split into a single combined list.
    #[must_use]
    pub fn into_all(mut self) -> Vec<Reservation> {
        self.same_day.append(&mut self.previous_day);
        self.same_day
    }

    /// Total number of reservations across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.same_day.len() + self.previous_day.len()
    }

    /// Returns `true` when no reservation touches the date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.same_day.is_empty() && self.previous_day.is_empty()
    }
}

/// Availability and cross-day resolution service.
#[derive(Clone)]
pub struct AvailabilityService<R>
where
    R: ReservationRepository,
{
    repository: Arc<R>,
}

impl<R> AvailabilityService<R>
where
    R: ReservationRepository,
{
    /// Creates a new availability service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolves every reservation occupying `date`, including carryovers
    /// booked the previous day whose computed interval crosses midnight.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::Repository`] when a listing query
    /// fails.
    pub async fn reservations_for_date(
        &self,
        date: NaiveDate,
        filter: StatusFilter,
    ) -> AvailabilityResult<DateReservations> {
        let same_day = self.repository.list_for_date(date, filter).await?;

        let previous_day = match date.checked_sub_days(Days::new(1)) {
            Some(previous_date) => self
                .repository
                .list_for_date(previous_date, filter)
                .await?
                .into_iter()
                .filter(|reservation| {
                    let interval = reservation.interval();
                    interval.crosses_midnight() && interval.touches_date(date)
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(DateReservations {
            same_day,
            previous_day,
        })
    }

    /// Tests whether a candidate booking would fit on a table.
    ///
    /// `exclude` skips one reservation, used when re-checking an edit
    /// against everything but itself. Only active reservations gate.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::Validation`] when the candidate start
    /// is not a valid slot, or [`AvailabilityError::Repository`] when a
    /// listing query fails.
    pub async fn check_availability(
        &self,
        table_id: TableId,
        date: NaiveDate,
        time: NaiveTime,
        duration: ReservationDuration,
        exclude: Option<ReservationId>,
    ) -> AvailabilityResult<bool> {
        let slot = StartSlot::new(date, time)?;
        let candidate = Interval::compute(slot, duration);

        let occupying = self
            .reservations_for_date(date, StatusFilter::active())
            .await?;
        let conflict = occupying.iter().any(|existing| {
            existing.table_id() == table_id
                && exclude != Some(existing.id())
                && existing.interval().overlaps(candidate)
        });
        Ok(!conflict)
    }
}
