//! Booking transaction service: create, edit, complete, and cancel.
//!
//! The service validates input and shapes audit entries, but conflict
//! rejection is delegated to the repository's overlap constraint so that
//! concurrent bookings racing on one table are resolved by the storage
//! engine, not by a check-then-act sequence here.

use crate::reservation::{
    domain::{
        self, GuestName, Interval, MutationKind, NewReservation, PartySize, Reservation,
        ReservationChanges, ReservationDuration, ReservationId, ReservationStateError,
        StartSlot, TableId, ValidationError,
    },
    ports::{
        ReservationRepository, ReservationRepositoryError, TableDirectory, TableDirectoryError,
    },
};
use chrono::{NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::venue_now;

/// Retries after the initial attempt before surfacing a conflict, so a
/// booking gets four tries at the overlap constraint in total.
const CONFLICT_RETRY_LIMIT: u32 = 3;

/// Base backoff between conflict retries; multiplied by the retry
/// number.
const CONFLICT_BACKOFF: Duration = Duration::from_millis(100);

/// Request payload for booking a new reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservationRequest {
    table_id: TableId,
    date: NaiveDate,
    time: NaiveTime,
    duration: ReservationDuration,
    guest_name: String,
    guest_phone: Option<String>,
    party_size: u16,
    notes: String,
    created_by: String,
}

impl CreateReservationRequest {
    /// Creates a request with required booking fields.
    #[must_use]
    pub fn new(
        table_id: TableId,
        date: NaiveDate,
        time: NaiveTime,
        duration: ReservationDuration,
        guest_name: impl Into<String>,
        party_size: u16,
    ) -> Self {
        Self {
            table_id,
            date,
            time,
            duration,
            guest_name: guest_name.into(),
            guest_phone: None,
            party_size,
            notes: String::new(),
            created_by: String::new(),
        }
    }

    /// Sets the guest contact number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.guest_phone = Some(phone.into());
        self
    }

    /// Sets free-form staff notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Records the staff member taking the booking.
    #[must_use]
    pub fn booked_by(mut self, staff: impl Into<String>) -> Self {
        self.created_by = staff.into();
        self
    }
}

/// Request payload for editing an active reservation.
///
/// Unset fields are left untouched. Completion is a separate operation,
/// not an edit flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditReservationRequest {
    table_id: Option<TableId>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    duration: Option<ReservationDuration>,
    guest_name: Option<String>,
    guest_phone: Option<Option<String>>,
    party_size: Option<u16>,
    notes: Option<String>,
}

impl EditReservationRequest {
    /// Creates an empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the booking to another table.
    #[must_use]
    pub const fn move_to_table(mut self, table_id: TableId) -> Self {
        self.table_id = Some(table_id);
        self
    }

    /// Changes the reservation date.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Changes the start time.
    #[must_use]
    pub const fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Changes the declared duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: ReservationDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Renames the guest.
    #[must_use]
    pub fn rename_guest(mut self, guest_name: impl Into<String>) -> Self {
        self.guest_name = Some(guest_name.into());
        self
    }

    /// Sets the guest contact number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.guest_phone = Some(Some(phone.into()));
        self
    }

    /// Clears the guest contact number.
    #[must_use]
    pub fn clear_phone(mut self) -> Self {
        self.guest_phone = Some(None);
        self
    }

    /// Changes the party size.
    #[must_use]
    pub const fn with_party_size(mut self, party_size: u16) -> Self {
        self.party_size = Some(party_size);
        self
    }

    /// Replaces the staff notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Service-level errors for booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The reservation is not in a state permitting the operation.
    #[error(transparent)]
    State(#[from] ReservationStateError),

    /// The requested interval is occupied, after exhausting retries.
    #[error("table {table_id} is unavailable over {interval}")]
    TableUnavailable {
        /// Table the booking targeted.
        table_id: TableId,
        /// The blocked interval.
        interval: Interval,
    },

    /// No reservation exists with the given identifier.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// No table exists with the given identifier.
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(ReservationRepositoryError),

    /// Table directory lookup failed.
    #[error(transparent)]
    Directory(#[from] TableDirectoryError),
}

impl BookingError {
    /// Stable machine-readable code for the surrounding API layer.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::State(_) => "STATE_ERROR",
            Self::TableUnavailable { .. } => "TABLE_UNAVAILABLE",
            Self::ReservationNotFound(_) | Self::TableNotFound(_) => "NOT_FOUND",
            Self::Repository(_) | Self::Directory(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type for booking service operations.
pub type BookingResult<T> = Result<T, BookingError>;

/// Maps repository failures into the booking taxonomy.
fn map_repository_error(err: ReservationRepositoryError) -> BookingError {
    match err {
        ReservationRepositoryError::Overlap { table_id, interval } => {
            BookingError::TableUnavailable { table_id, interval }
        }
        ReservationRepositoryError::NotFound(id) => BookingError::ReservationNotFound(id),
        other => BookingError::Repository(other),
    }
}

/// Booking transaction orchestration service.
#[derive(Clone)]
pub struct BookingService<R, D, C>
where
    R: ReservationRepository,
    D: TableDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    tables: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> BookingService<R, D, C>
where
    R: ReservationRepository,
    D: TableDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new booking service.
    #[must_use]
    pub const fn new(repository: Arc<R>, tables: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            tables,
            clock,
        }
    }

    /// Books a new reservation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for malformed input,
    /// [`BookingError::TableNotFound`] for an unknown table, and
    /// [`BookingError::TableUnavailable`] when the interval is occupied
    /// after exhausting conflict retries.
    pub async fn create_reservation(
        &self,
        request: CreateReservationRequest,
    ) -> BookingResult<Reservation> {
        let slot = StartSlot::new(request.date, request.time)?;
        let duration = request.duration.validate_for_booking()?;
        let guest_name = GuestName::new(request.guest_name)?;
        let party_size = PartySize::new(request.party_size)?;

        let table = self
            .tables
            .find_table(request.table_id)
            .await?
            .ok_or(BookingError::TableNotFound(request.table_id))?;
        table.admit(party_size)?;

        let now = venue_now(&*self.clock);
        if slot.instant() < now {
            return Err(ValidationError::PastStart {
                requested: slot.instant(),
                now,
            }
            .into());
        }

        let reservation = Reservation::book(
            NewReservation {
                table_id: request.table_id,
                slot,
                duration,
                guest_name,
                guest_phone: request.guest_phone,
                party_size,
                notes: request.notes,
                created_by: request.created_by,
            },
            &*self.clock,
        );

        self.insert_with_retry(&reservation).await?;
        tracing::info!(
            reservation_id = %reservation.id(),
            table_id = %reservation.table_id(),
            interval = %reservation.interval(),
            "reservation booked"
        );
        Ok(reservation)
    }

    /// Edits fields of an active reservation.
    ///
    /// At most one `updated` audit entry is produced, committed atomically
    /// with the mutation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ReservationNotFound`] for an unknown id,
    /// [`BookingError::State`] when the reservation is terminal,
    /// [`BookingError::Validation`] for malformed changes, and
    /// [`BookingError::TableUnavailable`] when a reschedule lands on an
    /// occupied interval.
    pub async fn edit_reservation(
        &self,
        id: ReservationId,
        request: EditReservationRequest,
    ) -> BookingResult<Reservation> {
        let mut reservation = self.fetch(id).await?;
        let changes = self.validate_changes(&reservation, request).await?;

        let before = reservation.clone();
        reservation.apply_edit(changes, &*self.clock)?;
        let entry = domain::log_entry(&before, &reservation, MutationKind::Edit, &*self.clock);

        self.repository
            .update(&reservation, entry.as_ref())
            .await
            .map_err(map_repository_error)?;
        tracing::info!(reservation_id = %id, "reservation updated");
        Ok(reservation)
    }

    /// Completes an active reservation on explicit staff action.
    ///
    /// Indefinite reservations record their uncapped elapsed stay. The
    /// status/duration pair this produces is excluded from the audit log.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ReservationNotFound`] for an unknown id and
    /// [`BookingError::State`] when the reservation is terminal or has not
    /// started yet.
    pub async fn complete_reservation(&self, id: ReservationId) -> BookingResult<Reservation> {
        let mut reservation = self.fetch(id).await?;
        let before = reservation.clone();
        reservation.complete(venue_now(&*self.clock), &*self.clock)?;
        let entry =
            domain::log_entry(&before, &reservation, MutationKind::Completion, &*self.clock);

        self.repository
            .update(&reservation, entry.as_ref())
            .await
            .map_err(map_repository_error)?;
        tracing::info!(
            reservation_id = %id,
            duration = %reservation.duration(),
            "reservation completed"
        );
        Ok(reservation)
    }

    /// Cancels an active reservation, retaining the row.
    ///
    /// Always produces one `cancelled` audit entry with a full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ReservationNotFound`] for an unknown id and
    /// [`BookingError::State`] when the reservation is terminal.
    pub async fn cancel_reservation(&self, id: ReservationId) -> BookingResult<Reservation> {
        let mut reservation = self.fetch(id).await?;
        let before = reservation.clone();
        reservation.cancel(&*self.clock)?;
        let entry = domain::cancellation_entry(&before, &reservation, &*self.clock);

        self.repository
            .update(&reservation, Some(&entry))
            .await
            .map_err(map_repository_error)?;
        tracing::info!(reservation_id = %id, "reservation cancelled");
        Ok(reservation)
    }

    async fn fetch(&self, id: ReservationId) -> BookingResult<Reservation> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or(BookingError::ReservationNotFound(id))
    }

    /// Validates an edit request against the current reservation state and
    /// converts it into typed field changes.
    async fn validate_changes(
        &self,
        current: &Reservation,
        request: EditReservationRequest,
    ) -> BookingResult<ReservationChanges> {
        let slot = if request.date.is_some() || request.time.is_some() {
            Some(StartSlot::new(
                request.date.unwrap_or_else(|| current.slot().date()),
                request.time.unwrap_or_else(|| current.slot().time()),
            )?)
        } else {
            None
        };
        let duration = request
            .duration
            .map(ReservationDuration::validate_for_booking)
            .transpose()?;
        let guest_name = request.guest_name.map(GuestName::new).transpose()?;
        let party_size = request.party_size.map(PartySize::new).transpose()?;

        if request.table_id.is_some() || party_size.is_some() {
            let target_table = request.table_id.unwrap_or_else(|| current.table_id());
            let table = self
                .tables
                .find_table(target_table)
                .await?
                .ok_or(BookingError::TableNotFound(target_table))?;
            table.admit(party_size.unwrap_or_else(|| current.party_size()))?;
        }

        Ok(ReservationChanges {
            table_id: request.table_id,
            slot,
            duration,
            guest_name,
            guest_phone: request.guest_phone,
            party_size,
            notes: request.notes,
        })
    }

    /// Inserts a reservation, retrying constraint rejections with linear
    /// backoff before surfacing the conflict.
    async fn insert_with_retry(&self, reservation: &Reservation) -> BookingResult<()> {
        let mut retries: u32 = 0;
        loop {
            match self.repository.insert(reservation).await {
                Ok(()) => return Ok(()),
                Err(ReservationRepositoryError::Overlap { table_id, interval }) => {
                    if retries >= CONFLICT_RETRY_LIMIT {
                        return Err(BookingError::TableUnavailable { table_id, interval });
                    }
                    retries += 1;
                    tracing::warn!(
                        table_id = %table_id,
                        interval = %interval,
                        retries,
                        "booking conflict, retrying"
                    );
                    tokio::time::sleep(CONFLICT_BACKOFF * retries).await;
                }
                Err(other) => return Err(map_repository_error(other)),
            }
        }
    }
}
