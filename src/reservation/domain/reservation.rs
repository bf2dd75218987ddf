//! Reservation aggregate root and lifecycle state machine.

use super::{
    GuestName, Interval, ParseReservationStatusError, PartySize, ReservationDuration,
    ReservationId, ReservationStateError, StartSlot, TableId,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Reservation lifecycle status.
///
/// Transitions are monotone: `Active` may become `Completed` or
/// `Cancelled`; both of those are terminal. Rows are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// The table is, or will be, occupied by this reservation.
    Active,
    /// The stay ended; the row is retained for history and billing.
    Completed,
    /// Staff withdrew the booking; the row is retained for audit.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when reservations in this status occupy their
    /// interval for conflict purposes. Only active rows gate new bookings.
    #[must_use]
    pub const fn blocks_table(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ReservationStatus {
    type Error = ParseReservationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseReservationStatusError(value.to_owned())),
        }
    }
}

/// Status predicate used by listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Match every status.
    Any,
    /// Match a single status.
    Only(ReservationStatus),
}

impl StatusFilter {
    /// Shorthand for filtering to active reservations.
    #[must_use]
    pub const fn active() -> Self {
        Self::Only(ReservationStatus::Active)
    }

    /// Tests a status against the filter.
    #[must_use]
    pub fn matches(self, status: ReservationStatus) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Input for booking a new reservation, already carrying validated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// Table being booked.
    pub table_id: TableId,
    /// Validated start slot.
    pub slot: StartSlot,
    /// Declared duration.
    pub duration: ReservationDuration,
    /// Guest the booking is held under.
    pub guest_name: GuestName,
    /// Optional contact number.
    pub guest_phone: Option<String>,
    /// Validated party size.
    pub party_size: PartySize,
    /// Free-form staff notes.
    pub notes: String,
    /// Staff member who took the booking.
    pub created_by: String,
}

/// Validated field changes applied by a staff edit.
///
/// `None` leaves a field untouched; `guest_phone` uses a nested option so
/// an edit can clear the number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReservationChanges {
    /// Move the booking to another table.
    pub table_id: Option<TableId>,
    /// Reschedule to a different validated slot.
    pub slot: Option<StartSlot>,
    /// Change the declared duration.
    pub duration: Option<ReservationDuration>,
    /// Rename the guest.
    pub guest_name: Option<GuestName>,
    /// Set or clear the contact number.
    pub guest_phone: Option<Option<String>>,
    /// Change the party size.
    pub party_size: Option<PartySize>,
    /// Replace the staff notes.
    pub notes: Option<String>,
}

/// Parameter object for reconstructing a persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReservationData {
    /// Persisted identifier.
    pub id: ReservationId,
    /// Persisted table reference.
    pub table_id: TableId,
    /// Persisted start slot.
    pub slot: StartSlot,
    /// Persisted duration.
    pub duration: ReservationDuration,
    /// Persisted status.
    pub status: ReservationStatus,
    /// Persisted guest name.
    pub guest_name: GuestName,
    /// Persisted contact number.
    pub guest_phone: Option<String>,
    /// Persisted party size.
    pub party_size: PartySize,
    /// Persisted notes.
    pub notes: String,
    /// Persisted creator.
    pub created_by: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Reservation aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id: ReservationId,
    table_id: TableId,
    slot: StartSlot,
    duration: ReservationDuration,
    status: ReservationStatus,
    guest_name: GuestName,
    guest_phone: Option<String>,
    party_size: PartySize,
    notes: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Books a new active reservation.
    #[must_use]
    pub fn book(input: NewReservation, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ReservationId::new(),
            table_id: input.table_id,
            slot: input.slot,
            duration: input.duration,
            status: ReservationStatus::Active,
            guest_name: input.guest_name,
            guest_phone: input.guest_phone,
            party_size: input.party_size,
            notes: input.notes,
            created_by: input.created_by,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a reservation from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedReservationData) -> Self {
        Self {
            id: data.id,
            table_id: data.table_id,
            slot: data.slot,
            duration: data.duration,
            status: data.status,
            guest_name: data.guest_name,
            guest_phone: data.guest_phone,
            party_size: data.party_size,
            notes: data.notes,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the reservation identifier.
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the booked table.
    #[must_use]
    pub const fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Returns the validated start slot.
    #[must_use]
    pub const fn slot(&self) -> StartSlot {
        self.slot
    }

    /// Returns the declared duration.
    #[must_use]
    pub const fn duration(&self) -> ReservationDuration {
        self.duration
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Returns the guest name.
    #[must_use]
    pub const fn guest_name(&self) -> &GuestName {
        &self.guest_name
    }

    /// Returns the contact number, if any.
    #[must_use]
    pub fn guest_phone(&self) -> Option<&str> {
        self.guest_phone.as_deref()
    }

    /// Returns the party size.
    #[must_use]
    pub const fn party_size(&self) -> PartySize {
        self.party_size
    }

    /// Returns the staff notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the staff member who took the booking.
    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Computes the half-open occupation interval, substituting the policy
    /// cutoff for indefinite durations.
    #[must_use]
    pub fn interval(&self) -> Interval {
        Interval::compute(self.slot, self.duration)
    }

    /// Applies validated staff edits.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationStateError::Terminal`] when the reservation is
    /// already completed or cancelled.
    pub fn apply_edit(
        &mut self,
        changes: ReservationChanges,
        clock: &impl Clock,
    ) -> Result<(), ReservationStateError> {
        self.ensure_active()?;
        if let Some(table_id) = changes.table_id {
            self.table_id = table_id;
        }
        if let Some(slot) = changes.slot {
            self.slot = slot;
        }
        if let Some(duration) = changes.duration {
            self.duration = duration;
        }
        if let Some(guest_name) = changes.guest_name {
            self.guest_name = guest_name;
        }
        if let Some(guest_phone) = changes.guest_phone {
            self.guest_phone = guest_phone;
        }
        if let Some(party_size) = changes.party_size {
            self.party_size = party_size;
        }
        if let Some(notes) = changes.notes {
            self.notes = notes;
        }
        self.touch(clock);
        Ok(())
    }

    /// Completes the reservation on explicit staff action.
    ///
    /// Indefinite reservations record their actual elapsed stay, rounded to
    /// one decimal hour and floored at 0.1h, with no upper cap. Finite
    /// reservations keep their declared duration.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationStateError::Terminal`] when already completed
    /// or cancelled, or [`ReservationStateError::NotYetStarted`] when an
    /// indefinite reservation is completed before its start instant.
    pub fn complete(
        &mut self,
        now: NaiveDateTime,
        clock: &impl Clock,
    ) -> Result<(), ReservationStateError> {
        self.ensure_active()?;
        if self.duration.is_indefinite() {
            let elapsed = now - self.slot.instant();
            if elapsed <= chrono::TimeDelta::zero() {
                return Err(ReservationStateError::NotYetStarted(self.id));
            }
            self.duration = ReservationDuration::from_elapsed(elapsed);
        }
        self.status = ReservationStatus::Completed;
        self.touch(clock);
        Ok(())
    }

    /// Cancels the reservation, retaining the row.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationStateError::Terminal`] when already completed
    /// or cancelled.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), ReservationStateError> {
        self.ensure_active()?;
        self.status = ReservationStatus::Cancelled;
        self.touch(clock);
        Ok(())
    }

    /// Decides whether the auto-completion sweep should close this
    /// reservation at `now`, and with what final duration.
    ///
    /// Finite reservations are due once their interval end has passed and
    /// keep their declared duration. Indefinite reservations are due six
    /// hours after their start and record the elapsed stay clamped to the
    /// six-hour billing cap.
    #[must_use]
    pub fn auto_completion_outcome(&self, now: NaiveDateTime) -> Option<ReservationDuration> {
        if self.status != ReservationStatus::Active {
            return None;
        }
        match self.duration {
            ReservationDuration::Finite(_) => {
                (self.interval().end() < now).then_some(self.duration)
            }
            ReservationDuration::Indefinite => {
                let start = self.slot.instant();
                let due = start + chrono::TimeDelta::hours(6);
                (due < now).then(|| {
                    ReservationDuration::from_elapsed(now - start).capped_for_billing()
                })
            }
        }
    }

    fn ensure_active(&self) -> Result<(), ReservationStateError> {
        if self.status == ReservationStatus::Active {
            return Ok(());
        }
        Err(ReservationStateError::Terminal {
            id: self.id,
            status: self.status,
        })
    }

    /// Updates the mutation timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
