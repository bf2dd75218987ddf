//! Activity audit records and the mutation filter that produces them.
//!
//! Staff-visible history only records meaningful changes: field values are
//! normalized before diffing (dates to `YYYY-MM-DD`, times to `HH:MM`,
//! durations to one-decimal hours with the indefinite sentinel kept as a
//! distinct `-1` text, never a float comparison), and the status/duration
//! pair produced by an explicit completion is excluded. Sweep-originated
//! mutations never reach this module at all.

use super::{ParseActivityActionError, Reservation, ReservationId, ReservationStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Kind of staff action recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Fields of an active reservation were edited.
    Updated,
    /// The reservation was cancelled.
    Cancelled,
}

impl ActivityAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "updated" => Ok(Self::Updated),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseActivityActionError(value.to_owned())),
        }
    }
}

/// Old/new value pair for one changed field, both normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Value before the mutation.
    pub old: String,
    /// Value after the mutation.
    pub new: String,
}

/// Immutable audit record for one staff mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Reservation the action applied to.
    pub reservation_id: ReservationId,
    /// Kind of action.
    pub action: ActivityAction,
    /// Normalized old/new pairs for only the fields that changed.
    pub field_changes: BTreeMap<String, FieldChange>,
    /// Full snapshot of the reservation after the action.
    pub snapshot: Value,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

/// Which staff operation produced a pair of snapshots.
///
/// Cancellations do not pass through here; they always log via
/// [`cancellation_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A generic field edit.
    Edit,
    /// An explicit completion, whose status/duration pair is not logged.
    Completion,
}

/// Builds the audit entry for an edit or completion, if one is warranted.
///
/// Returns `None` when, after normalization and completion-pair exclusion,
/// no fields differ.
#[must_use]
pub fn log_entry(
    old: &Reservation,
    new: &Reservation,
    kind: MutationKind,
    clock: &impl Clock,
) -> Option<ActivityLogEntry> {
    let mut changes = field_changes(old, new);
    if kind == MutationKind::Completion
        && old.status() == ReservationStatus::Active
        && new.status() == ReservationStatus::Completed
    {
        changes.remove("status");
        changes.remove("duration_hours");
    }
    if changes.is_empty() {
        return None;
    }
    Some(ActivityLogEntry {
        id: Uuid::new_v4(),
        reservation_id: new.id(),
        action: ActivityAction::Updated,
        field_changes: changes,
        snapshot: snapshot(new),
        recorded_at: clock.utc(),
    })
}

/// Builds the audit entry for a cancellation: always logged, with a full
/// snapshot.
#[must_use]
pub fn cancellation_entry(
    old: &Reservation,
    new: &Reservation,
    clock: &impl Clock,
) -> ActivityLogEntry {
    ActivityLogEntry {
        id: Uuid::new_v4(),
        reservation_id: new.id(),
        action: ActivityAction::Cancelled,
        field_changes: field_changes(old, new),
        snapshot: snapshot(new),
        recorded_at: clock.utc(),
    }
}

/// Computes the normalized old/new pairs for fields that genuinely differ.
#[must_use]
pub fn field_changes(old: &Reservation, new: &Reservation) -> BTreeMap<String, FieldChange> {
    let before = normalized_fields(old);
    let after = normalized_fields(new);
    before
        .into_iter()
        .zip(after)
        .filter(|((_, old_value), (_, new_value))| old_value != new_value)
        .map(|((name, old_value), (_, new_value))| {
            (
                name.to_owned(),
                FieldChange {
                    old: old_value,
                    new: new_value,
                },
            )
        })
        .collect()
}

/// Full normalized snapshot of a reservation, as stored alongside each
/// audit entry.
#[must_use]
pub fn snapshot(reservation: &Reservation) -> Value {
    json!({
        "id": reservation.id().to_string(),
        "table_id": reservation.table_id().to_string(),
        "reservation_date": reservation.slot().date().format("%Y-%m-%d").to_string(),
        "reservation_time": reservation.slot().time().format("%H:%M").to_string(),
        "duration_hours": reservation.duration().to_string(),
        "status": reservation.status().as_str(),
        "guest_name": reservation.guest_name().as_str(),
        "guest_phone": reservation.guest_phone(),
        "party_size": reservation.party_size().value(),
        "notes": reservation.notes(),
        "created_by": reservation.created_by(),
        "created_at": reservation.created_at().to_rfc3339(),
        "updated_at": reservation.updated_at().to_rfc3339(),
    })
}

fn normalized_fields(reservation: &Reservation) -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("table_id", reservation.table_id().to_string()),
        (
            "reservation_date",
            reservation.slot().date().format("%Y-%m-%d").to_string(),
        ),
        (
            "reservation_time",
            reservation.slot().time().format("%H:%M").to_string(),
        ),
        ("duration_hours", reservation.duration().to_string()),
        ("status", reservation.status().as_str().to_owned()),
        ("guest_name", reservation.guest_name().as_str().to_owned()),
        (
            "guest_phone",
            reservation.guest_phone().unwrap_or_default().to_owned(),
        ),
        ("party_size", reservation.party_size().to_string()),
        ("notes", reservation.notes().to_owned()),
    ])
}
