//! Diesel row models and domain conversions for reservation persistence.

use super::schema::{activity_log, dining_tables, reservations};
use crate::reservation::domain::{
    ActivityAction, ActivityLogEntry, FieldChange, GuestName, PartySize,
    PersistedReservationData, Reservation, ReservationDuration, ReservationId, ReservationStatus,
    StartSlot, Table, TableId,
};
use crate::reservation::ports::{ReservationRepositoryError, ReservationRepositoryResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query result row for reservations.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Booked table.
    pub table_id: uuid::Uuid,
    /// Calendar date of the start.
    pub reservation_date: NaiveDate,
    /// Local start time.
    pub reservation_time: NaiveTime,
    /// Decimal hours; `-1` is the indefinite sentinel.
    pub duration_hours: f64,
    /// Lifecycle status.
    pub status: String,
    /// Guest name.
    pub guest_name: String,
    /// Optional contact number.
    pub guest_phone: Option<String>,
    /// Number of guests.
    pub party_size: i32,
    /// Staff notes.
    pub notes: String,
    /// Creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for reservations.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = reservations)]
pub struct NewReservationRow {
    /// Reservation identifier.
    pub id: uuid::Uuid,
    /// Booked table.
    pub table_id: uuid::Uuid,
    /// Calendar date of the start.
    pub reservation_date: NaiveDate,
    /// Local start time.
    pub reservation_time: NaiveTime,
    /// Decimal hours; `-1` is the indefinite sentinel.
    pub duration_hours: f64,
    /// Lifecycle status.
    pub status: String,
    /// Guest name.
    pub guest_name: String,
    /// Optional contact number.
    pub guest_phone: Option<String>,
    /// Number of guests.
    pub party_size: i32,
    /// Staff notes.
    pub notes: String,
    /// Creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Reservation the action applied to.
    pub reservation_id: uuid::Uuid,
    /// Action kind.
    pub action: String,
    /// Changed-field payload.
    pub field_changes: Value,
    /// Reservation snapshot.
    pub snapshot: Value,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivityLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Reservation the action applied to.
    pub reservation_id: uuid::Uuid,
    /// Action kind.
    pub action: String,
    /// Changed-field payload.
    pub field_changes: Value,
    /// Reservation snapshot.
    pub snapshot: Value,
    /// When the action happened.
    pub recorded_at: DateTime<Utc>,
}

/// Query result row for physical tables.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dining_tables)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiningTableRow {
    /// Table identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub display_name: String,
    /// Seating capacity.
    pub capacity: i32,
}

/// Maps a reservation aggregate to its insert/update row.
#[must_use]
pub fn to_row(reservation: &Reservation) -> NewReservationRow {
    NewReservationRow {
        id: reservation.id().into_inner(),
        table_id: reservation.table_id().into_inner(),
        reservation_date: reservation.slot().date(),
        reservation_time: reservation.slot().time(),
        duration_hours: reservation.duration().to_storage(),
        status: reservation.status().as_str().to_owned(),
        guest_name: reservation.guest_name().as_str().to_owned(),
        guest_phone: reservation.guest_phone().map(str::to_owned),
        party_size: i32::from(reservation.party_size().value()),
        notes: reservation.notes().to_owned(),
        created_by: reservation.created_by().to_owned(),
        created_at: reservation.created_at(),
        updated_at: reservation.updated_at(),
    }
}

/// Reconstructs a reservation aggregate from a stored row.
///
/// # Errors
///
/// Returns [`ReservationRepositoryError::Persistence`] when stored values
/// do not decode into valid domain types.
pub fn row_to_reservation(row: ReservationRow) -> ReservationRepositoryResult<Reservation> {
    let slot = StartSlot::new(row.reservation_date, row.reservation_time)
        .map_err(ReservationRepositoryError::persistence)?;
    let duration = ReservationDuration::from_storage(row.duration_hours)
        .map_err(ReservationRepositoryError::persistence)?;
    let status = ReservationStatus::try_from(row.status.as_str())
        .map_err(ReservationRepositoryError::persistence)?;
    let guest_name =
        GuestName::new(row.guest_name).map_err(ReservationRepositoryError::persistence)?;
    let party_size = u16::try_from(row.party_size)
        .map_err(ReservationRepositoryError::persistence)
        .and_then(|value| {
            PartySize::new(value).map_err(ReservationRepositoryError::persistence)
        })?;

    Ok(Reservation::from_persisted(PersistedReservationData {
        id: ReservationId::from_uuid(row.id),
        table_id: TableId::from_uuid(row.table_id),
        slot,
        duration,
        status,
        guest_name,
        guest_phone: row.guest_phone,
        party_size,
        notes: row.notes,
        created_by: row.created_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Maps an audit entry to its insert row.
///
/// # Errors
///
/// Returns [`ReservationRepositoryError::Persistence`] when the
/// changed-field payload does not serialize.
pub fn log_to_row(entry: &ActivityLogEntry) -> ReservationRepositoryResult<NewActivityLogRow> {
    let field_changes = serde_json::to_value(&entry.field_changes)
        .map_err(ReservationRepositoryError::persistence)?;
    Ok(NewActivityLogRow {
        id: entry.id,
        reservation_id: entry.reservation_id.into_inner(),
        action: entry.action.as_str().to_owned(),
        field_changes,
        snapshot: entry.snapshot.clone(),
        recorded_at: entry.recorded_at,
    })
}

/// Reconstructs an audit entry from a stored row.
///
/// # Errors
///
/// Returns [`ReservationRepositoryError::Persistence`] when stored values
/// do not decode.
pub fn row_to_log(row: ActivityLogRow) -> ReservationRepositoryResult<ActivityLogEntry> {
    let action = ActivityAction::try_from(row.action.as_str())
        .map_err(ReservationRepositoryError::persistence)?;
    let field_changes: BTreeMap<String, FieldChange> =
        serde_json::from_value(row.field_changes)
            .map_err(ReservationRepositoryError::persistence)?;
    Ok(ActivityLogEntry {
        id: row.id,
        reservation_id: ReservationId::from_uuid(row.reservation_id),
        action,
        field_changes,
        snapshot: row.snapshot,
        recorded_at: row.recorded_at,
    })
}

/// Reconstructs a physical table from a stored row.
#[must_use]
pub fn row_to_table(row: DiningTableRow) -> Table {
    let capacity = u16::try_from(row.capacity).unwrap_or(u16::MAX);
    Table::new(TableId::from_uuid(row.id), row.display_name, capacity)
}
