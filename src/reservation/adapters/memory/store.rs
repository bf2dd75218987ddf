//! Thread-safe in-memory reservation store.
//!
//! Enforces the same per-table overlap rule as the `PostgreSQL` trigger,
//! so service-level behaviour (including conflict rejection and atomic
//! audit writes) can be exercised without a database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::reservation::{
    domain::{
        ActivityLogEntry, PersistedReservationData, Reservation, ReservationDuration,
        ReservationId, ReservationStatus, StatusFilter, Table, TableId,
    },
    ports::{
        ReservationRepository, ReservationRepositoryError, ReservationRepositoryResult,
        TableDirectory, TableDirectoryError, TableDirectoryResult,
    },
};

/// Thread-safe in-memory reservation repository and table directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    reservations: HashMap<ReservationId, Reservation>,
    log: Vec<ActivityLogEntry>,
    tables: HashMap<TableId, Table>,
}

impl InMemoryReservationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with physical tables.
    #[must_use]
    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let state = StoreState {
            tables: tables.into_iter().map(|table| (table.id(), table)).collect(),
            ..StoreState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn read(&self) -> ReservationRepositoryResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|err| {
            ReservationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ReservationRepositoryResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|err| {
            ReservationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Rejects a write that would leave two blocking reservations with
/// overlapping intervals on one table. Mirrors the storage trigger.
fn check_overlap(
    state: &StoreState,
    candidate: &Reservation,
) -> ReservationRepositoryResult<()> {
    if !candidate.status().blocks_table() {
        return Ok(());
    }
    let interval = candidate.interval();
    let conflict = state.reservations.values().any(|existing| {
        existing.id() != candidate.id()
            && existing.table_id() == candidate.table_id()
            && existing.status().blocks_table()
            && existing.interval().overlaps(interval)
    });
    if conflict {
        return Err(ReservationRepositoryError::Overlap {
            table_id: candidate.table_id(),
            interval,
        });
    }
    Ok(())
}

#[async_trait]
impl ReservationRepository for InMemoryReservationStore {
    async fn insert(&self, reservation: &Reservation) -> ReservationRepositoryResult<()> {
        let mut state = self.write()?;
        if state.reservations.contains_key(&reservation.id()) {
            return Err(ReservationRepositoryError::persistence(
                std::io::Error::other(format!("duplicate reservation id {}", reservation.id())),
            ));
        }
        check_overlap(&state, reservation)?;
        state.reservations.insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn update(
        &self,
        reservation: &Reservation,
        log: Option<&ActivityLogEntry>,
    ) -> ReservationRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.reservations.contains_key(&reservation.id()) {
            return Err(ReservationRepositoryError::NotFound(reservation.id()));
        }
        check_overlap(&state, reservation)?;
        state.reservations.insert(reservation.id(), reservation.clone());
        if let Some(entry) = log {
            state.log.push(entry.clone());
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Option<Reservation>> {
        let state = self.read()?;
        Ok(state.reservations.get(&id).cloned())
    }

    async fn list_for_date(
        &self,
        date: NaiveDate,
        filter: StatusFilter,
    ) -> ReservationRepositoryResult<Vec<Reservation>> {
        let state = self.read()?;
        let mut rows: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.slot().date() == date && filter.matches(r.status()))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.slot().instant(), r.id()));
        Ok(rows)
    }

    async fn list_active(&self) -> ReservationRepositoryResult<Vec<Reservation>> {
        let state = self.read()?;
        let mut rows: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.status() == ReservationStatus::Active)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.slot().instant(), r.id()));
        Ok(rows)
    }

    async fn complete_if_active(
        &self,
        id: ReservationId,
        final_duration: ReservationDuration,
        completed_at: DateTime<Utc>,
    ) -> ReservationRepositoryResult<bool> {
        let mut state = self.write()?;
        let Some(existing) = state.reservations.get(&id) else {
            return Ok(false);
        };
        if existing.status() != ReservationStatus::Active {
            return Ok(false);
        }
        let completed = Reservation::from_persisted(PersistedReservationData {
            id: existing.id(),
            table_id: existing.table_id(),
            slot: existing.slot(),
            duration: final_duration,
            status: ReservationStatus::Completed,
            guest_name: existing.guest_name().clone(),
            guest_phone: existing.guest_phone().map(str::to_owned),
            party_size: existing.party_size(),
            notes: existing.notes().to_owned(),
            created_by: existing.created_by().to_owned(),
            created_at: existing.created_at(),
            updated_at: completed_at,
        });
        state.reservations.insert(id, completed);
        Ok(true)
    }

    async fn list_log(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Vec<ActivityLogEntry>> {
        let state = self.read()?;
        Ok(state
            .log
            .iter()
            .filter(|entry| entry.reservation_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TableDirectory for InMemoryReservationStore {
    async fn find_table(&self, id: TableId) -> TableDirectoryResult<Option<Table>> {
        let state = self.state.read().map_err(|err| {
            TableDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.tables.get(&id).cloned())
    }
}
