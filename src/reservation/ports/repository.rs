//! Repository port for reservation persistence and the table directory.
//!
//! The repository's `insert` and `update` are the single authoritative
//! overlap check: implementations must reject any write that would leave
//! two active reservations with overlapping computed intervals on one
//! table. Application-side availability checks are a best-effort hint
//! layered on top, never the source of correctness.

use crate::reservation::domain::{
    ActivityLogEntry, Interval, Reservation, ReservationDuration, ReservationId, StatusFilter,
    Table, TableId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for reservation repository operations.
pub type ReservationRepositoryResult<T> = Result<T, ReservationRepositoryError>;

/// Reservation persistence contract.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Inserts a new reservation inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationRepositoryError::Overlap`] when the write would
    /// violate the per-table overlap constraint, and
    /// [`ReservationRepositoryError::Persistence`] for other storage
    /// failures.
    async fn insert(&self, reservation: &Reservation) -> ReservationRepositoryResult<()>;

    /// Persists changes to an existing reservation and, when given, its
    /// audit entry, committing both as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationRepositoryError::NotFound`] when the row does
    /// not exist and [`ReservationRepositoryError::Overlap`] when the
    /// rescheduled interval would violate the overlap constraint.
    async fn update(
        &self,
        reservation: &Reservation,
        log: Option<&ActivityLogEntry>,
    ) -> ReservationRepositoryResult<()>;

    /// Finds a reservation by identifier.
    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Option<Reservation>>;

    /// Lists reservations dated exactly `date`, filtered by status.
    async fn list_for_date(
        &self,
        date: NaiveDate,
        filter: StatusFilter,
    ) -> ReservationRepositoryResult<Vec<Reservation>>;

    /// Lists every active reservation.
    async fn list_active(&self) -> ReservationRepositoryResult<Vec<Reservation>>;

    /// Marks a reservation completed with the given final duration, only
    /// if it is still active. Returns `true` when a row was updated.
    ///
    /// The status condition is evaluated inside the same statement as the
    /// write, so concurrent or repeated sweeps settle each row exactly
    /// once.
    async fn complete_if_active(
        &self,
        id: ReservationId,
        final_duration: ReservationDuration,
        completed_at: DateTime<Utc>,
    ) -> ReservationRepositoryResult<bool>;

    /// Lists audit entries for a reservation, oldest first.
    async fn list_log(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Vec<ActivityLogEntry>>;
}

/// Errors returned by reservation repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ReservationRepositoryError {
    /// The write would create overlapping active reservations on a table.
    #[error("table {table_id} is occupied over {interval}")]
    Overlap {
        /// Table the conflicting write targeted.
        table_id: TableId,
        /// Interval the rejected write would have occupied.
        interval: Interval,
    },

    /// The reservation was not found.
    #[error("reservation not found: {0}")]
    NotFound(ReservationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReservationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Result type for table directory operations.
pub type TableDirectoryResult<T> = Result<T, TableDirectoryError>;

/// Lookup contract for physical tables and their capacities.
#[async_trait]
pub trait TableDirectory: Send + Sync {
    /// Finds a table by identifier.
    async fn find_table(&self, id: TableId) -> TableDirectoryResult<Option<Table>>;
}

/// Errors returned by table directory implementations.
#[derive(Debug, Clone, Error)]
pub enum TableDirectoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TableDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
