//! `PostgreSQL` repository implementation for reservation storage.
//!
//! The `reservations_no_overlap` trigger installed by the migrations is
//! the final authority on conflicts: inserts and reschedules racing on
//! the same table are serialized by the database, and the losing write
//! surfaces here as [`ReservationRepositoryError::Overlap`].

use super::{
    models::{
        ActivityLogRow, DiningTableRow, ReservationRow, log_to_row, row_to_log,
        row_to_reservation, row_to_table, to_row,
    },
    schema::{activity_log, dining_tables, reservations},
};
use crate::reservation::{
    domain::{
        ActivityLogEntry, Interval, Reservation, ReservationDuration, ReservationId,
        ReservationStatus, StatusFilter, Table, TableId,
    },
    ports::{
        ReservationRepository, ReservationRepositoryError, ReservationRepositoryResult,
        TableDirectory, TableDirectoryError, TableDirectoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

/// Name of the trigger constraint rejecting overlapping active intervals.
pub const OVERLAP_CONSTRAINT: &str = "reservations_no_overlap";

/// `PostgreSQL` connection pool type used by reservation adapters.
pub type ReservationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed reservation repository and table directory.
#[derive(Debug, Clone)]
pub struct PostgresReservationRepository {
    pool: ReservationPgPool,
}

impl PostgresReservationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ReservationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ReservationRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ReservationRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ReservationRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ReservationRepositoryError::persistence)?
    }

    async fn run_blocking_directory<F, T>(&self, f: F) -> TableDirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TableDirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TableDirectoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TableDirectoryError::persistence)?
    }
}

/// Maps a Diesel error to the repository taxonomy, classifying trigger
/// rejections by constraint name.
fn classify(
    err: DieselError,
    id: ReservationId,
    table_id: TableId,
    interval: Interval,
) -> ReservationRepositoryError {
    match err {
        DieselError::DatabaseError(_, ref info)
            if info.constraint_name() == Some(OVERLAP_CONSTRAINT) =>
        {
            ReservationRepositoryError::Overlap { table_id, interval }
        }
        DieselError::NotFound => ReservationRepositoryError::NotFound(id),
        other => ReservationRepositoryError::persistence(other),
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> ReservationRepositoryResult<()> {
        let row = to_row(reservation);
        let id = reservation.id();
        let table_id = reservation.table_id();
        let interval = reservation.interval();

        self.run_blocking(move |connection| {
            diesel::insert_into(reservations::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| classify(err, id, table_id, interval))?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        reservation: &Reservation,
        log: Option<&ActivityLogEntry>,
    ) -> ReservationRepositoryResult<()> {
        let row = to_row(reservation);
        let log_row = log.map(log_to_row).transpose()?;
        let id = reservation.id();
        let table_id = reservation.table_id();
        let interval = reservation.interval();

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|connection| {
                    let affected =
                        diesel::update(reservations::table.filter(reservations::id.eq(row.id)))
                            .set(&row)
                            .execute(connection)?;
                    if affected == 0 {
                        return Err(DieselError::NotFound);
                    }
                    if let Some(ref entry_row) = log_row {
                        diesel::insert_into(activity_log::table)
                            .values(entry_row)
                            .execute(connection)?;
                    }
                    Ok(())
                })
                .map_err(|err| classify(err, id, table_id, interval))
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Option<Reservation>> {
        self.run_blocking(move |connection| {
            let row = reservations::table
                .filter(reservations::id.eq(id.into_inner()))
                .select(ReservationRow::as_select())
                .first::<ReservationRow>(connection)
                .optional()
                .map_err(ReservationRepositoryError::persistence)?;
            row.map(row_to_reservation).transpose()
        })
        .await
    }

    async fn list_for_date(
        &self,
        date: NaiveDate,
        filter: StatusFilter,
    ) -> ReservationRepositoryResult<Vec<Reservation>> {
        self.run_blocking(move |connection| {
            let mut query = reservations::table
                .filter(reservations::reservation_date.eq(date))
                .select(ReservationRow::as_select())
                .order((reservations::reservation_time.asc(), reservations::id.asc()))
                .into_boxed();
            if let StatusFilter::Only(status) = filter {
                query = query.filter(reservations::status.eq(status.as_str()));
            }
            let rows = query
                .load::<ReservationRow>(connection)
                .map_err(ReservationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn list_active(&self) -> ReservationRepositoryResult<Vec<Reservation>> {
        self.run_blocking(move |connection| {
            let rows = reservations::table
                .filter(reservations::status.eq(ReservationStatus::Active.as_str()))
                .select(ReservationRow::as_select())
                .order((reservations::reservation_date.asc(), reservations::reservation_time.asc()))
                .load::<ReservationRow>(connection)
                .map_err(ReservationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_reservation).collect()
        })
        .await
    }

    async fn complete_if_active(
        &self,
        id: ReservationId,
        final_duration: ReservationDuration,
        completed_at: DateTime<Utc>,
    ) -> ReservationRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                reservations::table
                    .filter(reservations::id.eq(id.into_inner()))
                    .filter(reservations::status.eq(ReservationStatus::Active.as_str())),
            )
            .set((
                reservations::status.eq(ReservationStatus::Completed.as_str()),
                reservations::duration_hours.eq(final_duration.to_storage()),
                reservations::updated_at.eq(completed_at),
            ))
            .execute(connection)
            .map_err(ReservationRepositoryError::persistence)?;
            Ok(affected > 0)
        })
        .await
    }

    async fn list_log(
        &self,
        id: ReservationId,
    ) -> ReservationRepositoryResult<Vec<ActivityLogEntry>> {
        self.run_blocking(move |connection| {
            let rows = activity_log::table
                .filter(activity_log::reservation_id.eq(id.into_inner()))
                .select(ActivityLogRow::as_select())
                .order(activity_log::recorded_at.asc())
                .load::<ActivityLogRow>(connection)
                .map_err(ReservationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_log).collect()
        })
        .await
    }
}

#[async_trait]
impl TableDirectory for PostgresReservationRepository {
    async fn find_table(&self, id: TableId) -> TableDirectoryResult<Option<Table>> {
        self.run_blocking_directory(move |connection| {
            let row = dining_tables::table
                .filter(dining_tables::id.eq(id.into_inner()))
                .select(DiningTableRow::as_select())
                .first(connection)
                .optional()
                .map_err(TableDirectoryError::persistence)?;
            Ok(row.map(row_to_table))
        })
        .await
    }
}
