//! Booking service tests: validation, conflict rejection, lifecycle
//! operations, and audit side effects.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{FixedClock, at, date, finite, time};
use crate::reservation::{
    adapters::memory::InMemoryReservationStore,
    domain::{
        ActivityAction, ActivityLogEntry, Reservation, ReservationDuration, ReservationId,
        ReservationStatus, StatusFilter, Table, TableId, ValidationError,
    },
    ports::{ReservationRepository, ReservationRepositoryError, ReservationRepositoryResult},
    services::{BookingError, BookingService, CreateReservationRequest, EditReservationRequest},
};

type TestService = BookingService<InMemoryReservationStore, InMemoryReservationStore, FixedClock>;

/// Store, four-seat table, and service pinned to the given instant.
fn harness(now: chrono::NaiveDateTime) -> (Arc<InMemoryReservationStore>, Table, TestService) {
    let table = Table::new(TableId::new(), "Snug", 4);
    let store = Arc::new(InMemoryReservationStore::with_tables([table.clone()]));
    let service = BookingService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(FixedClock::at(now)),
    );
    (store, table, service)
}

fn evening_request(table: &Table) -> CreateReservationRequest {
    CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(18, 0),
        finite(20),
        "Morgan",
        2,
    )
    .with_phone("01632 960123")
    .with_notes("window seat")
    .booked_by("staff:fran")
}

/// Repository stub that rejects the first `conflicts` inserts as overlap
/// violations, standing in for a table that frees up between attempts.
struct FlakyRepository {
    conflicts: u32,
    attempts: AtomicU32,
}

impl FlakyRepository {
    fn conflicting(conflicts: u32) -> Self {
        Self {
            conflicts,
            attempts: AtomicU32::new(0),
        }
    }

    fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReservationRepository for FlakyRepository {
    async fn insert(&self, reservation: &Reservation) -> ReservationRepositoryResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.conflicts {
            return Err(ReservationRepositoryError::Overlap {
                table_id: reservation.table_id(),
                interval: reservation.interval(),
            });
        }
        Ok(())
    }

    async fn update(
        &self,
        _reservation: &Reservation,
        _log: Option<&ActivityLogEntry>,
    ) -> ReservationRepositoryResult<()> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: ReservationId,
    ) -> ReservationRepositoryResult<Option<Reservation>> {
        Ok(None)
    }

    async fn list_for_date(
        &self,
        _date: NaiveDate,
        _filter: StatusFilter,
    ) -> ReservationRepositoryResult<Vec<Reservation>> {
        Ok(Vec::new())
    }

    async fn list_active(&self) -> ReservationRepositoryResult<Vec<Reservation>> {
        Ok(Vec::new())
    }

    async fn complete_if_active(
        &self,
        _id: ReservationId,
        _final_duration: ReservationDuration,
        _completed_at: DateTime<Utc>,
    ) -> ReservationRepositoryResult<bool> {
        Ok(false)
    }

    async fn list_log(
        &self,
        _id: ReservationId,
    ) -> ReservationRepositoryResult<Vec<ActivityLogEntry>> {
        Ok(Vec::new())
    }
}

fn flaky_service(
    conflicts: u32,
) -> (
    Arc<FlakyRepository>,
    Table,
    BookingService<FlakyRepository, InMemoryReservationStore, FixedClock>,
) {
    let table = Table::new(TableId::new(), "Snug", 4);
    let directory = Arc::new(InMemoryReservationStore::with_tables([table.clone()]));
    let repository = Arc::new(FlakyRepository::conflicting(conflicts));
    let service = BookingService::new(
        Arc::clone(&repository),
        directory,
        Arc::new(FixedClock::at(at(2025, 8, 26, 10, 0))),
    );
    (repository, table, service)
}

#[tokio::test(flavor = "multi_thread")]
async fn transient_conflict_is_retried_until_the_insert_lands() {
    let (repository, table, service) = flaky_service(1);

    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("second attempt lands");

    assert_eq!(repository.attempts(), 2);
    assert_eq!(created.status(), ReservationStatus::Active);
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_conflict_exhausts_the_retry_budget() {
    let (repository, table, service) = flaky_service(u32::MAX);

    let result = service.create_reservation(evening_request(&table)).await;

    let err = result.expect_err("conflict never clears");
    assert!(matches!(err, BookingError::TableUnavailable { .. }));
    // One initial attempt plus three retries.
    assert_eq!(repository.attempts(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_persists_and_is_retrievable() {
    let (store, table, service) = harness(at(2025, 8, 26, 10, 0));

    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("booking succeeds");

    let fetched = store
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds");
    assert_eq!(fetched, Some(created.clone()));
    assert_eq!(created.status(), ReservationStatus::Active);
    assert_eq!(created.guest_phone(), Some("01632 960123"));
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_booking_is_rejected_as_unavailable() {
    let (_, table, service) = harness(at(2025, 8, 26, 10, 0));
    service
        .create_reservation(evening_request(&table))
        .await
        .expect("first booking succeeds");

    let overlapping = CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(19, 0),
        finite(10),
        "Ashley",
        2,
    );
    let result = service.create_reservation(overlapping).await;

    let err = result.expect_err("second booking must conflict");
    assert!(matches!(err, BookingError::TableUnavailable { .. }));
    assert_eq!(err.code(), "TABLE_UNAVAILABLE");
}

#[tokio::test(flavor = "multi_thread")]
async fn back_to_back_bookings_share_a_boundary() {
    let (_, table, service) = harness(at(2025, 8, 26, 10, 0));
    service
        .create_reservation(evening_request(&table))
        .await
        .expect("first booking succeeds");

    // 18:00 + 2.0h ends exactly at 20:00; half-open intervals do not touch.
    let adjacent = CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(20, 0),
        finite(15),
        "Ashley",
        3,
    );
    assert!(service.create_reservation(adjacent).await.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_party_is_rejected() {
    let (_, table, service) = harness(at(2025, 8, 26, 10, 0));
    let request = CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(18, 0),
        finite(20),
        "Morgan",
        6,
    );

    let result = service.create_reservation(request).await;
    assert!(matches!(
        result,
        Err(BookingError::Validation(
            ValidationError::PartyExceedsCapacity {
                party_size: 6,
                capacity: 4,
            }
        ))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_table_is_rejected() {
    let (_, _, service) = harness(at(2025, 8, 26, 10, 0));
    let stranger = TableId::new();
    let request = CreateReservationRequest::new(
        stranger,
        date(2025, 8, 26),
        time(18, 0),
        finite(20),
        "Morgan",
        2,
    );

    let result = service.create_reservation(request).await;
    assert!(matches!(result, Err(BookingError::TableNotFound(id)) if id == stranger));
}

#[tokio::test(flavor = "multi_thread")]
async fn past_start_is_rejected() {
    let (_, table, service) = harness(at(2025, 8, 26, 19, 0));
    let request = CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(18, 0),
        finite(20),
        "Morgan",
        2,
    );

    let result = service.create_reservation(request).await;
    assert!(matches!(
        result,
        Err(BookingError::Validation(ValidationError::PastStart { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn overlong_duration_is_rejected() {
    let (_, table, service) = harness(at(2025, 8, 26, 10, 0));
    let request = CreateReservationRequest::new(
        table.id(),
        date(2025, 8, 26),
        time(12, 0),
        finite(125),
        "Morgan",
        2,
    );

    let result = service.create_reservation(request).await;
    assert!(matches!(
        result,
        Err(BookingError::Validation(ValidationError::DurationTooLong(_)))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_retains_the_row() {
    let (store, table, service) = harness(at(2025, 8, 26, 10, 0));
    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("booking succeeds");

    let cancelled = service
        .cancel_reservation(created.id())
        .await
        .expect("cancellation succeeds");
    assert_eq!(cancelled.status(), ReservationStatus::Cancelled);

    let fetched = store
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds")
        .expect("row is retained");
    assert_eq!(fetched.status(), ReservationStatus::Cancelled);

    let log = store.list_log(created.id()).await.expect("log lookup");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, ActivityAction::Cancelled);
    assert_eq!(log[0].snapshot["status"], "cancelled");
}

#[tokio::test(flavor = "multi_thread")]
async fn editing_notes_logs_exactly_one_update() {
    let (store, table, service) = harness(at(2025, 8, 26, 10, 0));
    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("booking succeeds");

    let edited = service
        .edit_reservation(
            created.id(),
            EditReservationRequest::new().with_notes("birthday"),
        )
        .await
        .expect("edit succeeds");
    assert_eq!(edited.notes(), "birthday");

    let log = store.list_log(created.id()).await.expect("log lookup");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, ActivityAction::Updated);
    let changes = &log[0].field_changes;
    assert_eq!(changes.len(), 1);
    let notes = changes.get("notes").expect("notes change recorded");
    assert_eq!(notes.old, "window seat");
    assert_eq!(notes.new, "birthday");
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_completion_logs_nothing() {
    let (store, table, service) = harness(at(2025, 8, 26, 10, 0));
    let created = service
        .create_reservation(
            CreateReservationRequest::new(
                table.id(),
                date(2025, 8, 26),
                time(18, 0),
                ReservationDuration::Indefinite,
                "Morgan",
                2,
            ),
        )
        .await
        .expect("booking succeeds");

    // Re-point the clock past the start so elapsed time is positive.
    let later = BookingService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(FixedClock::at(at(2025, 8, 26, 21, 30))),
    );
    let completed = later
        .complete_reservation(created.id())
        .await
        .expect("completion succeeds");

    assert_eq!(completed.status(), ReservationStatus::Completed);
    assert_eq!(completed.duration(), finite(35));
    let log = store.list_log(created.id()).await.expect("log lookup");
    assert!(log.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn editing_a_cancelled_reservation_is_a_state_error() {
    let (_, table, service) = harness(at(2025, 8, 26, 10, 0));
    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("booking succeeds");
    service
        .cancel_reservation(created.id())
        .await
        .expect("cancellation succeeds");

    let result = service
        .edit_reservation(
            created.id(),
            EditReservationRequest::new().with_notes("late change"),
        )
        .await;
    assert!(matches!(result, Err(BookingError::State(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn moving_to_a_smaller_table_rechecks_capacity() {
    let table = Table::new(TableId::new(), "Snug", 4);
    let stool = Table::new(TableId::new(), "Bar stool", 1);
    let store = Arc::new(InMemoryReservationStore::with_tables([
        table.clone(),
        stool.clone(),
    ]));
    let service = BookingService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(FixedClock::at(at(2025, 8, 26, 10, 0))),
    );
    let created = service
        .create_reservation(evening_request(&table))
        .await
        .expect("booking succeeds");

    let result = service
        .edit_reservation(
            created.id(),
            EditReservationRequest::new().move_to_table(stool.id()),
        )
        .await;
    assert!(matches!(
        result,
        Err(BookingError::Validation(
            ValidationError::PartyExceedsCapacity { .. }
        ))
    ));

    let moved = service
        .edit_reservation(
            created.id(),
            EditReservationRequest::new()
                .move_to_table(stool.id())
                .with_party_size(1)
                .rename_guest("Morgan-Leigh"),
        )
        .await
        .expect("downsized move succeeds");
    assert_eq!(moved.table_id(), stool.id());
    assert_eq!(moved.guest_name().as_str(), "Morgan-Leigh");
}

#[tokio::test(flavor = "multi_thread")]
async fn rescheduling_onto_an_occupied_interval_is_rejected() {
    let (store, table, service) = harness(at(2025, 8, 26, 10, 0));
    service
        .create_reservation(evening_request(&table))
        .await
        .expect("first booking succeeds");
    let second = service
        .create_reservation(
            CreateReservationRequest::new(
                table.id(),
                date(2025, 8, 26),
                time(21, 0),
                finite(10),
                "Ashley",
                2,
            ),
        )
        .await
        .expect("second booking succeeds");

    let result = service
        .edit_reservation(
            second.id(),
            EditReservationRequest::new().with_time(time(18, 30)),
        )
        .await;
    assert!(matches!(result, Err(BookingError::TableUnavailable { .. })));

    // The rejected reschedule leaves the stored row untouched.
    let fetched = store
        .find_by_id(second.id())
        .await
        .expect("lookup succeeds")
        .expect("row exists");
    assert_eq!(fetched.slot().time(), time(21, 0));
}
