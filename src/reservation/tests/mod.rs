//! Test suite for the reservation scheduling engine.

mod audit_tests;
mod booking_tests;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use mockable::Clock;

use crate::reservation::domain::{
    GuestName, NewReservation, PartySize, Reservation, ReservationDuration, StartSlot, Table,
    TableId,
};

/// Deterministic clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to a venue-local instant.
    pub(crate) fn at(instant: NaiveDateTime) -> Self {
        Self {
            now: instant.and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub(crate) fn at(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> NaiveDateTime {
    date(year, month, day).and_time(time(hour, minute))
}

pub(crate) fn slot(on: NaiveDate, start: NaiveTime) -> StartSlot {
    StartSlot::new(on, start).expect("valid slot")
}

pub(crate) fn finite(tenths: u16) -> ReservationDuration {
    ReservationDuration::finite(tenths).expect("positive duration")
}

pub(crate) fn corner_table() -> Table {
    Table::new(TableId::new(), "Corner booth", 4)
}

/// Books a reservation directly through the aggregate, bypassing service
/// validation, for domain-level tests.
pub(crate) fn booked(
    table_id: TableId,
    start: StartSlot,
    duration: ReservationDuration,
    clock: &impl Clock,
) -> Reservation {
    Reservation::book(
        NewReservation {
            table_id,
            slot: start,
            duration,
            guest_name: GuestName::new("Morgan").expect("valid name"),
            guest_phone: None,
            party_size: PartySize::new(2).expect("valid party"),
            notes: String::new(),
            created_by: "staff:fran".to_owned(),
        },
        clock,
    )
}
