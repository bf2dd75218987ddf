//! Activity log filter tests: normalized diffs, completion-pair
//! exclusion, and unconditional cancellation records.

use super::{FixedClock, at, booked, corner_table, date, finite, slot, time};
use crate::reservation::domain::{
    ActivityAction, GuestName, MutationKind, ReservationChanges, ReservationDuration,
    cancellation_entry, field_changes, log_entry,
};

#[test]
fn unchanged_edit_produces_no_entry() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    let mut after = before.clone();
    after
        .apply_edit(ReservationChanges::default(), &clock)
        .expect("edit succeeds");

    assert_eq!(log_entry(&before, &after, MutationKind::Edit, &clock), None);
}

#[test]
fn notes_edit_diffs_exactly_one_field() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    let mut after = before.clone();
    after
        .apply_edit(
            ReservationChanges {
                notes: Some("allergy: nuts".to_owned()),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");

    let entry = log_entry(&before, &after, MutationKind::Edit, &clock)
        .expect("changed notes warrant an entry");
    assert_eq!(entry.action, ActivityAction::Updated);
    assert_eq!(entry.reservation_id, before.id());
    assert_eq!(entry.field_changes.len(), 1);
    let change = entry.field_changes.get("notes").expect("notes diff");
    assert_eq!(change.old, "");
    assert_eq!(change.new, "allergy: nuts");
}

#[test]
fn reschedule_diffs_use_normalized_date_and_time() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    let mut after = before.clone();
    after
        .apply_edit(
            ReservationChanges {
                slot: Some(slot(date(2025, 8, 27), time(19, 30))),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");

    let changes = field_changes(&before, &after);
    assert_eq!(changes.len(), 2);
    let moved_date = changes.get("reservation_date").expect("date diff");
    assert_eq!(moved_date.old, "2025-08-26");
    assert_eq!(moved_date.new, "2025-08-27");
    let moved_time = changes.get("reservation_time").expect("time diff");
    assert_eq!(moved_time.old, "18:00");
    assert_eq!(moved_time.new, "19:30");
}

#[test]
fn duration_diffs_keep_the_indefinite_sentinel_distinct() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        ReservationDuration::Indefinite,
        &clock,
    );
    let mut after = before.clone();
    after
        .apply_edit(
            ReservationChanges {
                duration: Some(finite(25)),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");

    let changes = field_changes(&before, &after);
    let duration = changes.get("duration_hours").expect("duration diff");
    assert_eq!(duration.old, "-1");
    assert_eq!(duration.new, "2.5");
}

#[test]
fn clearing_the_phone_number_diffs_against_the_empty_string() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let mut before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    before
        .apply_edit(
            ReservationChanges {
                guest_phone: Some(Some("01632 960123".to_owned())),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");
    let mut after = before.clone();
    after
        .apply_edit(
            ReservationChanges {
                guest_phone: Some(None),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");

    let changes = field_changes(&before, &after);
    let phone = changes.get("guest_phone").expect("phone diff");
    assert_eq!(phone.old, "01632 960123");
    assert_eq!(phone.new, "");
}

#[test]
fn explicit_completion_excludes_the_status_duration_pair() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        ReservationDuration::Indefinite,
        &clock,
    );
    let mut after = before.clone();
    after
        .complete(at(2025, 8, 26, 21, 0), &clock)
        .expect("completion succeeds");

    // Status flipped and the indefinite duration was finalized, yet neither
    // belongs in the staff-visible history.
    assert_eq!(
        log_entry(&before, &after, MutationKind::Completion, &clock),
        None
    );
}

#[test]
fn completion_with_a_rename_still_logs_the_rename() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    let mut after = before.clone();
    after
        .apply_edit(
            ReservationChanges {
                guest_name: Some(GuestName::new("Morgan-Leigh").expect("valid name")),
                ..ReservationChanges::default()
            },
            &clock,
        )
        .expect("edit succeeds");
    after
        .complete(at(2025, 8, 26, 20, 30), &clock)
        .expect("completion succeeds");

    let entry = log_entry(&before, &after, MutationKind::Completion, &clock)
        .expect("the rename survives the completion exclusion");
    assert_eq!(entry.field_changes.len(), 1);
    assert!(entry.field_changes.contains_key("guest_name"));
}

#[test]
fn cancellation_is_always_logged_with_a_full_snapshot() {
    let clock = FixedClock::at(at(2025, 8, 26, 10, 0));
    let before = booked(
        corner_table().id(),
        slot(date(2025, 8, 26), time(18, 0)),
        finite(20),
        &clock,
    );
    let mut after = before.clone();
    after.cancel(&clock).expect("cancel succeeds");

    let entry = cancellation_entry(&before, &after, &clock);
    assert_eq!(entry.action, ActivityAction::Cancelled);
    assert_eq!(entry.reservation_id, before.id());
    assert_eq!(entry.snapshot["status"], "cancelled");
    assert_eq!(entry.snapshot["guest_name"], "Morgan");
    assert_eq!(entry.snapshot["party_size"], 2);
    assert_eq!(entry.snapshot["duration_hours"], "2.0");
    assert_eq!(entry.snapshot["reservation_date"], "2025-08-26");
}
