//! Diesel schema for reservation persistence.

diesel::table! {
    /// Reservation rows; the `reservations_no_overlap` trigger rejects any
    /// write creating overlapping active intervals on one table.
    reservations (id) {
        /// Reservation identifier.
        id -> Uuid,
        /// Booked table.
        table_id -> Uuid,
        /// Calendar date of the start.
        reservation_date -> Date,
        /// Local start time, slot-aligned.
        reservation_time -> Time,
        /// Decimal hours; `-1` is the indefinite sentinel.
        duration_hours -> Float8,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Guest the booking is held under.
        #[max_length = 255]
        guest_name -> Varchar,
        /// Optional contact number.
        #[max_length = 50]
        guest_phone -> Nullable<Varchar>,
        /// Number of guests.
        party_size -> Int4,
        /// Free-form staff notes.
        notes -> Text,
        /// Staff member who took the booking.
        #[max_length = 255]
        created_by -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable audit entries for staff mutations.
    activity_log (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Reservation the action applied to.
        reservation_id -> Uuid,
        /// Action kind: `updated` or `cancelled`.
        #[max_length = 20]
        action -> Varchar,
        /// Normalized old/new pairs for changed fields.
        field_changes -> Jsonb,
        /// Full reservation snapshot at the time of the action.
        snapshot -> Jsonb,
        /// When the action happened.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Physical tables on the floor.
    dining_tables (id) {
        /// Table identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 100]
        display_name -> Varchar,
        /// Seating capacity.
        capacity -> Int4,
    }
}

diesel::joinable!(activity_log -> reservations (reservation_id));
diesel::allow_tables_to_appear_in_same_query!(reservations, activity_log, dining_tables);
