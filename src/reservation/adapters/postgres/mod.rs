//! `PostgreSQL` adapters for reservation persistence.
//!
//! Schema DDL, including the `reservations_no_overlap` trigger, lives in
//! the `migrations/` directory at the repository root.

mod models;
mod repository;
mod schema;

pub use repository::{OVERLAP_CONSTRAINT, PostgresReservationRepository, ReservationPgPool};
