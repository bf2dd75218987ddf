//! Port contracts for reservation scheduling.
//!
//! Ports define infrastructure-agnostic interfaces used by the scheduling
//! services.

pub mod repository;

pub use repository::{
    ReservationRepository, ReservationRepositoryError, ReservationRepositoryResult,
    TableDirectory, TableDirectoryError, TableDirectoryResult,
};
