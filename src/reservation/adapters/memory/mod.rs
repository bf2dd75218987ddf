//! In-memory adapters for tests and embedded use.

mod store;

pub use store::InMemoryReservationStore;
