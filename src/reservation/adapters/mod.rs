//! Adapter implementations of the reservation ports.

pub mod memory;
pub mod postgres;
