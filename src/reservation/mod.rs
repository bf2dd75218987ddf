//! Table reservation scheduling for the pub floor.
//!
//! This module implements the scheduling engine: temporal interval
//! arithmetic across midnight, indefinite-duration semantics, race-safe
//! booking backed by the storage overlap constraint, cross-day
//! availability resolution, the idempotent auto-completion sweep, and the
//! filtered activity audit log. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
