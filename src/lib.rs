//! Taproom: pub table reservation scheduling engine.
//!
//! This crate provides the core scheduling logic for booking physical
//! tables within fixed operating hours: conflict detection across
//! midnight, indefinite-duration reservations, race-safe booking, and
//! the auto-completion sweep.
//!
//! # Architecture
//!
//! Taproom follows hexagonal architecture principles:
//!
//! - **Domain**: Pure scheduling logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage interactions
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`,
//!   in-memory)
//!
//! Floor-plan rendering, staff management, and authentication live with
//! the surrounding application; they call into this engine through the
//! service layer in [`reservation::services`].

pub mod reservation;
