//! Auto-completion sweep closing expired reservations.
//!
//! Invoked on an external cadence; each run is bounded and self-contained,
//! and every row update is conditioned on the row still being active, so
//! overlapping or repeated runs settle each reservation exactly once.
//! Sweep mutations are system-initiated and never produce audit entries.

use crate::reservation::ports::{ReservationRepository, ReservationRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

use super::venue_now;

/// Service-level errors for the auto-completion sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ReservationRepositoryError),
}

/// Result type for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Auto-completion sweep service.
#[derive(Clone)]
pub struct AutoCompletionService<R, C>
where
    R: ReservationRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> AutoCompletionService<R, C>
where
    R: ReservationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new sweep service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Closes every expired reservation and returns how many rows this
    /// invocation completed.
    ///
    /// Finite reservations complete once their interval end has passed,
    /// keeping their declared duration. Indefinite reservations complete
    /// six hours after their start, recording the elapsed stay clamped to
    /// the six-hour billing cap.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Repository`] when listing or updating rows
    /// fails; rows already settled by a concurrent run are skipped, not
    /// errors.
    pub async fn run(&self) -> SweepResult<usize> {
        let now = venue_now(&*self.clock);
        let mut completed = 0_usize;

        for reservation in self.repository.list_active().await? {
            let Some(final_duration) = reservation.auto_completion_outcome(now) else {
                continue;
            };
            let settled = self
                .repository
                .complete_if_active(reservation.id(), final_duration, self.clock.utc())
                .await?;
            if settled {
                tracing::debug!(
                    reservation_id = %reservation.id(),
                    duration = %final_duration,
                    "auto-completed expired reservation"
                );
                completed += 1;
            }
        }

        if completed > 0 {
            tracing::info!(completed, "auto-completion sweep finished");
        }
        Ok(completed)
    }
}
