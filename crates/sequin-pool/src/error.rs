//! Pool error types.

use sequin_driver::DriverError;
use thiserror::Error;

/// Errors produced by the pool.
///
/// Exhaustion is deliberately not represented here: an exhausted pool is a
/// normal condition reported as `Ok(None)` by [`crate::Pool::try_acquire`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool could not be filled at construction time.
    #[error("failed to establish connection pool: {0}")]
    Setup(#[source] DriverError),

    /// The pool has been closed.
    #[error("connection pool is closed")]
    Closed,

    /// A driver fault occurred while preparing a checkout.
    #[error(transparent)]
    Driver(#[from] DriverError),
}
