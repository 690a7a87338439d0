//! Error types for the refresh coordinator

use salat_calc::CalcError;
use thiserror::Error;

/// Result type for refresh operations
pub type UpdateResult<T> = Result<T, UpdateError>;

/// A failed refresh attempt
///
/// This is the "update failed" signal consumers use to mark themselves
/// unavailable; it never crosses the component boundary as a panic, and
/// the coordinator keeps retrying on a fixed delay.
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    /// The calculation itself failed for the whole day
    #[error("prayer time calculation failed: {0}")]
    Calculation(#[from] CalcError),

    /// The blocking calculation task was cancelled or panicked
    #[error("calculation task failed: {0}")]
    Task(String),

    /// Refresh requested after shutdown
    #[error("coordinator is shut down")]
    ShutDown,
}
