//! Setup-time errors

use salat_calc::CalcError;
use salat_coordinator::UpdateError;
use thiserror::Error;

/// Result type for lifecycle operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Errors surfaced at entry setup
///
/// Configuration problems fail fast here; only transient calculation
/// failures are deferred to the coordinator's retry loop.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Out-of-range coordinates or elevation
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] CalcError),

    /// Malformed options (unknown enum value, wrong type)
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// No entry registered under this id
    #[error("entry not found: {0}")]
    NotFound(String),

    /// Entry already registered under this id
    #[error("entry already set up: {0}")]
    AlreadySetUp(String),

    /// The initial refresh failed
    #[error("first refresh failed: {0}")]
    FirstRefresh(#[from] UpdateError),
}
