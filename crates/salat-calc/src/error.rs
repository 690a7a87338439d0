//! Error types for prayer time calculation

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for calculation operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors that can occur while computing prayer times
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Latitude outside [-90, 90]
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),

    /// Negative elevation is rejected; the refraction term takes its
    /// square root
    #[error("elevation {0} must be non-negative")]
    InvalidElevation(f64),

    /// Every event of the day was astronomically undefined
    #[error("no valid prayer times for {date}")]
    NoValidTimes { date: NaiveDate },
}
