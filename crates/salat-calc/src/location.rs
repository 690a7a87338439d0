//! Geographic location

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// A fixed observation point on Earth
///
/// Immutable once constructed; validation happens here so that a bad
/// coordinate is a setup-time error and never reaches the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in signed degrees, north positive
    pub latitude: f64,
    /// Longitude in signed degrees, east positive
    pub longitude: f64,
    /// Elevation above sea level in meters, used for the sunrise/sunset
    /// refraction term
    #[serde(default)]
    pub elevation: f64,
}

impl Location {
    /// Create a location at sea level
    pub fn new(latitude: f64, longitude: f64) -> CalcResult<Self> {
        Self::with_elevation(latitude, longitude, 0.0)
    }

    /// Create a location with an explicit elevation in meters
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> CalcResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) || latitude.is_nan() {
            return Err(CalcError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || longitude.is_nan() {
            return Err(CalcError::InvalidLongitude(longitude));
        }
        if !(elevation >= 0.0) {
            return Err(CalcError::InvalidElevation(elevation));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }
}
