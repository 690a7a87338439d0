//! Entry options
//!
//! All options are optional with documented defaults; the defaults
//! reproduce the deployed instance this integration was written for:
//! Alexandria (31.2156 N, 29.9553 E) on Cairo time, MWL with the Fajr and
//! Isha angles overridden to 19.5/17.5 degrees, and Maghrib announced 15
//! minutes before computed sunset.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use salat_calc::{
    AsrSchool, CalcParams, CalculationMethod, HighLatitudeRule, ImsakRule, Location,
    MidnightMode, Prayer, TuneOffsets,
};
use salat_coordinator::CoordinatorConfig;

use crate::error::{SetupError, SetupResult};

/// User-configurable options of one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerOptions {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name of the location
    pub timezone: Tz,
    #[serde(rename = "calculation_method")]
    pub calc_method: CalculationMethod,
    /// Override of the method's Fajr angle, degrees
    pub fajr_angle: Option<f64>,
    /// Override of the method's Isha angle, degrees
    pub isha_angle: Option<f64>,
    pub school: AsrSchool,
    #[serde(rename = "latitude_adjustment_method")]
    pub lat_adj_method: HighLatitudeRule,
    pub midnight_mode: MidnightMode,
    /// Calculation-level tuning, minutes per prayer
    pub tune: TuneOffsets,
    /// Display-level overrides, minutes per prayer, applied after the
    /// calculation
    pub display_adjustments: TuneOffsets,
}

impl Default for PrayerOptions {
    fn default() -> Self {
        Self {
            latitude: 31.2156,
            longitude: 29.9553,
            timezone: chrono_tz::Africa::Cairo,
            calc_method: CalculationMethod::Mwl,
            fajr_angle: Some(19.5),
            isha_angle: Some(17.5),
            school: AsrSchool::Standard,
            lat_adj_method: HighLatitudeRule::NightMiddle,
            midnight_mode: MidnightMode::Standard,
            tune: TuneOffsets::none(),
            // The documented local convention: Maghrib is announced 15
            // minutes before computed sunset.
            display_adjustments: TuneOffsets::none().with(Prayer::Maghrib, -15),
        }
    }
}

impl PrayerOptions {
    /// Parse options from a JSON object, rejecting unknown enum values
    pub fn from_json(value: serde_json::Value) -> SetupResult<Self> {
        serde_json::from_value(value).map_err(|err| SetupError::InvalidOptions(err.to_string()))
    }

    /// Validate and convert into a coordinator configuration
    ///
    /// Out-of-range coordinates fail here, at setup time, never inside a
    /// scheduled refresh.
    pub fn coordinator_config(&self) -> SetupResult<CoordinatorConfig> {
        let location = Location::new(self.latitude, self.longitude)?;
        Ok(CoordinatorConfig {
            location,
            timezone: self.timezone,
            params: CalcParams {
                method: self.calc_method,
                fajr_angle: self.fajr_angle,
                isha_angle: self.isha_angle,
                asr_school: self.school,
                high_latitude_rule: self.lat_adj_method,
                midnight_mode: self.midnight_mode,
                imsak: ImsakRule::default(),
                dhuhr_minutes: 0.0,
                tune: self.tune.clone(),
            },
            display_adjustments: self.display_adjustments.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_reproduce_deployed_instance() {
        let options = PrayerOptions::default();
        assert_eq!(options.latitude, 31.2156);
        assert_eq!(options.longitude, 29.9553);
        assert_eq!(options.timezone, chrono_tz::Africa::Cairo);
        assert_eq!(options.fajr_angle, Some(19.5));
        assert_eq!(options.isha_angle, Some(17.5));
        assert_eq!(options.display_adjustments.get(Prayer::Maghrib), -15);

        let config = options.coordinator_config().unwrap();
        assert_eq!(config.params.method, CalculationMethod::Mwl);
        assert_eq!(config.params.asr_school, AsrSchool::Standard);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options = PrayerOptions::from_json(json!({
            "calculation_method": "karachi",
            "school": "hanafi",
        }))
        .unwrap();
        assert_eq!(options.calc_method, CalculationMethod::Karachi);
        assert_eq!(options.school, AsrSchool::Hanafi);
        assert_eq!(options.latitude, 31.2156);
    }

    #[test]
    fn test_unknown_enum_value_fails_fast() {
        let result = PrayerOptions::from_json(json!({
            "latitude_adjustment_method": "extrapolate"
        }));
        assert!(matches!(result, Err(SetupError::InvalidOptions(_))));
    }

    #[test]
    fn test_out_of_range_coordinates_fail_fast() {
        let options = PrayerOptions {
            latitude: 95.0,
            ..PrayerOptions::default()
        };
        assert!(matches!(
            options.coordinator_config(),
            Err(SetupError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_tune_roundtrip() {
        let options = PrayerOptions::from_json(json!({
            "tune": { "fajr": 2, "isha": -3 }
        }))
        .unwrap();
        assert_eq!(options.tune.get(Prayer::Fajr), 2);
        assert_eq!(options.tune.get(Prayer::Isha), -3);
    }
}
