//! Prayer and daily event names

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named event of the daily prayer schedule
///
/// The ordering of variants is the expected daily sequence; `Ord` follows
/// it, so sorted containers iterate the day in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Prayer {
    Imsak,
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Sunset,
    Maghrib,
    Isha,
    Midnight,
}

impl Prayer {
    /// All events in daily order
    pub const ALL: [Prayer; 9] = [
        Prayer::Imsak,
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Sunset,
        Prayer::Maghrib,
        Prayer::Isha,
        Prayer::Midnight,
    ];

    /// Snake-case name, matching the serde form
    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Imsak => "imsak",
            Prayer::Fajr => "fajr",
            Prayer::Sunrise => "sunrise",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Sunset => "sunset",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
            Prayer::Midnight => "midnight",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown prayer name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown prayer name: {0}")]
pub struct PrayerParseError(pub String);

impl FromStr for Prayer {
    type Err = PrayerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prayer::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| PrayerParseError(s.to_string()))
    }
}
