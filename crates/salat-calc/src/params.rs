//! Calculation parameters
//!
//! Named method presets for the Fajr/Isha twilight angles, the Asr
//! jurisprudential school, high-latitude corrections, the midnight
//! definition, and per-prayer manual tuning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::prayer::Prayer;

/// How a twilight-bound event (Maghrib, Isha) is defined by a method:
/// either a solar depression angle, or fixed minutes after its anchor
/// (Sunset for Maghrib, Maghrib for Isha).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TwilightRule {
    Angle(f64),
    Minutes(f64),
}

impl TwilightRule {
    /// Numeric value used for the high-latitude night portion. Minute
    /// based rules contribute their minute count, same as angle degrees.
    pub(crate) fn value(&self) -> f64 {
        match *self {
            TwilightRule::Angle(v) | TwilightRule::Minutes(v) => v,
        }
    }
}

/// How Imsak is defined: minutes before Fajr (the common convention) or
/// its own depression angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImsakRule {
    /// Fixed minutes before Fajr
    MinutesBeforeFajr(f64),
    /// Solar depression angle in degrees
    Angle(f64),
}

impl Default for ImsakRule {
    fn default() -> Self {
        ImsakRule::MinutesBeforeFajr(10.0)
    }
}

/// Named calculation method preset
///
/// Each preset selects the Fajr twilight angle and the Maghrib/Isha rules
/// of a recognized calculation authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Muslim World League
    #[default]
    Mwl,
    /// Islamic Society of North America
    Isna,
    /// Egyptian General Authority of Survey
    Egypt,
    /// Umm Al-Qura University, Makkah
    Makkah,
    /// University of Islamic Sciences, Karachi
    Karachi,
    /// Institute of Geophysics, University of Tehran
    Tehran,
    /// Shia Ithna-Ashari, Leva Institute, Qum
    Jafari,
}

/// The angle/minute rules a method preset supplies
#[derive(Debug, Clone, Copy)]
pub(crate) struct MethodRules {
    pub fajr_angle: f64,
    pub maghrib: TwilightRule,
    pub isha: TwilightRule,
    pub midnight: MidnightMode,
}

impl CalculationMethod {
    pub(crate) fn rules(&self) -> MethodRules {
        use TwilightRule::{Angle, Minutes};
        match self {
            CalculationMethod::Mwl => MethodRules {
                fajr_angle: 18.0,
                maghrib: Minutes(0.0),
                isha: Angle(17.0),
                midnight: MidnightMode::Standard,
            },
            CalculationMethod::Isna => MethodRules {
                fajr_angle: 15.0,
                maghrib: Minutes(0.0),
                isha: Angle(15.0),
                midnight: MidnightMode::Standard,
            },
            CalculationMethod::Egypt => MethodRules {
                fajr_angle: 19.5,
                maghrib: Minutes(0.0),
                isha: Angle(17.5),
                midnight: MidnightMode::Standard,
            },
            CalculationMethod::Makkah => MethodRules {
                fajr_angle: 18.5,
                maghrib: Minutes(0.0),
                isha: Minutes(90.0),
                midnight: MidnightMode::Standard,
            },
            CalculationMethod::Karachi => MethodRules {
                fajr_angle: 18.0,
                maghrib: Minutes(0.0),
                isha: Angle(18.0),
                midnight: MidnightMode::Standard,
            },
            CalculationMethod::Tehran => MethodRules {
                fajr_angle: 17.7,
                maghrib: Angle(4.5),
                isha: Angle(14.0),
                midnight: MidnightMode::Jafari,
            },
            CalculationMethod::Jafari => MethodRules {
                fajr_angle: 16.0,
                maghrib: Angle(4.0),
                isha: Angle(14.0),
                midnight: MidnightMode::Jafari,
            },
        }
    }
}

/// Asr jurisprudential school, setting the shadow-length multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AsrSchool {
    /// Shafi'i, Maliki, Ja'fari, Hanbali: shadow factor 1
    #[default]
    Standard,
    /// Hanafi: shadow factor 2
    Hanafi,
}

impl AsrSchool {
    pub(crate) fn shadow_factor(&self) -> f64 {
        match self {
            AsrSchool::Standard => 1.0,
            AsrSchool::Hanafi => 2.0,
        }
    }
}

/// Correction policy for latitudes where twilight angles are never reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HighLatitudeRule {
    /// No correction; undefined events stay undefined
    None,
    /// Clamp twilight events to half the night
    #[default]
    NightMiddle,
    /// Twilight portion proportional to the event's angle (angle/60 of
    /// the night)
    AngleBased,
    /// Clamp twilight events to one seventh of the night
    OneSeventh,
}

/// Which interval's midpoint defines Islamic midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MidnightMode {
    /// Midpoint of Sunset to Sunrise
    #[default]
    Standard,
    /// Midpoint of Sunset to Fajr
    Jafari,
}

/// Per-prayer manual tuning offsets in signed minutes
///
/// Applied last, on top of the computed base times. Absent prayers are
/// zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TuneOffsets {
    offsets: BTreeMap<Prayer, i32>,
}

impl TuneOffsets {
    /// No tuning
    pub fn none() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, prayer: Prayer, minutes: i32) -> Self {
        self.set(prayer, minutes);
        self
    }

    /// Set the offset for one prayer
    pub fn set(&mut self, prayer: Prayer, minutes: i32) {
        if minutes == 0 {
            self.offsets.remove(&prayer);
        } else {
            self.offsets.insert(prayer, minutes);
        }
    }

    /// Offset in minutes for a prayer, zero if unset
    pub fn get(&self, prayer: Prayer) -> i32 {
        self.offsets.get(&prayer).copied().unwrap_or(0)
    }

    /// True if every offset is zero
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Full parameter set for one computation
///
/// All fields have documented defaults; a `Default` value reproduces the
/// Muslim World League method with the standard Asr school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcParams {
    /// Named method preset
    pub method: CalculationMethod,
    /// Override of the preset's Fajr angle, in degrees
    pub fajr_angle: Option<f64>,
    /// Override of the preset's Isha angle, in degrees
    pub isha_angle: Option<f64>,
    /// Asr shadow-length school
    pub asr_school: AsrSchool,
    /// High-latitude correction policy
    pub high_latitude_rule: HighLatitudeRule,
    /// Midnight definition; overrides the preset's default
    pub midnight_mode: MidnightMode,
    /// Imsak rule
    pub imsak: ImsakRule,
    /// Minutes added to solar noon for Dhuhr
    pub dhuhr_minutes: f64,
    /// Manual per-prayer tuning
    pub tune: TuneOffsets,
}

impl Default for CalcParams {
    fn default() -> Self {
        Self {
            method: CalculationMethod::default(),
            fajr_angle: None,
            isha_angle: None,
            asr_school: AsrSchool::default(),
            high_latitude_rule: HighLatitudeRule::default(),
            midnight_mode: MidnightMode::default(),
            imsak: ImsakRule::default(),
            dhuhr_minutes: 0.0,
            tune: TuneOffsets::none(),
        }
    }
}

impl CalcParams {
    /// Parameters for a method preset, taking the preset's midnight mode
    pub fn for_method(method: CalculationMethod) -> Self {
        Self {
            method,
            midnight_mode: method.rules().midnight,
            ..Self::default()
        }
    }

    /// Effective Fajr angle after overrides
    pub(crate) fn effective_fajr_angle(&self) -> f64 {
        self.fajr_angle.unwrap_or(self.method.rules().fajr_angle)
    }

    /// Effective Isha rule after overrides
    pub(crate) fn effective_isha(&self) -> TwilightRule {
        match self.isha_angle {
            Some(angle) => TwilightRule::Angle(angle),
            None => self.method.rules().isha,
        }
    }
}
