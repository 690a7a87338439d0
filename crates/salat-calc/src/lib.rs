//! Core types and prayer time calculation
//!
//! This crate provides the pure computational core of the prayer times
//! service: geographic location and calculation parameter types, the
//! solar-ephemeris based calculator, and a tabular Hijri calendar
//! conversion. It has no notion of scheduling or host integration;
//! `compute` is deterministic for a given (date, location, params) input.

mod astronomy;
mod error;
mod hijri;
mod location;
mod params;
mod prayer;
mod times;

pub use error::{CalcError, CalcResult};
pub use hijri::HijriDate;
pub use location::Location;
pub use params::{
    AsrSchool, CalcParams, CalculationMethod, HighLatitudeRule, ImsakRule, MidnightMode,
    TuneOffsets,
};
pub use prayer::{Prayer, PrayerParseError};
pub use times::{compute, PrayerTimeSet};
