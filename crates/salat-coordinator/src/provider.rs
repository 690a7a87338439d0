//! Prayer time source abstraction
//!
//! The coordinator computes through this trait; the default
//! implementation wraps the pure calculator, while tests substitute
//! failing or canned providers.

use chrono::NaiveDate;
use salat_calc::{compute, CalcParams, CalcResult, HijriDate, Location, PrayerTimeSet};

/// One day's computed schedule plus its auxiliary calendar metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule {
    /// Local clock times of the defined events
    pub times: PrayerTimeSet,
    /// The Islamic calendar date of the same day
    pub hijri_date: HijriDate,
}

/// Something that can produce a day's prayer schedule
pub trait PrayerTimesProvider: Send + Sync + 'static {
    /// Compute the schedule for `date` with the local UTC offset in
    /// fractional hours (DST already resolved by the caller)
    fn daily_schedule(&self, date: NaiveDate, utc_offset_hours: f64) -> CalcResult<DailySchedule>;
}

/// The standard provider: astronomical calculation for a fixed location
#[derive(Debug, Clone)]
pub struct Calculator {
    location: Location,
    params: CalcParams,
}

impl Calculator {
    pub fn new(location: Location, params: CalcParams) -> Self {
        Self { location, params }
    }
}

impl PrayerTimesProvider for Calculator {
    fn daily_schedule(&self, date: NaiveDate, utc_offset_hours: f64) -> CalcResult<DailySchedule> {
        let times = compute(date, &self.location, utc_offset_hours, &self.params)?;
        Ok(DailySchedule {
            times,
            hijri_date: HijriDate::from_gregorian(date),
        })
    }
}
