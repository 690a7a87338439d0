//! Tabular Hijri calendar conversion
//!
//! Civil (Friday-epoch) tabular Islamic calendar, the common arithmetic
//! approximation: 11 leap years of 355 days per 30-year cycle. Reported
//! alongside the prayer times as auxiliary metadata; actual month starts
//! depend on moon sighting and may differ by a day.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month names of the Islamic calendar
const MONTH_NAMES: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

/// A date in the civil tabular Islamic calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HijriDate {
    pub year: i64,
    /// 1-based month
    pub month: u32,
    /// 1-based day of month
    pub day: u32,
}

impl HijriDate {
    /// Convert a Gregorian date
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let jdn = gregorian_jdn(date.year() as i64, date.month() as i64, date.day() as i64);

        // Kuwaiti algorithm: integer arithmetic over the 10631-day
        // 30-year cycle, epoch JDN 1948440 (16 July 622 Julian).
        let l = jdn - 1948440 + 10632;
        let n = (l - 1).div_euclid(10631);
        let l = l - 10631 * n + 354;
        let j = ((10985 - l) / 5316) * ((50 * l) / 17719) + (l / 5670) * ((43 * l) / 15238);
        let l = l - ((30 - j) / 15) * ((17719 * j) / 50) - (j / 16) * ((15238 * j) / 43) + 29;
        let month = (24 * l) / 709;
        let day = l - (709 * month) / 24;
        let year = 30 * n + j - 30;

        Self {
            year,
            month: month as u32,
            day: day as u32,
        }
    }

    /// English name of the month
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize - 1).min(11)]
    }
}

/// Julian day number of a proleptic Gregorian date
fn gregorian_jdn(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

impl fmt::Display for HijriDate {
    /// Day-month-year, zero padded: "DD-MM-YYYY"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{}", self.day, self.month, self.year)
    }
}
