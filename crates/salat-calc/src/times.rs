//! Daily prayer time computation
//!
//! Implements the praytimes.org v2.3 algorithm: each event is found by
//! inverting the sun's hour angle at a target depression angle on the
//! local solar day, then shifted into the requested UTC offset. Events
//! that never occur (extreme latitudes) come out as NaN and are omitted
//! from the result set rather than reported as garbage.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::astronomy::{
    darccos, darccot, dcos, dsin, dtan, fix_hour, julian_day, sun_position,
};
use crate::error::{CalcError, CalcResult};
use crate::location::Location;
use crate::params::{CalcParams, HighLatitudeRule, ImsakRule, MidnightMode, TwilightRule};
use crate::prayer::Prayer;

/// The computed times of one day
///
/// Maps each defined event to its local clock time. Undefined events are
/// simply absent; `Prayer`'s ordering makes iteration follow the daily
/// sequence. Times past local midnight (typically the Midnight event)
/// wrap into [00:00, 24:00).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrayerTimeSet {
    times: BTreeMap<Prayer, NaiveTime>,
}

impl PrayerTimeSet {
    /// Local clock time of an event, `None` if undefined for this day
    pub fn get(&self, prayer: Prayer) -> Option<NaiveTime> {
        self.times.get(&prayer).copied()
    }

    /// Iterate over defined events in daily order
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        self.times.iter().map(|(p, t)| (*p, *t))
    }

    /// Number of defined events
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if no event is defined
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn insert(&mut self, prayer: Prayer, time: NaiveTime) {
        self.times.insert(prayer, time);
    }
}

/// Compute the prayer times for one Gregorian date
///
/// Pure and deterministic: identical inputs yield identical outputs.
/// `utc_offset_hours` is the local offset from UTC for that date (the
/// caller resolves DST). Returns `Err` only when not a single event of
/// the day could be computed.
pub fn compute(
    date: NaiveDate,
    location: &Location,
    utc_offset_hours: f64,
    params: &CalcParams,
) -> CalcResult<PrayerTimeSet> {
    let day = SolarDay {
        jdate: julian_day(date.year(), date.month(), date.day())
            - location.longitude / (15.0 * 24.0),
        latitude: location.latitude,
    };

    let fajr_angle = params.effective_fajr_angle();
    let isha_rule = params.effective_isha();
    let maghrib_rule = params.method.rules().maghrib;
    // 0.833 degrees of standard refraction plus an elevation dip term
    let horizon_angle = 0.833 + 0.0347 * location.elevation.sqrt();

    // Raw event times on the local solar day, from day-portion estimates
    // of when each event roughly occurs.
    let mut imsak = match params.imsak {
        ImsakRule::Angle(angle) => day.sun_angle_time(angle, 5.0 / 24.0, Direction::Dawn),
        ImsakRule::MinutesBeforeFajr(_) => f64::NAN,
    };
    let mut fajr = day.sun_angle_time(fajr_angle, 5.0 / 24.0, Direction::Dawn);
    let mut sunrise = day.sun_angle_time(horizon_angle, 6.0 / 24.0, Direction::Dawn);
    let mut dhuhr = day.mid_day(12.0 / 24.0);
    let mut asr = day.asr_time(params.asr_school.shadow_factor(), 13.0 / 24.0);
    let mut sunset = day.sun_angle_time(horizon_angle, 18.0 / 24.0, Direction::Dusk);
    let mut maghrib = match maghrib_rule {
        TwilightRule::Angle(angle) => day.sun_angle_time(angle, 18.0 / 24.0, Direction::Dusk),
        TwilightRule::Minutes(_) => f64::NAN,
    };
    let mut isha = match isha_rule {
        TwilightRule::Angle(angle) => day.sun_angle_time(angle, 18.0 / 24.0, Direction::Dusk),
        TwilightRule::Minutes(_) => f64::NAN,
    };

    // Shift from local solar time into the requested clock offset.
    let tz_adjust = utc_offset_hours - location.longitude / 15.0;
    for time in [
        &mut imsak,
        &mut fajr,
        &mut sunrise,
        &mut dhuhr,
        &mut asr,
        &mut sunset,
        &mut maghrib,
        &mut isha,
    ] {
        *time += tz_adjust;
    }
    dhuhr += params.dhuhr_minutes / 60.0;

    if params.high_latitude_rule != HighLatitudeRule::None {
        let rule = params.high_latitude_rule;
        let night = fix_hour(sunrise - sunset);
        let imsak_value = match params.imsak {
            ImsakRule::Angle(angle) => angle,
            ImsakRule::MinutesBeforeFajr(minutes) => minutes,
        };
        imsak = adjust_high_lat(imsak, sunrise, imsak_value, night, Direction::Dawn, rule);
        fajr = adjust_high_lat(fajr, sunrise, fajr_angle, night, Direction::Dawn, rule);
        isha = adjust_high_lat(isha, sunset, isha_rule.value(), night, Direction::Dusk, rule);
        maghrib = adjust_high_lat(
            maghrib,
            sunset,
            maghrib_rule.value(),
            night,
            Direction::Dusk,
            rule,
        );
    }

    // Minute-based rules resolve last, anchored on the adjusted times:
    // Imsak follows the clamped Fajr, and a fixed-minute Maghrib or Isha
    // overwrites whatever the high-latitude pass produced for it.
    if let TwilightRule::Minutes(minutes) = maghrib_rule {
        maghrib = sunset + minutes / 60.0;
    }
    if let TwilightRule::Minutes(minutes) = isha_rule {
        isha = maghrib + minutes / 60.0;
    }
    if let ImsakRule::MinutesBeforeFajr(minutes) = params.imsak {
        imsak = fajr - minutes / 60.0;
    }

    let midnight = match params.midnight_mode {
        MidnightMode::Standard => sunset + fix_hour(sunrise - sunset) / 2.0,
        MidnightMode::Jafari => sunset + fix_hour(fajr - sunset) / 2.0,
    };

    let mut set = PrayerTimeSet::default();
    let computed = [
        (Prayer::Imsak, imsak),
        (Prayer::Fajr, fajr),
        (Prayer::Sunrise, sunrise),
        (Prayer::Dhuhr, dhuhr),
        (Prayer::Asr, asr),
        (Prayer::Sunset, sunset),
        (Prayer::Maghrib, maghrib),
        (Prayer::Isha, isha),
        (Prayer::Midnight, midnight),
    ];
    for (prayer, hours) in computed {
        let tuned = hours + f64::from(params.tune.get(prayer)) / 60.0;
        if let Some(time) = to_clock_time(tuned) {
            set.insert(prayer, time);
        }
    }

    if set.is_empty() {
        return Err(CalcError::NoValidTimes { date });
    }
    Ok(set)
}

/// Whether an event precedes (dawn side) or follows (dusk side) solar noon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Dawn,
    Dusk,
}

/// One date's solar geometry at a fixed latitude
struct SolarDay {
    /// Julian day shifted by the longitude's fraction of the day
    jdate: f64,
    latitude: f64,
}

impl SolarDay {
    /// Solar noon as clock hours, evaluated at a fractional-day estimate
    fn mid_day(&self, portion: f64) -> f64 {
        let eqt = sun_position(self.jdate + portion).equation;
        fix_hour(12.0 - eqt)
    }

    /// Clock hours at which the sun reaches `angle` degrees below the
    /// horizon. NaN when the angle is never reached on this day.
    fn sun_angle_time(&self, angle: f64, portion: f64, direction: Direction) -> f64 {
        let declination = sun_position(self.jdate + portion).declination;
        let noon = self.mid_day(portion);
        let cos_hour_angle = (-dsin(angle) - dsin(declination) * dsin(self.latitude))
            / (dcos(declination) * dcos(self.latitude));
        // acos outside [-1, 1] is NaN: the event does not occur.
        let offset = darccos(cos_hour_angle) / 15.0;
        match direction {
            Direction::Dawn => noon - offset,
            Direction::Dusk => noon + offset,
        }
    }

    /// Clock hours of Asr: the moment an object's shadow equals `factor`
    /// times its length plus its noon shadow
    fn asr_time(&self, factor: f64, portion: f64) -> f64 {
        let declination = sun_position(self.jdate + portion).declination;
        let angle = -darccot(factor + dtan((self.latitude - declination).abs()));
        self.sun_angle_time(angle, portion, Direction::Dusk)
    }
}

/// Clamp a twilight event into its night portion, or synthesize it from
/// the base event when undefined
fn adjust_high_lat(
    time: f64,
    base: f64,
    value: f64,
    night: f64,
    direction: Direction,
    rule: HighLatitudeRule,
) -> f64 {
    let portion = match rule {
        HighLatitudeRule::AngleBased => value / 60.0 * night,
        HighLatitudeRule::OneSeventh => night / 7.0,
        HighLatitudeRule::NightMiddle => night / 2.0,
        HighLatitudeRule::None => return time,
    };
    let diff = match direction {
        Direction::Dawn => fix_hour(base - time),
        Direction::Dusk => fix_hour(time - base),
    };
    if time.is_nan() || diff > portion {
        match direction {
            Direction::Dawn => base - portion,
            Direction::Dusk => base + portion,
        }
    } else {
        time
    }
}

/// Fractional hours to a clock time, rounded to the nearest minute and
/// wrapped into one day. NaN (undefined event) maps to None.
fn to_clock_time(hours: f64) -> Option<NaiveTime> {
    if !hours.is_finite() {
        return None;
    }
    let rounded = fix_hour(hours + 0.5 / 60.0);
    let hour = rounded.floor() as u32;
    let minute = ((rounded - rounded.floor()) * 60.0).floor() as u32;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AsrSchool, CalculationMethod, TuneOffsets};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn alexandria() -> Location {
        Location::new(31.2156, 29.9553).unwrap()
    }

    /// The original deployment's parameters: MWL preset with the Fajr and
    /// Isha angles overridden to 19.5 / 17.5 degrees.
    fn alexandria_params() -> CalcParams {
        CalcParams {
            fajr_angle: Some(19.5),
            isha_angle: Some(17.5),
            ..CalcParams::default()
        }
    }

    #[test]
    fn test_alexandria_winter_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let times = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();

        assert_eq!(times.get(Prayer::Imsak), Some(hm(5, 17)));
        assert_eq!(times.get(Prayer::Fajr), Some(hm(5, 27)));
        assert_eq!(times.get(Prayer::Sunrise), Some(hm(6, 59)));
        assert_eq!(times.get(Prayer::Dhuhr), Some(hm(12, 9)));
        assert_eq!(times.get(Prayer::Asr), Some(hm(15, 0)));
        assert_eq!(times.get(Prayer::Sunset), Some(hm(17, 20)));
        assert_eq!(times.get(Prayer::Maghrib), Some(hm(17, 20)));
        assert_eq!(times.get(Prayer::Isha), Some(hm(18, 42)));
        // Wraps past local midnight.
        assert_eq!(times.get(Prayer::Midnight), Some(hm(0, 10)));
    }

    #[test]
    fn test_alexandria_summer_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let times = compute(date, &alexandria(), 3.0, &alexandria_params()).unwrap();

        assert_eq!(times.get(Prayer::Fajr), Some(hm(4, 8)));
        assert_eq!(times.get(Prayer::Dhuhr), Some(hm(13, 2)));
        assert_eq!(times.get(Prayer::Maghrib), Some(hm(20, 7)));
        assert_eq!(times.get(Prayer::Isha), Some(hm(21, 43)));
    }

    #[test]
    fn test_raw_maghrib_equals_sunset_for_mwl() {
        // MWL defines Maghrib as sunset plus zero minutes; the calculator
        // must report them identical. Display-level conventions (such as
        // an earlier announced Maghrib) live outside the calculator.
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let times = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        assert_eq!(times.get(Prayer::Maghrib), times.get(Prayer::Sunset));
    }

    #[test]
    fn test_daily_ordering() {
        let location = alexandria();
        let params = alexandria_params();
        for (year, month, day) in [(2024, 1, 15), (2024, 4, 2), (2024, 6, 21), (2024, 10, 30)] {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let times = compute(date, &location, 2.0, &params).unwrap();
            let ordered: Vec<_> = Prayer::ALL[..8] // midnight wraps
                .iter()
                .filter_map(|p| times.get(*p))
                .collect();
            let mut sorted = ordered.clone();
            sorted.sort();
            assert_eq!(ordered, sorted, "unordered times on {date}");
        }
    }

    #[test]
    fn test_idempotent() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let a = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        let b = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hanafi_asr_is_later() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let standard = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        let hanafi_params = CalcParams {
            asr_school: AsrSchool::Hanafi,
            ..alexandria_params()
        };
        let hanafi = compute(date, &alexandria(), 2.0, &hanafi_params).unwrap();

        assert_eq!(hanafi.get(Prayer::Asr), Some(hm(15, 42)));
        assert!(hanafi.get(Prayer::Asr) > standard.get(Prayer::Asr));
        // Only Asr differs between the schools.
        for prayer in Prayer::ALL {
            if prayer != Prayer::Asr {
                assert_eq!(hanafi.get(prayer), standard.get(prayer), "{prayer}");
            }
        }
    }

    #[test]
    fn test_tune_shifts_only_its_prayer() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let base = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        let tuned_params = CalcParams {
            tune: TuneOffsets::none().with(Prayer::Fajr, 7),
            ..alexandria_params()
        };
        let tuned = compute(date, &alexandria(), 2.0, &tuned_params).unwrap();

        assert_eq!(tuned.get(Prayer::Fajr), Some(hm(5, 34)));
        for prayer in Prayer::ALL {
            if prayer != Prayer::Fajr {
                assert_eq!(tuned.get(prayer), base.get(prayer), "{prayer}");
            }
        }
    }

    #[test]
    fn test_jafari_method() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let params = CalcParams::for_method(CalculationMethod::Jafari);
        let times = compute(date, &alexandria(), 2.0, &params).unwrap();

        // Angle-based Maghrib falls after sunset.
        assert_eq!(times.get(Prayer::Sunset), Some(hm(17, 20)));
        assert_eq!(times.get(Prayer::Maghrib), Some(hm(17, 36)));
        // Jafari midnight is the sunset-to-fajr midpoint, before 24:00 here.
        assert_eq!(times.get(Prayer::Midnight), Some(hm(23, 32)));
    }

    #[test]
    fn test_makkah_isha_is_fixed_minutes() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let location = Location::new(21.3891, 39.8579).unwrap();
        let params = CalcParams::for_method(CalculationMethod::Makkah);
        let times = compute(date, &location, 3.0, &params).unwrap();

        // Isha = Maghrib + 90 minutes.
        assert_eq!(times.get(Prayer::Maghrib), Some(hm(17, 59)));
        assert_eq!(times.get(Prayer::Isha), Some(hm(19, 29)));
    }

    #[test]
    fn test_white_nights_without_adjustment() {
        // Helsinki at midsummer: the sun never reaches 18 degrees below
        // the horizon, so twilight events are undefined but the rest of
        // the day is intact.
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let location = Location::new(60.17, 24.94).unwrap();
        let params = CalcParams {
            high_latitude_rule: HighLatitudeRule::None,
            ..CalcParams::default()
        };
        let times = compute(date, &location, 3.0, &params).unwrap();

        assert_eq!(times.get(Prayer::Fajr), None);
        assert_eq!(times.get(Prayer::Isha), None);
        assert_eq!(times.get(Prayer::Imsak), None);
        assert_eq!(times.get(Prayer::Sunrise), Some(hm(3, 54)));
        assert_eq!(times.get(Prayer::Sunset), Some(hm(22, 50)));
        assert_eq!(times.get(Prayer::Dhuhr), Some(hm(13, 22)));
    }

    #[test]
    fn test_white_nights_high_lat_rules() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let location = Location::new(60.17, 24.94).unwrap();

        let night_middle = compute(date, &location, 3.0, &CalcParams::default()).unwrap();
        assert_eq!(night_middle.get(Prayer::Fajr), Some(hm(1, 22)));
        assert_eq!(night_middle.get(Prayer::Isha), Some(hm(1, 22)));

        let one_seventh = compute(
            date,
            &location,
            3.0,
            &CalcParams {
                high_latitude_rule: HighLatitudeRule::OneSeventh,
                ..CalcParams::default()
            },
        )
        .unwrap();
        assert_eq!(one_seventh.get(Prayer::Fajr), Some(hm(3, 11)));
        assert_eq!(one_seventh.get(Prayer::Isha), Some(hm(23, 34)));

        let angle_based = compute(
            date,
            &location,
            3.0,
            &CalcParams {
                high_latitude_rule: HighLatitudeRule::AngleBased,
                ..CalcParams::default()
            },
        )
        .unwrap();
        assert_eq!(angle_based.get(Prayer::Fajr), Some(hm(2, 23)));
        assert_eq!(angle_based.get(Prayer::Isha), Some(hm(0, 16)));
    }

    #[test]
    fn test_high_lat_imsak_tracks_adjusted_fajr() {
        // Minute-based Imsak anchors on the clamped Fajr, not on the raw
        // (undefined) one, so it still precedes Fajr by its 10 minutes.
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let location = Location::new(60.17, 24.94).unwrap();
        let times = compute(date, &location, 3.0, &CalcParams::default()).unwrap();

        assert_eq!(times.get(Prayer::Fajr), Some(hm(1, 22)));
        assert_eq!(times.get(Prayer::Imsak), Some(hm(1, 12)));
    }

    #[test]
    fn test_polar_day_partial_result() {
        // Longyearbyen at midsummer: no sunrise or sunset at all. Solar
        // noon and Asr are still well defined; nothing panics and no
        // garbage times appear.
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let location = Location::new(78.22, 15.65).unwrap();
        let times = compute(date, &location, 2.0, &CalcParams::default()).unwrap();

        assert_eq!(times.get(Prayer::Sunrise), None);
        assert_eq!(times.get(Prayer::Sunset), None);
        assert_eq!(times.get(Prayer::Maghrib), None);
        assert_eq!(times.get(Prayer::Midnight), None);
        assert_eq!(times.get(Prayer::Dhuhr), Some(hm(12, 59)));
        assert_eq!(times.get(Prayer::Asr), Some(hm(19, 8)));
        assert_eq!(times.len(), 2);
    }

    #[test]
    fn test_utc_offset_shifts_clock_times() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let at_utc2 = compute(date, &alexandria(), 2.0, &alexandria_params()).unwrap();
        let at_utc3 = compute(date, &alexandria(), 3.0, &alexandria_params()).unwrap();
        assert_eq!(at_utc2.get(Prayer::Dhuhr), Some(hm(12, 2)));
        assert_eq!(at_utc3.get(Prayer::Dhuhr), Some(hm(13, 2)));
    }
}
