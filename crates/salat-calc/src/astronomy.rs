//! Low-precision solar ephemeris
//!
//! Sun declination and equation of time from the approximate formulas in
//! the US Naval Observatory's Astronomical Almanac (good to ~1 arcminute,
//! well within a minute of clock time). All angles are in degrees, all
//! clock quantities in fractional hours.

/// Sun position parameters for a given instant
#[derive(Debug, Clone, Copy)]
pub(crate) struct SunPosition {
    /// Declination of the sun in degrees
    pub declination: f64,
    /// Equation of time in hours
    pub equation: f64,
}

/// Julian day number for a Gregorian calendar date (at midnight UT,
/// hence the trailing .5)
pub(crate) fn julian_day(year: i32, month: u32, day: u32) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m as f64 + 1.0)).floor()
        + day as f64
        + b
        - 1524.5
}

/// Compute the sun's declination and the equation of time for a Julian day
pub(crate) fn sun_position(jd: f64) -> SunPosition {
    let d = jd - 2451545.0;

    let g = fix_angle(357.529 + 0.98560028 * d);
    let q = fix_angle(280.459 + 0.98564736 * d);
    let l = fix_angle(q + 1.915 * dsin(g) + 0.020 * dsin(2.0 * g));

    let e = 23.439 - 0.00000036 * d;

    let ra = datan2(dcos(e) * dsin(l), dcos(l)) / 15.0;
    let declination = darcsin(dsin(e) * dsin(l));
    let equation = q / 15.0 - fix_hour(ra);

    SunPosition {
        declination,
        equation,
    }
}

/// Normalize an angle into [0, 360)
pub(crate) fn fix_angle(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Normalize an hour value into [0, 24)
pub(crate) fn fix_hour(hour: f64) -> f64 {
    hour.rem_euclid(24.0)
}

// Degree-based trigonometry, matching the convention of the solar
// formulas above.

pub(crate) fn dsin(d: f64) -> f64 {
    d.to_radians().sin()
}

pub(crate) fn dcos(d: f64) -> f64 {
    d.to_radians().cos()
}

pub(crate) fn dtan(d: f64) -> f64 {
    d.to_radians().tan()
}

pub(crate) fn darcsin(x: f64) -> f64 {
    x.asin().to_degrees()
}

pub(crate) fn darccos(x: f64) -> f64 {
    x.acos().to_degrees()
}

pub(crate) fn darccot(x: f64) -> f64 {
    (1.0 / x).atan().to_degrees()
}

pub(crate) fn datan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}
