//! Julian Date and sidereal time.
//!
//! All downstream astronomy (horizontal coordinates, transits, lunar position) is
//! driven by the Julian Date produced here, so the calendar algorithm follows the
//! classical Gregorian formulation exactly, including the January/February branch
//! that treats those months as months 13 and 14 of the previous year.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Julian Date of the J2000.0 epoch.
pub const J2000: f64 = 2451545.0;

/// Days in a Julian century.
pub const DAYS_PER_CENTURY: f64 = 36525.0;

/// Julian Date representation.
/// JD 0 = 4713 BC January 1, 12:00 (proleptic Julian calendar)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDate(qtty::Days);

impl JulianDate {
    /// Create a new JD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw JD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Julian Date of a UTC instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::new(to_julian_date(dt))
    }

    /// Days elapsed since J2000.0 (negative before the epoch).
    pub fn days_since_j2000(&self) -> f64 {
        self.value() - J2000
    }

    /// Julian centuries since J2000.0, the `T` argument of most polynomial series.
    pub fn centuries_since_j2000(&self) -> f64 {
        self.days_since_j2000() / DAYS_PER_CENTURY
    }
}

impl From<f64> for JulianDate {
    fn from(v: f64) -> Self {
        JulianDate::new(v)
    }
}

/// Julian Date of a UTC instant (Meeus, chapter 7).
///
/// The fractional day is built from whole hours, minutes and seconds; sub-second
/// precision is dropped.
pub fn to_julian_date(instant: DateTime<Utc>) -> f64 {
    let day = instant.day() as f64
        + instant.hour() as f64 / 24.0
        + instant.minute() as f64 / 1440.0
        + instant.second() as f64 / 86400.0;

    let (year, month) = if instant.month() <= 2 {
        (instant.year() - 1, instant.month() + 12)
    } else {
        (instant.year(), instant.month())
    };

    let a = (year as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (year as f64 + 4716.0)).floor() + (30.6001 * (month as f64 + 1.0)).floor() + day + b
        - 1524.5
}

/// Greenwich Mean Sidereal Time in hours, within `[0, 24)`.
pub fn greenwich_mean_sidereal_time(jd: JulianDate) -> f64 {
    let d = jd.days_since_j2000();
    let t = jd.centuries_since_j2000();
    let gmst_deg =
        280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38710000.0;
    normalize_degrees(gmst_deg) / 15.0
}

/// Local Mean Sidereal Time in hours for an east-positive longitude in degrees.
pub fn local_sidereal_time(jd: JulianDate, longitude_deg: f64) -> f64 {
    normalize_hours(greenwich_mean_sidereal_time(jd) + longitude_deg / 15.0)
}

/// Wrap an angle in degrees into `[0, 360)` regardless of the sign of the input.
pub fn normalize_degrees(deg: f64) -> f64 {
    wrap_positive(deg, 360.0)
}

/// Wrap a time-of-day in hours into `[0, 24)` regardless of the sign of the input.
pub fn normalize_hours(hours: f64) -> f64 {
    wrap_positive(hours, 24.0)
}

/// Wrap an hour angle into `(-12, 12]`.
pub fn wrap_hour_angle(hours: f64) -> f64 {
    let h = normalize_hours(hours);
    if h > 12.0 {
        h - 24.0
    } else {
        h
    }
}

fn wrap_positive(x: f64, modulus: f64) -> f64 {
    let r = ((x % modulus) + modulus) % modulus;
    // (-tiny + m) % m rounds to m itself
    if r >= modulus {
        0.0
    } else {
        r
    }
}
