//! Low-order lunar ephemeris.
//!
//! Position comes from the mean elements plus the dominant anomaly term and is good
//! to roughly a degree, which is enough to score moon separation. Phase uses a mean
//! synodic month counted from a fixed new moon.

use chrono::{DateTime, TimeZone, Utc};
use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::api::{MoonPhase, MoonPhaseName, MoonState};
use crate::models::{normalize_degrees, normalize_hours, JulianDate};

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588853;

/// Mean obliquity of the ecliptic used for the ecliptic to equatorial rotation.
const OBLIQUITY_DEG: f64 = 23.439;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// New moon of 2000-01-06 18:14 UTC.
fn reference_new_moon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Apparent equatorial position of the moon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPosition {
    /// Right ascension in decimal hours, [0, 24)
    pub ra: f64,
    pub dec: Degrees,
}

/// Approximate geocentric position of the moon at `instant`.
pub fn moon_position(instant: DateTime<Utc>) -> MoonPosition {
    let t = JulianDate::from_datetime(instant).centuries_since_j2000();

    let mean_longitude = normalize_degrees(218.3164477 + 481267.88123421 * t);
    let mean_anomaly = normalize_degrees(134.9633964 + 477198.8675055 * t).to_radians();
    // Mean elongation, 297.8501921 + 445267.1114034 T, carries no term at this order

    let lon = (mean_longitude + 6.289 * mean_anomaly.sin()).to_radians();
    let lat = (5.128 * mean_anomaly.sin()).to_radians();
    let eps = OBLIQUITY_DEG.to_radians();

    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin())
        .atan2(lon.cos())
        .to_degrees()
        / 15.0;
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin())
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees();

    MoonPosition {
        ra: normalize_hours(ra),
        dec: Degrees::new(dec),
    }
}

/// Fraction of the synodic month elapsed at `instant`, within `[0, 1)`.
pub fn phase_fraction(instant: DateTime<Utc>) -> f64 {
    let days = (instant - reference_new_moon()).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let cycle = days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS;
    if cycle >= 1.0 {
        0.0
    } else {
        cycle
    }
}

/// Illuminated percentage for a phase fraction: 0 at new moon, 100 at full.
pub fn illumination(phase: f64) -> f64 {
    let pct = if phase < 0.5 {
        phase * 200.0
    } else {
        (2.0 - 2.0 * phase) * 100.0
    };
    pct.clamp(0.0, 100.0)
}

/// Eight-way phase name for a phase fraction.
pub fn phase_name(phase: f64) -> MoonPhaseName {
    if !(0.033..=0.967).contains(&phase) {
        MoonPhaseName::NewMoon
    } else if phase < 0.216 {
        MoonPhaseName::WaxingCrescent
    } else if phase < 0.284 {
        MoonPhaseName::FirstQuarter
    } else if phase < 0.466 {
        MoonPhaseName::WaxingGibbous
    } else if phase < 0.534 {
        MoonPhaseName::FullMoon
    } else if phase < 0.716 {
        MoonPhaseName::WaningGibbous
    } else if phase < 0.784 {
        MoonPhaseName::LastQuarter
    } else {
        MoonPhaseName::WaningCrescent
    }
}

/// Phase fraction, illumination and phase name at `instant`.
pub fn moon_phase(instant: DateTime<Utc>) -> MoonPhase {
    let phase = phase_fraction(instant);
    MoonPhase {
        phase_fraction: phase,
        illumination_percent: illumination(phase),
        phase_name: phase_name(phase),
    }
}

impl MoonState {
    /// Moon snapshot computed from the ephemeris.
    pub fn at(instant: DateTime<Utc>) -> Self {
        let phase = moon_phase(instant);
        let position = moon_position(instant);
        Self {
            phase_fraction: phase.phase_fraction,
            illumination_percent: phase.illumination_percent,
            phase_name: phase.phase_name,
            ra: position.ra,
            dec: position.dec,
        }
    }

    /// Snapshot from an externally supplied reading.
    ///
    /// The phase fraction is wrapped into `[0, 1)` and the illumination clamped to
    /// `[0, 100]`; the phase name follows the fraction.
    pub fn new(phase_fraction: f64, illumination_percent: f64, ra: f64, dec: Degrees) -> Self {
        let phase = phase_fraction.rem_euclid(1.0);
        let phase = if phase >= 1.0 { 0.0 } else { phase };
        Self {
            phase_fraction: phase,
            illumination_percent: illumination_percent.clamp(0.0, 100.0),
            phase_name: phase_name(phase),
            ra: normalize_hours(ra),
            dec,
        }
    }
}
