//! Transit, rise and set times relative to an altitude threshold.
//!
//! Times are anchored at midnight UTC of the observer's instant. Rise and set are
//! symmetric around transit; the sidereal/solar rate difference is ignored.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use qtty::{Degrees, Hours};

use crate::api::{ObserverContext, RiseTransitSet};
use crate::models::{local_sidereal_time, wrap_hour_angle, JulianDate, Target};

/// Observing night assumed for targets that never set.
pub const NIGHT_HOURS: f64 = 12.0;

/// Altitude used when counting usable imaging hours.
pub const IMAGING_ALTITUDE_DEG: f64 = 30.0;

fn midnight_utc(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn hours_to_duration(hours: f64) -> Duration {
    // `as` saturates and maps NaN to zero
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Time at which `ra` crosses the meridian, within twelve hours of midnight UTC.
pub fn transit_time(ra: f64, longitude_deg: f64, instant: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = midnight_utc(instant);
    let lst = local_sidereal_time(JulianDate::from_datetime(midnight), longitude_deg);
    midnight + hours_to_duration(wrap_hour_angle(ra - lst))
}

/// Rise, transit and set of a fixed position above `min_altitude`.
pub fn rise_transit_set(
    ra: f64,
    dec: Degrees,
    observer: &ObserverContext,
    min_altitude: Degrees,
) -> RiseTransitSet {
    let lat_deg = observer.location.latitude;
    let max_altitude = Degrees::new(90.0 - (lat_deg - dec.value()).abs());

    let lat = lat_deg.to_radians();
    let dec_rad = dec.value().to_radians();
    let cos_h = (min_altitude.value().to_radians().sin() - lat.sin() * dec_rad.sin())
        / (lat.cos() * dec_rad.cos());

    let transit = transit_time(ra, observer.location.longitude, observer.instant);

    if cos_h < -1.0 {
        return RiseTransitSet {
            rise: None,
            transit: Some(transit),
            set: None,
            max_altitude,
            never_sets: true,
            never_rises: false,
        };
    }
    if cos_h > 1.0 {
        return RiseTransitSet {
            rise: None,
            transit: None,
            set: None,
            max_altitude,
            never_sets: false,
            never_rises: true,
        };
    }

    let half_arc = hours_to_duration(cos_h.acos().to_degrees() / 15.0);
    RiseTransitSet {
        rise: Some(transit - half_arc),
        transit: Some(transit),
        set: Some(transit + half_arc),
        max_altitude,
        never_sets: false,
        never_rises: false,
    }
}

/// Hours a target spends above `min_altitude`, capped at [`NIGHT_HOURS`].
///
/// Targets that never set count as a full night; no sun position is involved.
pub fn hours_above_altitude(
    target: &Target,
    observer: &ObserverContext,
    min_altitude: Degrees,
) -> Hours {
    let rts = rise_transit_set(target.ra, target.dec, observer, min_altitude);
    if rts.never_rises {
        return Hours::new(0.0);
    }
    if rts.never_sets {
        return Hours::new(NIGHT_HOURS);
    }
    match (rts.rise, rts.set) {
        (Some(rise), Some(set)) => {
            let hours = (set - rise).num_milliseconds() as f64 / 3_600_000.0;
            Hours::new(hours.clamp(0.0, NIGHT_HOURS))
        }
        _ => Hours::new(0.0),
    }
}
