//! Per-target visibility scoring.
//!
//! The score sums independent contributions and is clamped to `[0, 100]`:
//!
//! - altitude above 30°: up to 30 points
//! - hours above 30° tonight: up to 25 points
//! - separation from the moon: 0, 5, 15 or 25 points
//! - bright moon: minus 0.3 points per illumination percent above 50
//! - best-month season bonus: 20 points

use qtty::Degrees;

use crate::api::{MoonState, ObserverContext, VisibilityResult};
use crate::models::Target;
use crate::services::coordinates::{
    angular_separation, cardinal_direction, equatorial_to_horizontal,
};
use crate::services::rise_set::{hours_above_altitude, rise_transit_set, IMAGING_ALTITUDE_DEG};

/// Horizon used for the rise/transit/set times reported with a result.
pub const RISE_ALTITUDE_DEG: f64 = 15.0;

const ALTITUDE_MAX_POINTS: f64 = 30.0;
const HOURS_MAX_POINTS: f64 = 25.0;
const SEASON_POINTS: f64 = 20.0;

/// Points for a moon separation in degrees.
fn moon_separation_points(separation_deg: f64) -> f64 {
    if separation_deg > 90.0 {
        25.0
    } else if separation_deg > 45.0 {
        15.0
    } else if separation_deg > 20.0 {
        5.0
    } else {
        0.0
    }
}

/// Score a target for one observer, instant and moon state.
///
/// Always produces a result. Targets that never rise above the rise horizon keep
/// their computed score; excluding them is left to the caller.
pub fn score_target(
    target: &Target,
    observer: &ObserverContext,
    moon: &MoonState,
) -> VisibilityResult {
    let rts = rise_transit_set(
        target.ra,
        target.dec,
        observer,
        Degrees::new(RISE_ALTITUDE_DEG),
    );
    let current = equatorial_to_horizontal(target.ra, target.dec, observer);
    let moon_separation = angular_separation(target.ra, target.dec, moon.ra, moon.dec);
    let hours_above_30 =
        hours_above_altitude(target, observer, Degrees::new(IMAGING_ALTITUDE_DEG));
    let is_in_season = target.is_in_season(observer.month());

    let mut score = 0.0;

    let altitude = current.altitude.value();
    if altitude > IMAGING_ALTITUDE_DEG {
        score += ALTITUDE_MAX_POINTS.min((altitude - IMAGING_ALTITUDE_DEG) * 0.75);
    }

    score += HOURS_MAX_POINTS.min(hours_above_30.value() * 3.0);
    score += moon_separation_points(moon_separation.value());

    if moon.illumination_percent > 50.0 {
        score -= (moon.illumination_percent - 50.0) * 0.3;
    }

    if is_in_season {
        score += SEASON_POINTS;
    }

    let score = score.clamp(0.0, 100.0).round() as u8;

    VisibilityResult {
        target_id: target.id.clone(),
        altitude: current.altitude,
        azimuth: current.azimuth,
        direction: cardinal_direction(current.azimuth).to_string(),
        rise: rts.rise,
        transit: rts.transit,
        set: rts.set,
        max_altitude: rts.max_altitude,
        never_rises: rts.never_rises,
        never_sets: rts.never_sets,
        moon_separation,
        hours_above_30,
        is_in_season,
        score,
    }
}
