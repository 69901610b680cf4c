//! Equatorial to horizontal coordinate transforms and display helpers.
//!
//! All functions are total: degenerate geometry (observer or target at a pole)
//! yields a numerically unstable azimuth rather than an error.

use qtty::Degrees;

use crate::api::{HorizontalPosition, ObserverContext};
use crate::models::{local_sidereal_time, normalize_degrees, wrap_hour_angle};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Altitude and azimuth of a fixed equatorial position for an observer.
///
/// # Arguments
///
/// * `ra` - Right ascension in decimal hours
/// * `dec` - Declination
/// * `observer` - Location and instant of the observation
pub fn equatorial_to_horizontal(
    ra: f64,
    dec: Degrees,
    observer: &ObserverContext,
) -> HorizontalPosition {
    let lst = local_sidereal_time(observer.julian_date(), observer.location.longitude);
    let hour_angle = (wrap_hour_angle(lst - ra) * 15.0).to_radians();

    let dec = dec.value().to_radians();
    let lat = observer.location.latitude.to_radians();

    let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin();

    let cos_az = (dec.sin() - alt.sin() * lat.sin()) / (alt.cos() * lat.cos());
    let mut az = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
    if hour_angle.sin() > 0.0 {
        az = 360.0 - az;
    }
    // 0/0 at the zenith or a pole
    if az.is_nan() {
        az = 0.0;
    }

    HorizontalPosition {
        altitude: Degrees::new(alt.to_degrees()),
        azimuth: Degrees::new(normalize_degrees(az)),
    }
}

/// Great-circle distance between two equatorial positions, within `[0, 180]` degrees.
pub fn angular_separation(ra1: f64, dec1: Degrees, ra2: f64, dec2: Degrees) -> Degrees {
    let ra1 = (ra1 * 15.0).to_radians();
    let ra2 = (ra2 * 15.0).to_radians();
    let dec1 = dec1.value().to_radians();
    let dec2 = dec2.value().to_radians();

    let cos_sep = dec1.sin() * dec2.sin() + dec1.cos() * dec2.cos() * (ra1 - ra2).cos();
    Degrees::new(cos_sep.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Format a right ascension in hours as `"5h 35m 17s"`.
pub fn format_ra(hours: f64) -> String {
    let h = hours.floor();
    let m = ((hours - h) * 60.0).floor();
    let s = (((hours - h) * 60.0 - m) * 60.0).round();
    format!("{}h {}m {}s", h as i64, m as i64, s as i64)
}

/// Format a declination in degrees as `+41° 16' 9"`.
pub fn format_dec(dec: Degrees) -> String {
    let deg = dec.value();
    let sign = if deg >= 0.0 { '+' } else { '-' };
    let abs = deg.abs();
    let d = abs.floor();
    let m = ((abs - d) * 60.0).floor();
    let s = (((abs - d) * 60.0 - m) * 60.0).round();
    format!("{}{}° {}' {}\"", sign, d as i64, m as i64, s as i64)
}

/// 16-point compass direction for an azimuth.
pub fn cardinal_direction(azimuth: Degrees) -> &'static str {
    let index = (normalize_degrees(azimuth.value()) / 22.5).round() as usize % 16;
    COMPASS_POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GeographicLocation;
    use chrono::{TimeZone, Utc};

    fn observer(lat: f64, lon: f64) -> ObserverContext {
        ObserverContext::new(
            GeographicLocation::new(lat, lon, None).unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 15, 4, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_pole_star_altitude_matches_latitude() {
        // Polaris sits within a degree of the celestial pole
        for lat in [20.0, 40.0, 60.0] {
            let pos = equatorial_to_horizontal(2.53, Degrees::new(89.26), &observer(lat, 10.0));
            assert!((pos.altitude.value() - lat).abs() < 1.0);
        }
    }

    #[test]
    fn test_object_on_meridian() {
        let obs = observer(40.0, -105.0);
        let lst = local_sidereal_time(obs.julian_date(), -105.0);

        // North of the zenith
        let pos = equatorial_to_horizontal(lst, Degrees::new(60.0), &obs);
        assert!((pos.altitude.value() - 70.0).abs() < 1e-6);
        assert!(pos.azimuth.value() < 1e-4 || pos.azimuth.value() > 360.0 - 1e-4);

        // South of the zenith
        let pos = equatorial_to_horizontal(lst, Degrees::new(-10.0), &obs);
        assert!((pos.altitude.value() - 40.0).abs() < 1e-6);
        assert!((pos.azimuth.value() - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_west_of_meridian_has_western_azimuth() {
        let obs = observer(40.0, -105.0);
        let lst = local_sidereal_time(obs.julian_date(), -105.0);
        // RA two hours behind LST: already transited
        let pos = equatorial_to_horizontal(lst - 2.0, Degrees::new(10.0), &obs);
        assert!(pos.azimuth.value() > 180.0);
        let pos = equatorial_to_horizontal(lst + 2.0, Degrees::new(10.0), &obs);
        assert!(pos.azimuth.value() < 180.0);
    }

    #[test]
    fn test_zenith_azimuth_is_finite() {
        let obs = observer(90.0, 0.0);
        let pos = equatorial_to_horizontal(3.0, Degrees::new(90.0), &obs);
        assert!(pos.azimuth.value().is_finite());
        assert!((0.0..360.0).contains(&pos.azimuth.value()));
    }

    #[test]
    fn test_angular_separation() {
        let sep = angular_separation(0.0, Degrees::new(0.0), 6.0, Degrees::new(0.0));
        assert!((sep.value() - 90.0).abs() < 1e-9);

        let sep = angular_separation(0.0, Degrees::new(90.0), 12.0, Degrees::new(-90.0));
        assert!((sep.value() - 180.0).abs() < 1e-9);

        let sep = angular_separation(5.5, Degrees::new(-5.4), 5.5, Degrees::new(-5.4));
        assert!(sep.value() < 1e-6);
    }

    #[test]
    fn test_format_ra() {
        assert_eq!(format_ra(0.712), "0h 42m 43s");
        assert_eq!(format_ra(18.0), "18h 0m 0s");
    }

    #[test]
    fn test_format_dec() {
        assert_eq!(format_dec(Degrees::new(41.269)), "+41° 16' 8\"");
        assert_eq!(format_dec(Degrees::new(-5.5)), "-5° 30' 0\"");
        assert_eq!(format_dec(Degrees::new(0.0)), "+0° 0' 0\"");
    }

    #[test]
    fn test_cardinal_direction() {
        assert_eq!(cardinal_direction(Degrees::new(0.0)), "N");
        assert_eq!(cardinal_direction(Degrees::new(359.0)), "N");
        assert_eq!(cardinal_direction(Degrees::new(22.5)), "NNE");
        assert_eq!(cardinal_direction(Degrees::new(90.0)), "E");
        assert_eq!(cardinal_direction(Degrees::new(200.0)), "SSW");
        assert_eq!(cardinal_direction(Degrees::new(337.0)), "NNW");
    }
}
