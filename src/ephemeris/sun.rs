//! Sun position from low-precision osculating elements
//!
//! The geocentric orbit of the Sun is the Earth's orbit seen from the other
//! end: a Kepler ellipse with slowly drifting perihelion and eccentricity
//! (Schlyter, "How to compute planetary positions"). Good to about 0.01°.

use crate::coordinates::{Ecliptic, Equatorial, SkyPosition};
use crate::ephemeris::ephemeris_common::{schlyter_day, wrapped_radians, BodyEphemeris};
use crate::ephemeris::kepler::elliptic_position;
use crate::error::Result;
use crate::utils::time_utils::Moment;

/// Geocentric position of the Sun at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub ecliptic: SkyPosition<Ecliptic>,
    pub equatorial: SkyPosition<Equatorial>,
    /// Earth-Sun distance in AU
    pub distance: f64,
    /// Mean longitude (radians, [0, 2π))
    pub mean_longitude: f64,
}

/// Sun ephemeris
#[derive(Debug, Clone, Copy, Default)]
pub struct Sun;

impl BodyEphemeris for Sun {
    type Position = Result<SunPosition>;

    fn position_at(&self, moment: &Moment) -> Result<SunPosition> {
        let d = schlyter_day(moment);
        let perihelion = wrapped_radians(282.9404 + 4.70935e-5 * d);
        let eccentricity = 0.016709 - 1.151e-9 * d;
        let mean_anomaly = wrapped_radians(356.0470 + 0.985_600_258_5 * d);

        let orbit = elliptic_position(eccentricity, 1.0, mean_anomaly)?;
        let ecliptic = SkyPosition::<Ecliptic>::new(orbit.true_anomaly + perihelion, 0.0);

        Ok(SunPosition {
            ecliptic,
            equatorial: ecliptic.to_equatorial(),
            distance: orbit.radius,
            mean_longitude: (mean_anomaly + perihelion).rem_euclid(std::f64::consts::TAU),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::earth::Earth;

    #[test]
    fn test_sun_at_j2000() {
        let sun = Sun.position_at(&Moment::j2000()).unwrap();
        assert!((sun.equatorial.lon_degrees() - 281.29).abs() < 0.01);
        assert!((sun.equatorial.lat_degrees() + 23.03).abs() < 0.01);
        assert!((sun.distance - 0.98333).abs() < 1e-4);
    }

    #[test]
    fn test_sun_opposite_vsop_earth() {
        for jd in [2440000.5, 2455000.5, 2460600.5] {
            let moment = Moment::from_julian(jd);
            let sun = Sun.position_at(&moment).unwrap();
            let earth = Earth.position_at(&moment);
            let diff = (sun.ecliptic.lon - earth.longitude - std::f64::consts::PI)
                .rem_euclid(std::f64::consts::TAU);
            let diff = diff.min(std::f64::consts::TAU - diff);
            assert!(diff.to_degrees() < 0.01, "jd {jd}: {}", diff.to_degrees());
            assert!((sun.distance - earth.radius).abs() < 1e-4);
        }
    }
}
