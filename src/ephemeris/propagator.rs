//! Two-body orbit propagation to a topocentric sky position
//!
//! Chain: elements → orbital plane (Kepler or near-parabolic) → heliocentric
//! ecliptic → geocentric ecliptic (minus VSOP Earth precessed to J2000) → equatorial →
//! topocentric. No light-time, aberration, nutation or planetary
//! perturbations are applied; the result is good to minutes of time for
//! planning, not for astrometry.

use serde::{Deserialize, Serialize};

use crate::coordinates::{Ecliptic, Equatorial, SkyPosition, Topocentric};
use crate::ephemeris::earth::Earth;
use crate::ephemeris::elements::OrbitalElements;
use crate::error::Result;
use crate::observatory::Observatory;
use crate::utils::time_utils::Moment;
use crate::utils::vector_math::{rectangular_to_spherical, vector_magnitude, vector_sub};

/// Where an object is at one instant, seen from one site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagatedPosition {
    pub topocentric: SkyPosition<Topocentric>,
    pub geocentric: SkyPosition<Equatorial>,
    /// Sun-object distance r (AU)
    pub heliocentric_distance: f64,
    /// Earth-object distance Δ (AU)
    pub geocentric_distance: f64,
    /// Sun-object-Earth angle (radians)
    pub phase_angle: f64,
}

/// Propagate `elements` to `moment` and observe from `site`
///
/// # Errors
/// Invalid elements, or a Kepler solve that does not converge.
pub fn position_at(
    elements: &OrbitalElements,
    moment: &Moment,
    site: &Observatory,
) -> Result<PropagatedPosition> {
    elements.validate()?;
    let heliocentric = elements.heliocentric_rectangular(moment)?;
    let earth = Earth.position_j2000(moment);

    let geocentric_rect = vector_sub(&heliocentric, &earth.rectangular());
    let (lon, lat, delta) = rectangular_to_spherical(&geocentric_rect);
    let geocentric = SkyPosition::<Ecliptic>::new(lon, lat).to_equatorial();
    let topocentric = geocentric.to_topocentric(site.lmst(moment), site.geo_sin, site.geo_cos, delta);

    let r = vector_magnitude(&heliocentric);
    Ok(PropagatedPosition {
        topocentric,
        geocentric,
        heliocentric_distance: r,
        geocentric_distance: delta,
        phase_angle: phase_angle(r, delta, earth.radius),
    })
}

/// Sun-object-Earth angle from the three sides of the triangle
pub fn phase_angle(r: f64, delta: f64, earth_sun: f64) -> f64 {
    if r <= 0.0 || delta <= 0.0 {
        return 0.0;
    }
    ((r * r + delta * delta - earth_sun * earth_sun) / (2.0 * r * delta))
        .clamp(-1.0, 1.0)
        .acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn site() -> &'static Observatory {
        Observatory::by_code("G40").unwrap()
    }

    #[test]
    fn test_object_at_opposition() {
        // circular orbit, zero inclination, placed at the Earth's heliocentric longitude
        let moment = Moment::from_julian(2460600.5);
        let earth = Earth.position_j2000(&moment);
        let elements = OrbitalElements::from_degrees(
            moment.clone(),
            earth.longitude.to_degrees(),
            0.0,
            0.0,
            0.0,
            2.5,
            0.0,
            0.0,
        );
        let p = position_at(&elements, &moment, site()).unwrap();
        let ecliptic = p.geocentric.to_ecliptic();
        assert!((ecliptic.lon - earth.longitude).abs() < 1e-6);
        assert!(ecliptic.lat.abs() < 1e-4);
        assert!((p.geocentric_distance - (2.5 - earth.radius)).abs() < 1e-3);
        assert!((p.heliocentric_distance - 2.5).abs() < 1e-12);
        assert!(p.phase_angle < 0.01);
    }

    #[test]
    fn test_topocentric_close_to_geocentric() {
        let elements = OrbitalElements::from_degrees(
            Moment::from_julian(2460600.5),
            60.0,
            10.6,
            80.3,
            73.4,
            2.77,
            0.079,
            0.2141,
        );
        let moment = Moment::from_julian(2460601.2);
        let p = position_at(&elements, &moment, site()).unwrap();
        let shift = p
            .geocentric
            .separation(&SkyPosition::new(p.topocentric.lon, p.topocentric.lat));
        assert!(shift.to_degrees() * 3600.0 < 10.0);
        assert!(p.geocentric_distance > 0.5 && p.geocentric_distance < 4.5);
    }

    #[test]
    fn test_phase_angle_triangle() {
        // right angle at the object: 3-4-5 triangle
        assert!((phase_angle(3.0, 4.0, 5.0) - PI / 2.0).abs() < 1e-12);
        assert_eq!(phase_angle(0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_invalid_elements_fail() {
        let mut elements = OrbitalElements::from_degrees(
            Moment::j2000(),
            0.0,
            0.0,
            0.0,
            0.0,
            1.5,
            0.1,
            0.0,
        );
        elements.semi_major_axis = 0.0;
        assert!(position_at(&elements, &Moment::j2000(), site()).is_err());
    }
}
