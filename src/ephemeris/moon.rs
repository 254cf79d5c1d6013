//! Moon position from mean orbital elements
//!
//! Unperturbed Kepler orbit with secular drift of node, perihelion and mean
//! anomaly (Schlyter). The largest perturbations (evection, variation) are
//! left out, so positions are good to one or two degrees. That is enough
//! for keeping targets away from the Moon, not for occultation work.

use crate::coordinates::{Ecliptic, Equatorial, SkyPosition, Topocentric};
use crate::ephemeris::ephemeris_common::{schlyter_day, wrapped_radians, BodyEphemeris};
use crate::ephemeris::kepler::elliptic_position;
use crate::error::Result;
use crate::observatory::Observatory;
use crate::utils::config::EARTH_RADIUS_AU;
use crate::utils::moon::synodic_illuminated_fraction;
use crate::utils::time_utils::Moment;
use crate::utils::vector_math::rectangular_to_spherical;

/// Geocentric position of the Moon at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPosition {
    pub ecliptic: SkyPosition<Ecliptic>,
    pub equatorial: SkyPosition<Equatorial>,
    /// Earth-Moon distance in Earth radii
    pub distance_earth_radii: f64,
}

impl MoonPosition {
    /// Earth-Moon distance in AU
    pub fn distance_au(&self) -> f64 {
        self.distance_earth_radii * EARTH_RADIUS_AU
    }
}

/// Moon ephemeris
#[derive(Debug, Clone, Copy, Default)]
pub struct Moon;

impl BodyEphemeris for Moon {
    type Position = Result<MoonPosition>;

    fn position_at(&self, moment: &Moment) -> Result<MoonPosition> {
        let d = schlyter_day(moment);
        let node = wrapped_radians(125.1228 - 0.052_953_808_3 * d);
        let inclination = 5.1454f64.to_radians();
        let perigee = wrapped_radians(318.0634 + 0.164_357_322_3 * d);
        let semi_major_axis = 60.2666;
        let eccentricity = 0.0549;
        let mean_anomaly = wrapped_radians(115.3654 + 13.064_992_950_9 * d);

        let orbit = elliptic_position(eccentricity, semi_major_axis, mean_anomaly)?;
        let (sin_u, cos_u) = (orbit.true_anomaly + perigee).sin_cos();
        let (sin_n, cos_n) = node.sin_cos();
        let r = orbit.radius;
        let rect = [
            r * (cos_n * cos_u - sin_n * sin_u * inclination.cos()),
            r * (sin_n * cos_u + cos_n * sin_u * inclination.cos()),
            r * sin_u * inclination.sin(),
        ];
        let (lon, lat, distance) = rectangular_to_spherical(&rect);
        let ecliptic = SkyPosition::<Ecliptic>::new(lon, lat);

        Ok(MoonPosition {
            ecliptic,
            equatorial: ecliptic.to_equatorial(),
            distance_earth_radii: distance,
        })
    }
}

impl Moon {
    /// Moon as seen from `site`, parallax applied
    pub fn topocentric(&self, moment: &Moment, site: &Observatory) -> Result<SkyPosition<Topocentric>> {
        let geocentric = self.position_at(moment)?;
        Ok(geocentric.equatorial.to_topocentric(
            site.lmst(moment),
            site.geo_sin,
            site.geo_cos,
            geocentric.distance_au(),
        ))
    }

    /// Approximate illuminated fraction, 0 (new) to 1 (full)
    ///
    /// Mean-lunation approximation: a cosine of time since a reference new
    /// Moon modulo the synodic month. Not phase-exact.
    pub fn illuminated_fraction(&self, moment: &Moment) -> f64 {
        synodic_illuminated_fraction(moment.julian())
    }
}
