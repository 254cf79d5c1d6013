//! Heliocentric osculating orbital elements

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::ephemeris::kepler::{elliptic_position, near_parabolic_position, OrbitPoint};
use crate::error::{EphemError, Result};
use crate::utils::config::{GAUSS_K, PARABOLIC_THRESHOLD};
use crate::utils::time_utils::Moment;

/// Six-element heliocentric orbit (J2000 ecliptic), angles in radians
///
/// A record is only ever replaced as a whole when fresh elements arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Osculation epoch
    pub epoch: Moment,
    /// Mean anomaly at epoch
    pub mean_anomaly: f64,
    pub inclination: f64,
    /// Longitude of the ascending node
    pub ascending_node: f64,
    /// Argument of perihelion
    pub arg_perihelion: f64,
    /// AU; zero when undefined (parabolic or hyperbolic orbits)
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    /// q in AU
    pub perihelion_distance: f64,
    /// Radians per day
    pub mean_motion: f64,
    /// Time of perihelion passage, when the source gives one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perihelion_time: Option<Moment>,
}

impl OrbitalElements {
    /// Build from catalog-style values in degrees
    ///
    /// Perihelion distance is derived from `a` and `e`. A zero mean motion
    /// is replaced by the two-body value for `a`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_degrees(
        epoch: Moment,
        mean_anomaly_deg: f64,
        inclination_deg: f64,
        ascending_node_deg: f64,
        arg_perihelion_deg: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        mean_motion_deg_per_day: f64,
    ) -> Self {
        let mean_motion = if mean_motion_deg_per_day > 0.0 {
            mean_motion_deg_per_day.to_radians()
        } else {
            two_body_mean_motion(semi_major_axis)
        };
        OrbitalElements {
            epoch,
            mean_anomaly: mean_anomaly_deg.to_radians(),
            inclination: inclination_deg.to_radians(),
            ascending_node: ascending_node_deg.to_radians(),
            arg_perihelion: arg_perihelion_deg.to_radians(),
            semi_major_axis,
            eccentricity,
            perihelion_distance: semi_major_axis * (1.0 - eccentricity),
            mean_motion,
            perihelion_time: None,
        }
    }

    /// Build from comet-style perihelion elements (degrees, AU)
    pub fn cometary(
        perihelion_time: Moment,
        perihelion_distance: f64,
        eccentricity: f64,
        inclination_deg: f64,
        ascending_node_deg: f64,
        arg_perihelion_deg: f64,
    ) -> Self {
        let semi_major_axis = if eccentricity < 1.0 {
            perihelion_distance / (1.0 - eccentricity)
        } else {
            0.0
        };
        OrbitalElements {
            epoch: perihelion_time.clone(),
            mean_anomaly: 0.0,
            inclination: inclination_deg.to_radians(),
            ascending_node: ascending_node_deg.to_radians(),
            arg_perihelion: arg_perihelion_deg.to_radians(),
            semi_major_axis,
            eccentricity,
            perihelion_distance,
            mean_motion: two_body_mean_motion(semi_major_axis),
            perihelion_time: Some(perihelion_time),
        }
    }

    /// True when the closed-form near-parabolic solution applies
    pub fn is_near_parabolic(&self) -> bool {
        self.eccentricity >= PARABOLIC_THRESHOLD
    }

    /// q, derived from `a` and `e` when not stored
    pub fn perihelion_distance(&self) -> f64 {
        if self.perihelion_distance > 0.0 {
            self.perihelion_distance
        } else {
            self.semi_major_axis * (1.0 - self.eccentricity)
        }
    }

    /// Mean motion in rad/day, derived from `a` when not stored
    pub fn mean_motion(&self) -> f64 {
        if self.mean_motion > 0.0 {
            self.mean_motion
        } else {
            two_body_mean_motion(self.semi_major_axis)
        }
    }

    /// Check the elements describe an orbit this crate can propagate
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.mean_anomaly,
            self.inclination,
            self.ascending_node,
            self.arg_perihelion,
            self.semi_major_axis,
            self.eccentricity,
            self.perihelion_distance,
            self.mean_motion,
        ];
        if values.iter().any(|v| !v.is_finite()) || !self.epoch.julian().is_finite() {
            return Err(EphemError::InvalidElements("non-finite value".to_string()));
        }
        if self.eccentricity < 0.0 {
            return Err(EphemError::InvalidElements(format!(
                "negative eccentricity {}",
                self.eccentricity
            )));
        }
        if self.is_near_parabolic() {
            if !(self.perihelion_distance() > 0.0) {
                return Err(EphemError::InvalidElements(
                    "perihelion distance must be positive".to_string(),
                ));
            }
        } else if !(self.semi_major_axis > 0.0) {
            return Err(EphemError::InvalidElements(format!(
                "semi-major axis must be positive, got {}",
                self.semi_major_axis
            )));
        }
        Ok(())
    }

    /// Mean anomaly at `moment`, radians in [0, 2π)
    pub fn mean_anomaly_at(&self, moment: &Moment) -> f64 {
        (self.mean_anomaly + self.mean_motion() * moment.days_since(&self.epoch)).rem_euclid(TAU)
    }

    /// Time of perihelion passage nearest the epoch
    pub fn time_of_perihelion(&self) -> Result<Moment> {
        if let Some(t) = &self.perihelion_time {
            return Ok(t.clone());
        }
        let n = self.mean_motion();
        if !(n > 0.0) {
            return Err(EphemError::InvalidElements(
                "no perihelion time and no mean motion to derive it".to_string(),
            ));
        }
        // M in (-π, π] so the derived passage is the one closest to the epoch
        let m = (self.mean_anomaly + PI).rem_euclid(TAU) - PI;
        Ok(self.epoch.plus_days(-m / n))
    }

    /// True anomaly and heliocentric distance at `moment`
    pub fn orbit_point(&self, moment: &Moment) -> Result<OrbitPoint> {
        if self.is_near_parabolic() {
            let perihelion = self.time_of_perihelion()?;
            near_parabolic_position(
                self.perihelion_distance(),
                self.eccentricity,
                moment.days_since(&perihelion),
            )
        } else {
            elliptic_position(
                self.eccentricity,
                self.semi_major_axis,
                self.mean_anomaly_at(moment),
            )
        }
    }

    /// Heliocentric ecliptic rectangular position (AU) at `moment`
    pub fn heliocentric_rectangular(&self, moment: &Moment) -> Result<[f64; 3]> {
        let point = self.orbit_point(moment)?;
        let r = point.radius;
        let (sin_u, cos_u) = (point.true_anomaly + self.arg_perihelion).sin_cos();
        let (sin_n, cos_n) = self.ascending_node.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        Ok([
            r * (cos_n * cos_u - sin_n * sin_u * cos_i),
            r * (sin_n * cos_u + cos_n * sin_u * cos_i),
            r * sin_u * sin_i,
        ])
    }
}

fn two_body_mean_motion(semi_major_axis: f64) -> f64 {
    if semi_major_axis > 0.0 {
        GAUSS_K / semi_major_axis.powf(1.5)
    } else {
        0.0
    }
}
