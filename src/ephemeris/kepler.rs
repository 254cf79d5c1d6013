//! Kepler's equation and the near-parabolic closed form
//!
//! Elliptical orbits are solved by damped Newton iteration on
//! `E - e sin E = M`. Orbits at or above the parabolic threshold use a
//! closed-form series in time since perihelion (Schlyter), which is good
//! near perihelion over spans short compared with the orbital period.

use std::f64::consts::TAU;

use crate::error::{EphemError, Result};
use crate::utils::config::{GAUSS_K, KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE};

/// Position in the orbital plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPoint {
    /// True anomaly (radians)
    pub true_anomaly: f64,
    /// Distance from the focus, in the units of the semi-major axis
    pub radius: f64,
}

/// Solve Kepler's equation for the eccentric anomaly
///
/// # Arguments
/// * `eccentricity` - Orbital eccentricity, 0 <= e < 1
/// * `mean_anomaly` - Mean anomaly in radians (any range)
///
/// # Returns
/// Eccentric anomaly in radians, in the same revolution as `mean_anomaly`
/// wrapped to [0, 2π)
///
/// # Errors
/// `KeplerNonConvergence` if |E - e sin E - M| is still above tolerance
/// after the iteration cap.
pub fn solve_kepler(eccentricity: f64, mean_anomaly: f64) -> Result<f64> {
    let m = mean_anomaly.rem_euclid(TAU);
    let e = eccentricity;
    let residual = |ecc_anomaly: f64| ecc_anomaly - e * ecc_anomaly.sin() - m;

    let mut ecc_anomaly = m;
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = residual(ecc_anomaly);
        if f.abs() < KEPLER_TOLERANCE {
            return Ok(ecc_anomaly);
        }
        // |E - M| never exceeds e, so neither should a single step
        let step = (f / (1.0 - e * ecc_anomaly.cos())).clamp(-e, e);
        ecc_anomaly -= step;
    }

    if residual(ecc_anomaly).abs() < KEPLER_TOLERANCE {
        return Ok(ecc_anomaly);
    }
    Err(EphemError::KeplerNonConvergence {
        eccentricity,
        mean_anomaly,
        iterations: KEPLER_MAX_ITERATIONS,
    })
}

/// True anomaly and radius for an elliptical orbit
///
/// `semi_major_axis` sets the unit of the returned radius.
pub fn elliptic_position(
    eccentricity: f64,
    semi_major_axis: f64,
    mean_anomaly: f64,
) -> Result<OrbitPoint> {
    let ecc_anomaly = solve_kepler(eccentricity, mean_anomaly)?;
    let x = semi_major_axis * (ecc_anomaly.cos() - eccentricity);
    let y = semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt() * ecc_anomaly.sin();
    Ok(OrbitPoint {
        true_anomaly: y.atan2(x),
        radius: (x * x + y * y).sqrt(),
    })
}

/// True anomaly and heliocentric distance for a near-parabolic orbit
///
/// # Arguments
/// * `perihelion_distance` - q in AU
/// * `eccentricity` - e, typically >= 0.98 (hyperbolic allowed)
/// * `days_from_perihelion` - t - T in days, negative before perihelion
///
/// Accurate near perihelion; the truncated series degrades for strongly
/// elliptical orbits far from perihelion.
pub fn near_parabolic_position(
    perihelion_distance: f64,
    eccentricity: f64,
    days_from_perihelion: f64,
) -> Result<OrbitPoint> {
    let q = perihelion_distance;
    let e = eccentricity;
    if !(q > 0.0) || !(e > 0.0) {
        return Err(EphemError::InvalidElements(format!(
            "near-parabolic orbit needs q > 0 and e > 0 (q={q}, e={e})"
        )));
    }

    let a = 0.75 * days_from_perihelion * GAUSS_K * ((1.0 + e) / (q * q * q)).sqrt();
    let b = (1.0 + a * a).sqrt();
    let w = (b + a).cbrt() - (b - a).cbrt();
    let w2 = w * w;
    let f = (1.0 - e) / (1.0 + e);

    let a1 = 2.0 / 3.0 + 2.0 / 5.0 * w2;
    let a2 = 7.0 / 5.0 + 33.0 / 35.0 * w2 + 37.0 / 175.0 * w2 * w2;
    let a3 = w2 * (432.0 / 175.0 + 956.0 / 1125.0 * w2 + 84.0 / 1575.0 * w2 * w2);

    let c = w2 / (1.0 + w2);
    let g = f * c * c;
    let w_corr = w * (1.0 + f * c * (a1 + a2 * g + a3 * g * g));
    let w_corr2 = w_corr * w_corr;

    Ok(OrbitPoint {
        true_anomaly: 2.0 * w_corr.atan(),
        radius: q * (1.0 + w_corr2) / (1.0 + w_corr2 * f),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_mean_anomaly_is_perihelion() {
        for e in [0.0, 0.1, 0.5, 0.9, 0.97] {
            assert_eq!(solve_kepler(e, 0.0).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_circular_orbit() {
        let e = solve_kepler(0.0, 1.234).unwrap();
        assert_eq!(e, 1.234);
    }

    #[test]
    fn test_residual_high_eccentricity() {
        // worst case for undamped Newton from E0 = M
        let (e, m) = (0.976, 5.99);
        let ecc = solve_kepler(e, m).unwrap();
        assert!((ecc - e * ecc.sin() - m).abs() < KEPLER_TOLERANCE);
    }

    #[test]
    fn test_aphelion() {
        let ecc = solve_kepler(0.5, PI).unwrap();
        assert!((ecc - PI).abs() < 1e-8);
        let p = elliptic_position(0.5, 2.0, PI).unwrap();
        assert!((p.radius - 3.0).abs() < 1e-8);
    }

    #[test]
    fn test_negative_mean_anomaly_wraps() {
        let ecc = solve_kepler(0.2, -0.5).unwrap();
        let m = (-0.5f64).rem_euclid(TAU);
        assert!((ecc - 0.2 * ecc.sin() - m).abs() < KEPLER_TOLERANCE);
    }

    #[test]
    fn test_parabola_at_perihelion() {
        let p = near_parabolic_position(1.2, 1.0, 0.0).unwrap();
        assert_eq!(p.true_anomaly, 0.0);
        assert!((p.radius - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_parabola_matches_barker() {
        // pure parabola: tan(v/2) + tan^3(v/2)/3 = k t / sqrt(2 q^3)
        let (q, t) = (0.8, 25.0);
        let p = near_parabolic_position(q, 1.0, t).unwrap();
        let s = (p.true_anomaly / 2.0).tan();
        let lhs = s + s * s * s / 3.0;
        let rhs = GAUSS_K * t / (2.0 * q * q * q).sqrt();
        assert!((lhs - rhs).abs() < 1e-10);
        assert!((p.radius - q * (1.0 + s * s)).abs() < 1e-10);
    }

    #[test]
    fn test_near_parabolic_is_symmetric_about_perihelion() {
        let before = near_parabolic_position(0.5, 0.99, -10.0).unwrap();
        let after = near_parabolic_position(0.5, 0.99, 10.0).unwrap();
        assert!((before.true_anomaly + after.true_anomaly).abs() < 1e-12);
        assert!((before.radius - after.radius).abs() < 1e-12);
    }

    #[test]
    fn test_near_parabolic_rejects_bad_q() {
        assert!(near_parabolic_position(0.0, 1.0, 3.0).is_err());
    }
}
