//! IAU H-G apparent magnitude (Bowell et al. 1989)

/// Diameter in metres of a body with absolute magnitude 0 and albedo 0.14
const DIAMETER_AT_H0_M: f64 = 3_551_901.905_01;

fn phase_basis(phase_angle: f64, small_coeff: f64, a: f64, b: f64) -> f64 {
    let sin_a = phase_angle.sin();
    let tan_half = (phase_angle / 2.0).tan();
    let small = 1.0 - small_coeff * sin_a / (0.119 + 1.341 * sin_a - 0.754 * sin_a * sin_a);
    let large = (-a * tan_half.powf(b)).exp();
    let weight = (-90.56 * tan_half * tan_half).exp();
    weight * small + (1.0 - weight) * large
}

fn phi1(phase_angle: f64) -> f64 {
    phase_basis(phase_angle, 0.986, 3.332, 0.631)
}

fn phi2(phase_angle: f64) -> f64 {
    phase_basis(phase_angle, 0.238, 1.862, 1.218)
}

/// Apparent V magnitude from absolute magnitude and geometry
///
/// # Arguments
/// * `h` - Absolute magnitude
/// * `g` - Slope parameter (0.15 when unknown)
/// * `r` - Heliocentric distance (AU)
/// * `delta` - Geocentric distance (AU)
/// * `phase_angle` - Sun-object-Earth angle (radians)
pub fn apparent_magnitude(h: f64, g: f64, r: f64, delta: f64, phase_angle: f64) -> f64 {
    let alpha = phase_angle.abs().min(std::f64::consts::PI);
    let integral = ((1.0 - g) * phi1(alpha) + g * phi2(alpha)).max(1e-12);
    h + 5.0 * (r * delta).log10() - 2.5 * integral.log10()
}

/// Rough diameter in metres for absolute magnitude `h` (albedo 0.14)
pub fn estimated_diameter_m(h: f64) -> f64 {
    DIAMETER_AT_H0_M * 10f64.powf(-0.2 * h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposition_at_one_au() {
        // r * delta = 1 and zero phase leaves H unchanged
        let v = apparent_magnitude(18.0, 0.15, 2.0, 0.5, 0.0);
        assert!((v - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_fainter_with_phase_and_distance() {
        let near = apparent_magnitude(20.0, 0.15, 1.2, 0.3, 10f64.to_radians());
        let wide = apparent_magnitude(20.0, 0.15, 1.2, 0.3, 60f64.to_radians());
        let far = apparent_magnitude(20.0, 0.15, 2.4, 1.5, 10f64.to_radians());
        assert!(wide > near);
        assert!(far > near);
    }

    #[test]
    fn test_back_lit_stays_finite() {
        assert!(apparent_magnitude(20.0, 0.15, 1.0, 0.01, std::f64::consts::PI).is_finite());
    }

    #[test]
    fn test_diameter() {
        assert!((estimated_diameter_m(0.0) - DIAMETER_AT_H0_M).abs() < 1e-6);
        // five magnitudes is a factor ten in diameter
        assert!((estimated_diameter_m(15.0) / estimated_diameter_m(20.0) - 10.0).abs() < 1e-9);
    }
}
