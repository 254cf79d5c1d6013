//! Vector math utilities for coordinate transforms
//!
//! Helpers for moving between spherical angles and rectangular vectors,
//! and for great-circle separations. All angles are radians.

use ndarray::{Array1, Array2};

/// Convert spherical angles to a unit vector
///
/// # Arguments
/// * `lon` - Azimuthal angle (right ascension or longitude) in radians
/// * `lat` - Polar angle (declination or latitude) in radians
///
/// # Returns
/// Unit vector [x, y, z]
pub fn spherical_to_unit_vector(lon: f64, lat: f64) -> [f64; 3] {
    let cos_lat = lat.cos();
    [cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin()]
}

/// Convert a rectangular vector to (lon, lat, radius)
///
/// Longitude is returned in [0, 2π). A zero vector yields all zeros.
pub fn rectangular_to_spherical(v: &[f64; 3]) -> (f64, f64, f64) {
    let r = vector_magnitude(v);
    if r == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let lon = v[1].atan2(v[0]).rem_euclid(std::f64::consts::TAU);
    let lat = v[2].atan2((v[0] * v[0] + v[1] * v[1]).sqrt());
    (lon, lat, r)
}

/// Normalize a 3D vector to unit length
///
/// # Returns
/// Normalized unit vector, or [0, 0, 0] if input magnitude is zero
pub fn normalize_vector(v: &[f64; 3]) -> [f64; 3] {
    let mag = vector_magnitude(v);
    if mag > 0.0 {
        [v[0] / mag, v[1] / mag, v[2] / mag]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Calculate the dot product of two 3D vectors
pub fn dot_product(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Calculate the magnitude (length) of a 3D vector
pub fn vector_magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// a - b
pub fn vector_sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Angle between two unit vectors in radians
///
/// The cosine is clamped to [-1, 1] so rounding on nearly parallel
/// vectors cannot produce NaN.
pub fn angular_separation(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    dot_product(a, b).clamp(-1.0, 1.0).acos()
}

// ============================================================================
// Vectorized batch operations
// ============================================================================

/// Convert many spherical positions to unit vectors (vectorized)
///
/// # Arguments
/// * `lons` - Azimuthal angles in radians
/// * `lats` - Polar angles in radians
///
/// # Returns
/// Array2 with shape (N, 3) containing unit vectors [x, y, z]
pub fn spherical_to_unit_vectors_batch(lons: &[f64], lats: &[f64]) -> Array2<f64> {
    assert_eq!(
        lons.len(),
        lats.len(),
        "longitude and latitude arrays must have same length"
    );

    let mut result = Array2::<f64>::zeros((lons.len(), 3));
    for (i, (&lon, &lat)) in lons.iter().zip(lats.iter()).enumerate() {
        let cos_lat = lat.cos();
        result[[i, 0]] = cos_lat * lon.cos();
        result[[i, 1]] = cos_lat * lon.sin();
        result[[i, 2]] = lat.sin();
    }
    result
}

/// Angular separations of many unit vectors from one reference direction
///
/// # Arguments
/// * `vectors` - Array2 with shape (N, 3) of unit vectors
/// * `reference` - Unit vector of the reference direction
///
/// # Returns
/// Array1 with shape (N,) of separations in radians
pub fn angular_separations_batch(vectors: &Array2<f64>, reference: &[f64; 3]) -> Array1<f64> {
    let mut separations = Array1::<f64>::zeros(vectors.nrows());
    for (i, row) in vectors.rows().into_iter().enumerate() {
        let v = [row[0], row[1], row[2]];
        separations[i] = angular_separation(&v, reference);
    }
    separations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_unit_vector_and_back() {
        let v = spherical_to_unit_vector(1.2, -0.4);
        assert!((vector_magnitude(&v) - 1.0).abs() < 1e-12);
        let (lon, lat, r) = rectangular_to_spherical(&v);
        assert!((lon - 1.2).abs() < 1e-12);
        assert!((lat + 0.4).abs() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_longitude_wraps() {
        let (lon, _, _) = rectangular_to_spherical(&[1.0, -1.0, 0.0]);
        assert!((lon - 1.75 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_separation_of_parallel_vectors_is_zero() {
        let v = normalize_vector(&[0.3, 0.4, 0.5]);
        assert!(angular_separation(&v, &v) < 1e-7);
    }

    #[test]
    fn test_batch_separations() {
        let vectors = spherical_to_unit_vectors_batch(&[0.0, FRAC_PI_2, PI], &[0.0, 0.0, 0.0]);
        let seps = angular_separations_batch(&vectors, &[1.0, 0.0, 0.0]);
        assert!(seps[0].abs() < 1e-12);
        assert!((seps[1] - FRAC_PI_2).abs() < 1e-12);
        assert!((seps[2] - PI).abs() < 1e-12);
    }
}
