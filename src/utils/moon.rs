//! Moon-related calculations and utilities

use std::f64::consts::TAU;

use crate::utils::config::{REFERENCE_NEW_MOON_JD, SYNODIC_MONTH};

/// Fraction of the synodic month elapsed since the last new Moon, [0, 1)
pub fn lunar_age_fraction(julian: f64) -> f64 {
    ((julian - REFERENCE_NEW_MOON_JD) / SYNODIC_MONTH).rem_euclid(1.0)
}

/// Approximate illuminated fraction from the mean lunation alone
///
/// A cosine of the lunar age: 0 at the mean new Moon, 1 half a synodic
/// month later. The real Moon runs up to about half a day ahead of or
/// behind the mean lunation, so near quarter phase this can be off by
/// several percent. Use [`illumination_from_elongation`] when Sun and Moon
/// positions are at hand.
///
/// # Arguments
/// * `julian` - Julian Date (UT)
///
/// # Returns
/// Moon illumination fraction (0.0 = new moon, 1.0 = full moon)
pub fn synodic_illuminated_fraction(julian: f64) -> f64 {
    let phase = (lunar_age_fraction(julian) - 0.5) * TAU;
    (phase.cos() + 1.0) / 2.0
}

/// Illuminated fraction from the Sun-Moon elongation seen from Earth
///
/// # Arguments
/// * `elongation` - Angle between Sun and Moon (radians)
pub fn illumination_from_elongation(elongation: f64) -> f64 {
    (1.0 - elongation.cos()) / 2.0
}
