//! Shared ephemeris interface and helpers

use crate::utils::time_utils::Moment;

/// Reference epoch for the Sun and Moon element drifts (1999 Dec 31 0h UT)
pub const SCHLYTER_EPOCH_JD: f64 = 2451543.5;

/// Common interface for analytic body ephemerides
///
/// Implementations are stateless: every call takes the time explicitly and
/// returns a fresh value, so one instance can serve any number of threads
/// evaluating different times.
pub trait BodyEphemeris: Send + Sync {
    /// What the model produces for one instant
    type Position;

    /// Evaluate the model at `moment`
    fn position_at(&self, moment: &Moment) -> Self::Position;
}

/// Days since [`SCHLYTER_EPOCH_JD`]
#[inline]
pub(crate) fn schlyter_day(moment: &Moment) -> f64 {
    moment.julian() - SCHLYTER_EPOCH_JD
}

/// Degrees to radians, wrapped into [0, 2π)
#[inline]
pub(crate) fn wrapped_radians(degrees: f64) -> f64 {
    degrees.to_radians().rem_euclid(std::f64::consts::TAU)
}
