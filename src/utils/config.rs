//! Physical and numerical constants shared across the crate

use std::f64::consts::PI;
use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Julian Date of the J2000.0 epoch
pub const JD_J2000: f64 = 2451545.0;
/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36525.0;
/// Days per Julian millennium
pub const DAYS_PER_MILLENNIUM: f64 = 365250.0;
/// First Julian Day of the Gregorian calendar (15 October 1582), as a packed d+31(m+12y) value
pub const GREGORIAN_CUTOVER: i64 = 15 + 31 * (10 + 12 * 1582);
/// JD at which the calendar switches from Julian to Gregorian
pub const GREGORIAN_JD: i64 = 2299161;

/// Mean obliquity of the ecliptic at J2000 (radians)
pub const OBLIQUITY: f64 = 23.439_291_11 * PI / 180.0;

/// Gaussian gravitational constant (radians/day)
pub const GAUSS_K: f64 = 0.017_202_098_95;
/// Eccentricity at and above which the near-parabolic solution is used
pub const PARABOLIC_THRESHOLD: f64 = 0.98;
/// Convergence tolerance on |E - e sin E - M|
pub const KEPLER_TOLERANCE: f64 = 1e-8;
/// Iteration cap for the Newton solver
pub const KEPLER_MAX_ITERATIONS: usize = 50;

/// Earth equatorial radius in AU
pub const EARTH_RADIUS_AU: f64 = 4.263_45e-5;

/// Mean synodic month (days)
pub const SYNODIC_MONTH: f64 = 29.530_59;
/// Reference new Moon (2014 Jan 30 21:41 UT)
pub const REFERENCE_NEW_MOON_JD: f64 = 2456688.403472;

/// rad/day to arcmin/hour
pub const RAD_PER_DAY_TO_ARCMIN_PER_HOUR: f64 = 180.0 * 60.0 / PI / 24.0;

/// Arcseconds to radians
pub const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);

/// Radians to hours of right ascension
pub const RAD_TO_HOURS: f64 = 12.0 / PI;

/// Galactic north pole (J2000) right ascension and declination (radians)
pub const GALACTIC_POLE_RA: f64 = 3.366_033;
pub const GALACTIC_POLE_DEC: f64 = 0.473_478;

/// Default location of the persisted user settings
pub static DEFAULT_SETTINGS_PATH: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default()
        .join("candidate_ephem")
        .join("settings.ini")
});
