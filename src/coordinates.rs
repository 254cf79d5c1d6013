//! Frame-tagged spherical sky positions
//!
//! A [`SkyPosition`] carries its reference frame in the type. Positions in
//! different frames cannot be compared, and only the transform methods
//! ([`SkyPosition::to_equatorial`], [`SkyPosition::to_ecliptic`],
//! [`SkyPosition::to_topocentric`]) produce a value in a new frame.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{EphemError, Result};
use crate::utils::config::{
    EARTH_RADIUS_AU, GALACTIC_POLE_DEC, GALACTIC_POLE_RA, OBLIQUITY, RAD_TO_HOURS,
};
use crate::utils::vector_math::{angular_separation, spherical_to_unit_vector};

/// Marker for a coordinate frame
pub trait Frame: Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Frames whose azimuthal angle is a right ascension
pub trait EquatorialFrame: Frame {}

/// Geocentric ecliptic of date
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ecliptic;

/// Geocentric equatorial
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Equatorial;

/// Equatorial as seen from an observing site (parallax applied)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Topocentric;

impl Frame for Ecliptic {
    const NAME: &'static str = "ecliptic";
}
impl Frame for Equatorial {
    const NAME: &'static str = "equatorial";
}
impl Frame for Topocentric {
    const NAME: &'static str = "topocentric";
}
impl EquatorialFrame for Equatorial {}
impl EquatorialFrame for Topocentric {}

/// A direction on the sky in frame `F`, angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SkyPosition<F: Frame> {
    /// Longitude or right ascension, [0, 2π)
    pub lon: f64,
    /// Latitude or declination, [-π/2, π/2]
    pub lat: f64,
    #[serde(skip)]
    frame: PhantomData<F>,
}

impl<F: Frame> SkyPosition<F> {
    /// Create a position; longitude is wrapped into [0, 2π)
    pub fn new(lon: f64, lat: f64) -> Self {
        SkyPosition {
            lon: lon.rem_euclid(TAU),
            lat,
            frame: PhantomData,
        }
    }

    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self::new(lon_deg.to_radians(), lat_deg.to_radians())
    }

    pub fn frame_name(&self) -> &'static str {
        F::NAME
    }

    pub fn unit_vector(&self) -> [f64; 3] {
        spherical_to_unit_vector(self.lon, self.lat)
    }

    /// Great-circle distance in radians
    pub fn separation(&self, other: &Self) -> f64 {
        angular_separation(&self.unit_vector(), &other.unit_vector())
    }

    /// Point halfway along the great circle to `other`
    pub fn midpoint(&self, other: &Self) -> Self {
        let d_lon = other.lon - self.lon;
        let bx = other.lat.cos() * d_lon.cos();
        let by = other.lat.cos() * d_lon.sin();
        let lat = (self.lat.sin() + other.lat.sin())
            .atan2(((self.lat.cos() + bx).powi(2) + by * by).sqrt());
        let lon = self.lon + by.atan2(self.lat.cos() + bx);
        Self::new(lon, lat)
    }

    /// Destination after moving `distance` radians along initial `bearing`
    ///
    /// Bearing is measured from the +latitude direction towards increasing
    /// longitude.
    pub fn offset(&self, distance: f64, bearing: f64) -> Self {
        let lat = (self.lat.sin() * distance.cos()
            + self.lat.cos() * distance.sin() * bearing.cos())
        .clamp(-1.0, 1.0)
        .asin();
        let lon = self.lon
            + (bearing.sin() * distance.sin() * self.lat.cos())
                .atan2(distance.cos() - self.lat.sin() * lat.sin());
        Self::new(lon, lat)
    }

    pub fn lon_degrees(&self) -> f64 {
        self.lon.to_degrees()
    }

    pub fn lat_degrees(&self) -> f64 {
        self.lat.to_degrees()
    }
}

impl SkyPosition<Ecliptic> {
    /// Rotate about the equinox by the obliquity of the ecliptic
    pub fn to_equatorial(&self) -> SkyPosition<Equatorial> {
        let (x, y, z) = rotate_x(&self.unit_vector(), OBLIQUITY);
        SkyPosition::new(y.atan2(x), z.clamp(-1.0, 1.0).asin())
    }
}

impl SkyPosition<Equatorial> {
    pub fn to_ecliptic(&self) -> SkyPosition<Ecliptic> {
        let (x, y, z) = rotate_x(&self.unit_vector(), -OBLIQUITY);
        SkyPosition::new(y.atan2(x), z.clamp(-1.0, 1.0).asin())
    }

    /// Apply diurnal parallax for an observer
    ///
    /// # Arguments
    /// * `lmst` - Local mean sidereal time at the site (radians)
    /// * `geo_sin` - ρ sin φ′ of the site (Earth radii)
    /// * `geo_cos` - ρ cos φ′ of the site (Earth radii)
    /// * `distance_au` - Geocentric distance of the object
    pub fn to_topocentric(
        &self,
        lmst: f64,
        geo_sin: f64,
        geo_cos: f64,
        distance_au: f64,
    ) -> SkyPosition<Topocentric> {
        if distance_au <= 0.0 {
            return SkyPosition::new(self.lon, self.lat);
        }
        let parallax = EARTH_RADIUS_AU / distance_au;
        let hour_angle = lmst - self.lon;
        let cos_dec = self.lat.cos();
        let ra = if cos_dec.abs() > 1e-12 {
            self.lon - parallax * geo_cos * hour_angle.sin() / cos_dec
        } else {
            self.lon
        };
        let dec = self.lat
            - parallax * (geo_sin * cos_dec - geo_cos * hour_angle.cos() * self.lat.sin());
        SkyPosition::new(ra, dec.clamp(-FRAC_PI_2, FRAC_PI_2))
    }
}

impl<F: EquatorialFrame> SkyPosition<F> {
    /// Right ascension in radians
    pub fn ra(&self) -> f64 {
        self.lon
    }

    /// Declination in radians
    pub fn dec(&self) -> f64 {
        self.lat
    }

    /// Right ascension in hours, [0, 24)
    pub fn hours(&self) -> f64 {
        self.lon * RAD_TO_HOURS
    }

    /// Galactic latitude in radians
    pub fn galactic_latitude(&self) -> f64 {
        (self.lat.sin() * GALACTIC_POLE_DEC.sin()
            + self.lat.cos() * GALACTIC_POLE_DEC.cos() * (self.lon - GALACTIC_POLE_RA).cos())
        .clamp(-1.0, 1.0)
        .asin()
    }

    /// Hour-angle half width above `min_altitude_deg` at `latitude`
    pub fn rise_set(&self, latitude: f64, min_altitude_deg: f64) -> RiseSet {
        rise_set_hour_angle(self.lat, latitude, min_altitude_deg.to_radians())
    }

    /// Parse `hh mm ss.s ±dd mm ss.s`
    pub fn parse_sexagesimal(text: &str) -> Result<Self> {
        let malformed = || EphemError::MalformedCoordinate(text.to_string());
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(malformed());
        }
        let mut values = [0.0_f64; 6];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field.parse().map_err(|_| malformed())?;
        }
        let [h, m, s, d, dm, ds] = values;
        if !(0.0..24.0).contains(&h) || !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
            return Err(malformed());
        }
        if d.abs() > 90.0 || !(0.0..60.0).contains(&dm) || !(0.0..60.0).contains(&ds) {
            return Err(malformed());
        }
        // "-00 30 00" is south of the equator even though -0 parses as 0
        let sign = if fields[3].starts_with('-') { -1.0 } else { 1.0 };
        let hours = h + m / 60.0 + s / 3600.0;
        let degrees = sign * (d.abs() + dm / 60.0 + ds / 3600.0);
        Ok(Self::new(
            (hours * 15.0).to_radians(),
            degrees.to_radians(),
        ))
    }

    /// Format as `hh mm ss.s ±dd mm ss`
    pub fn to_sexagesimal(&self) -> String {
        let tenths = (self.hours() * 36000.0).round() as i64 % 864_000;
        let (h, m, s) = (tenths / 36000, (tenths / 600) % 60, (tenths % 600) as f64 / 10.0);

        let degrees = self.lat.to_degrees();
        let sign = if degrees < 0.0 { '-' } else { '+' };
        let arcsec = (degrees.abs() * 3600.0).round() as i64;
        let (d, dm, ds) = (arcsec / 3600, (arcsec / 60) % 60, arcsec % 60);
        format!("{h:02} {m:02} {s:04.1} {sign}{d:02} {dm:02} {ds:02}")
    }
}

impl<F: Frame> fmt::Display for SkyPosition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.4}°, {:+.4}°)",
            F::NAME,
            self.lon_degrees(),
            self.lat_degrees()
        )
    }
}

fn rotate_x(v: &[f64; 3], angle: f64) -> (f64, f64, f64) {
    let (s, c) = angle.sin_cos();
    (v[0], v[1] * c - v[2] * s, v[1] * s + v[2] * c)
}

/// Rise/set classification for a given altitude threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RiseSet {
    /// Crosses the threshold; time from meridian to threshold in hours
    RisesAndSets { half_width_hours: f64 },
    /// Stays above the threshold all day
    Circumpolar,
    /// Never reaches the threshold
    NeverRises,
}

impl RiseSet {
    /// Half width in hours; twelve for circumpolar objects, none when never visible
    pub fn half_width_hours(&self) -> Option<f64> {
        match self {
            RiseSet::RisesAndSets { half_width_hours } => Some(*half_width_hours),
            RiseSet::Circumpolar => Some(12.0),
            RiseSet::NeverRises => None,
        }
    }
}

/// Highest altitude reached by a declination at a latitude, radians
pub fn best_altitude(dec: f64, latitude: f64) -> f64 {
    FRAC_PI_2 - (latitude - dec).abs()
}

/// Hour angle at which `dec` crosses `min_altitude` seen from `latitude`
///
/// The acos form is only defined inside [-1, 1]. Outside it the object
/// either never drops below the threshold or never reaches it; the peak
/// altitude decides which.
pub fn rise_set_hour_angle(dec: f64, latitude: f64, min_altitude: f64) -> RiseSet {
    const EDGE: f64 = 1e-12;

    if best_altitude(dec, latitude) < min_altitude - EDGE {
        return RiseSet::NeverRises;
    }
    let denominator = dec.cos() * latitude.cos();
    if denominator.abs() < 1e-15 {
        // at a pole (of sky or Earth) altitude does not change through the day
        return RiseSet::Circumpolar;
    }
    let arg = (min_altitude.sin() - dec.sin() * latitude.sin()) / denominator;
    if arg < -1.0 - EDGE {
        RiseSet::Circumpolar
    } else {
        RiseSet::RisesAndSets {
            half_width_hours: arg.clamp(-1.0, 1.0).acos() * RAD_TO_HOURS,
        }
    }
}
