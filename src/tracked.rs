//! Objects on the observing list
//!
//! A [`TrackedObject`] is an in-memory record owned by the caller. The
//! visibility update writes its computed fields in place; everything else
//! (name, elements, photometric parameters) is set by whoever fills the list.

use serde::{Deserialize, Serialize};

use crate::coordinates::{Equatorial, RiseSet, SkyPosition, Topocentric};
use crate::ephemeris::elements::OrbitalElements;
use crate::ephemeris::magnitude::estimated_diameter_m;
use crate::ephemeris::propagator::{position_at, PropagatedPosition};
use crate::error::{EphemError, Result};
use crate::observatory::Observatory;
use crate::utils::packed::{pack_designation, pack_number};
use crate::utils::time_utils::Moment;

/// Default H-G slope parameter
pub const DEFAULT_SLOPE: f64 = 0.15;

fn default_slope() -> f64 {
    DEFAULT_SLOPE
}

/// Outcome of the last visibility update for one object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ObjectStatus {
    /// Not updated yet
    #[default]
    Pending,
    Updated,
    /// Neither elements nor an observed position; visibility left unset
    NoPosition,
    /// Computation failed for this object only
    Failed(String),
}

/// Change in apparent magnitude since the previous update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagnitudeTrend {
    Brightening,
    Fading,
    Steady,
}

impl MagnitudeTrend {
    const STEADY_BAND: f64 = 0.05;

    pub fn between(previous: f64, current: f64) -> Self {
        let delta = current - previous;
        if delta < -Self::STEADY_BAND {
            MagnitudeTrend::Brightening
        } else if delta > Self::STEADY_BAND {
            MagnitudeTrend::Fading
        } else {
            MagnitudeTrend::Steady
        }
    }

    /// Single-character marker: `+` brightening, `-` fading, blank when steady
    pub fn marker(&self) -> char {
        match self {
            MagnitudeTrend::Brightening => '+',
            MagnitudeTrend::Fading => '-',
            MagnitudeTrend::Steady => ' ',
        }
    }
}

/// Tonight's meridian passage and visibility at one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    /// Meridian transit
    pub meridian: Moment,
    /// Crosses above the minimum altitude; unset when it never gets there
    pub rise: Option<Moment>,
    /// Drops below the minimum altitude
    pub set: Option<Moment>,
    /// Altitude at transit, degrees
    pub best_altitude_deg: f64,
    pub rise_set: RiseSet,
    /// Distance from the Moon at transit, degrees
    pub moon_separation_deg: f64,
}

impl Visibility {
    /// Hours spent above the minimum altitude
    pub fn hours_visible(&self) -> f64 {
        self.rise_set.half_width_hours().map_or(0.0, |h| 2.0 * h)
    }

    /// Whether the object is above the minimum altitude at `moment`
    pub fn is_up_at(&self, moment: &Moment) -> bool {
        match (&self.rise, &self.set) {
            (Some(rise), Some(set)) => rise <= moment && moment <= set,
            _ => false,
        }
    }
}

/// One object on the observing list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Designation or name, e.g. `2014 AB12` or `Ceres`
    pub name: String,
    /// Permanent number, when numbered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<OrbitalElements>,
    /// Position reported directly (confirmation-page objects without an orbit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_position: Option<SkyPosition<Equatorial>>,
    #[serde(default)]
    pub is_comet: bool,
    /// Absolute magnitude H
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_magnitude: Option<f64>,
    /// Slope parameter G
    #[serde(default = "default_slope")]
    pub slope: f64,
    /// MPC orbit uncertainty parameter U, 0 (best) to 9
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<u8>,

    // Fields below are written by the visibility update.
    #[serde(default)]
    pub position: Option<SkyPosition<Topocentric>>,
    /// Apparent V magnitude at transit
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub magnitude_trend: Option<MagnitudeTrend>,
    /// Apparent motion, arcminutes per hour
    #[serde(default)]
    pub motion_arcmin_per_hour: Option<f64>,
    #[serde(default)]
    pub heliocentric_distance: Option<f64>,
    #[serde(default)]
    pub geocentric_distance: Option<f64>,
    /// Sun-object-Earth angle, radians
    #[serde(default)]
    pub phase_angle: Option<f64>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub status: ObjectStatus,
}

impl TrackedObject {
    /// An object known only by name
    pub fn new(name: impl Into<String>) -> Self {
        TrackedObject {
            name: name.into(),
            number: None,
            elements: None,
            observed_position: None,
            is_comet: false,
            absolute_magnitude: None,
            slope: DEFAULT_SLOPE,
            uncertainty: None,
            position: None,
            magnitude: None,
            magnitude_trend: None,
            motion_arcmin_per_hour: None,
            heliocentric_distance: None,
            geocentric_distance: None,
            phase_angle: None,
            visibility: None,
            status: ObjectStatus::Pending,
        }
    }

    pub fn with_elements(name: impl Into<String>, elements: OrbitalElements) -> Self {
        TrackedObject {
            elements: Some(elements),
            ..Self::new(name)
        }
    }

    pub fn with_observed_position(name: impl Into<String>, position: SkyPosition<Equatorial>) -> Self {
        TrackedObject {
            observed_position: Some(position),
            ..Self::new(name)
        }
    }

    /// Packed permanent number, `None` for unnumbered objects
    pub fn packed_number(&self) -> Option<Result<String>> {
        self.number.as_deref().map(pack_number)
    }

    /// Packed provisional designation derived from the name
    pub fn packed_designation(&self) -> Result<String> {
        pack_designation(&self.name)
    }

    /// Identifier used to match catalog records: packed number when numbered,
    /// packed designation otherwise
    pub fn catalog_id(&self) -> Result<String> {
        match self.packed_number() {
            Some(packed) => packed,
            None => self.packed_designation(),
        }
    }

    /// Diameter estimate in metres from H, when known
    pub fn estimated_diameter_m(&self) -> Option<f64> {
        self.absolute_magnitude.map(estimated_diameter_m)
    }

    /// Drop every field the visibility update computes
    ///
    /// The magnitude is kept: it may have come with the object rather than
    /// from an earlier update.
    pub fn clear_computed(&mut self) {
        self.position = None;
        self.magnitude_trend = None;
        self.motion_arcmin_per_hour = None;
        self.heliocentric_distance = None;
        self.geocentric_distance = None;
        self.phase_angle = None;
        self.visibility = None;
    }

    /// Ephemeris of this object at an arbitrary instant
    ///
    /// # Errors
    /// `MissingElements` when the object has no orbit, otherwise any
    /// propagation failure.
    pub fn ephemeris_at(&self, moment: &Moment, site: &Observatory) -> Result<PropagatedPosition> {
        let elements = self
            .elements
            .as_ref()
            .ok_or_else(|| EphemError::MissingElements(self.name.clone()))?;
        position_at(elements, moment, site)
    }
}
