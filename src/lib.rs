//! Ephemerides and observing-night visibility for minor planets and comets
//!
//! Given orbital elements (or a directly observed position) and an observing
//! site, the crate propagates each object to the night's local midnight,
//! finds its meridian transit, rise and set times above a minimum altitude,
//! and its distance from the Moon. Everything is computed in memory from a
//! caller-supplied clock value; fetching and storing object lists is left to
//! the caller.
//!
//! ```no_run
//! use candidate_ephem::{update_all, Moment, Observatory, OrbitalElements, TrackedObject, VisibilityConfig};
//!
//! let site = Observatory::by_code("G40")?;
//! let elements = OrbitalElements::from_degrees(
//!     Moment::from_julian(2460600.5), 60.0, 10.6, 80.3, 73.4, 2.77, 0.079, 0.2141,
//! );
//! let mut objects = vec![TrackedObject::with_elements("2024 AA", elements)];
//! let report = update_all(&mut objects, &Moment::now(), site, &VisibilityConfig::from_site(site))?;
//! println!("{} objects updated", report.updated);
//! # Ok::<(), candidate_ephem::EphemError>(())
//! ```

pub mod constraints;
pub mod coordinates;
pub mod ephemeris;
pub mod error;
pub mod observatory;
pub mod settings;
pub mod tracked;
pub mod utils;
pub mod visibility;

// Re-export public API
pub use coordinates::{Ecliptic, Equatorial, RiseSet, SkyPosition, Topocentric};
pub use ephemeris::{BodyEphemeris, Earth, Moon, OrbitalElements, PropagatedPosition, Sun};
pub use error::{EphemError, Result};
pub use observatory::Observatory;
pub use settings::Settings;
pub use tracked::{ObjectStatus, TrackedObject, Visibility};
pub use utils::time_utils::Moment;
pub use visibility::{
    update_all, update_object, BatchReport, ObservationWindow, TwilightType, VisibilityConfig,
};
