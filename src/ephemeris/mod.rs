//! Sun, Moon and Earth ephemerides and two-body propagation of small bodies

pub mod earth;
pub mod elements;
pub mod ephemeris_common;
pub mod kepler;
pub mod magnitude;
pub mod moon;
pub mod propagator;
pub mod sun;

pub use earth::{Earth, EarthPosition};
pub use elements::OrbitalElements;
pub use ephemeris_common::BodyEphemeris;
pub use kepler::{solve_kepler, OrbitPoint};
pub use moon::{Moon, MoonPosition};
pub use propagator::{position_at, PropagatedPosition};
pub use sun::{Sun, SunPosition};
