//! Observing-night window and per-object visibility

pub mod batch;
pub mod update;
pub mod window;

pub use batch::{update_all, update_all_in_window, BatchReport};
pub use update::{meridian_transit, update_object, within_magnitude_limit, VisibilityConfig};
pub use window::{ObservationWindow, TwilightType};
