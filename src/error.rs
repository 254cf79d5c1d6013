//! Error types for ephemeris and visibility computation

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum EphemError {
    /// Newton iteration on Kepler's equation did not reach tolerance
    #[error("Kepler equation did not converge (e={eccentricity}, M={mean_anomaly} rad) after {iterations} iterations")]
    KeplerNonConvergence {
        eccentricity: f64,
        mean_anomaly: f64,
        iterations: usize,
    },

    /// An operation needed orbital elements the object does not carry
    #[error("Object '{0}' has no orbital elements")]
    MissingElements(String),

    /// Elements that cannot describe an orbit (negative eccentricity, zero distance, ...)
    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),

    /// A five-character packed date that does not decode
    #[error("Malformed packed date '{0}'")]
    MalformedPackedDate(String),

    /// A packed number or provisional designation that cannot be encoded
    #[error("Cannot pack identifier '{0}'")]
    MalformedIdentifier(String),

    /// Text that does not parse as a date in the expected layout
    #[error("Malformed date '{0}'")]
    MalformedDate(String),

    /// Sexagesimal RA/Dec text that does not parse
    #[error("Malformed coordinate '{0}'")]
    MalformedCoordinate(String),

    /// A user configuration value that is not a valid number or choice
    #[error("Bad parameter {key}: '{value}'")]
    BadParameter { key: String, value: String },

    /// Observatory code not present in the site catalog
    #[error("Unknown observatory code '{0}'")]
    UnknownSite(String),

    /// The Sun stays above the twilight threshold for the whole day at this site
    #[error("No observing night: Sun never drops below {threshold_deg}° at latitude {latitude_deg}°")]
    NoObservingNight {
        threshold_deg: f64,
        latitude_deg: f64,
    },

    /// Error when a file I/O operation fails
    #[error("File I/O error on {path:?}: {source}")]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, EphemError>;

/// Convert a std::io::Error to EphemError with path context
pub fn io_err(path: impl Into<PathBuf>, err: std::io::Error) -> EphemError {
    EphemError::FileError {
        path: path.into(),
        source: err,
    }
}

/// Shorthand for a [`EphemError::BadParameter`]
pub(crate) fn bad_parameter(key: &str, value: &str) -> EphemError {
    EphemError::BadParameter {
        key: key.to_string(),
        value: value.to_string(),
    }
}
