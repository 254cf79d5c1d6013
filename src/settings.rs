//! User settings
//!
//! Stored as `key=value` properties (one per line, `#` or `!` comments) or
//! as JSON. Keys:
//!
//! | key           | meaning                                        |
//! |---------------|------------------------------------------------|
//! | `twilight`    | twilight selector index or name                |
//! | `observatory` | site code, or index into the site catalog      |
//! | `dlmag`       | faintest magnitude fetched from catalogs       |
//! | `dispmag`     | faintest magnitude planned                     |
//! | `minalt`      | minimum altitude (degrees)                     |
//! | `minga`       | minimum absolute galactic latitude (degrees)   |
//! | `uncert`      | largest acceptable orbit uncertainty (0-9)     |

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constraints::{
    AllConfig, AltitudeConfig, ConstraintSpec, GalacticLatitudeConfig, MagnitudeConfig,
    UncertaintyConfig,
};
use crate::error::{bad_parameter, io_err, Result};
use crate::observatory::Observatory;
use crate::utils::config::DEFAULT_SETTINGS_PATH;
use crate::visibility::{TwilightType, VisibilityConfig};

/// Persisted user options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub twilight: TwilightType,
    /// MPC code of the observing site
    pub observatory: String,
    pub download_magnitude: f64,
    pub display_magnitude: f64,
    pub min_altitude_deg: f64,
    pub min_galactic_latitude_deg: f64,
    pub max_uncertainty: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            twilight: TwilightType::Astronomical,
            observatory: "G40".to_string(),
            download_magnitude: 20.0,
            display_magnitude: 19.5,
            min_altitude_deg: 35.0,
            min_galactic_latitude_deg: 0.0,
            max_uncertainty: 9,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| bad_parameter(key, value))
}

fn parse_observatory(value: &str) -> Result<String> {
    let value = value.trim();
    if let Ok(index) = value.parse::<usize>() {
        return Observatory::catalog()
            .get(index)
            .map(|site| site.code.clone())
            .ok_or_else(|| bad_parameter("observatory", value));
    }
    Observatory::by_code(value)
        .map(|site| site.code.clone())
        .map_err(|_| bad_parameter("observatory", value))
}

impl Settings {
    /// Parse properties text; keys not present keep their defaults
    ///
    /// # Errors
    /// `BadParameter` for the first value that does not parse.
    pub fn from_properties(text: &str) -> Result<Self> {
        let mut settings = Settings::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once(['=', ':']) else {
                log::warn!("Ignoring settings line without a value: {line}");
                continue;
            };
            settings.set(key.trim(), value)?;
        }
        Ok(settings)
    }

    /// Set one option from its properties key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "twilight" => self.twilight = value.parse()?,
            "observatory" => self.observatory = parse_observatory(value)?,
            "dlmag" => self.download_magnitude = parse_number(key, value)?,
            "dispmag" => self.display_magnitude = parse_number(key, value)?,
            "minalt" => {
                let alt: f64 = parse_number(key, value)?;
                if !(0.0..=90.0).contains(&alt) {
                    return Err(bad_parameter(key, value));
                }
                self.min_altitude_deg = alt;
            }
            "minga" => self.min_galactic_latitude_deg = parse_number(key, value)?,
            "uncert" => {
                let u: u8 = parse_number(key, value)?;
                if u > 9 {
                    return Err(bad_parameter(key, value));
                }
                self.max_uncertainty = u;
            }
            other => log::debug!("Unknown settings key '{other}'"),
        }
        Ok(())
    }

    pub fn to_properties(&self) -> String {
        let mut out = String::from("# candidate_ephem settings\n");
        let _ = writeln!(out, "twilight={}", self.twilight.index());
        let _ = writeln!(out, "observatory={}", self.observatory);
        let _ = writeln!(out, "dlmag={}", self.download_magnitude);
        let _ = writeln!(out, "dispmag={}", self.display_magnitude);
        let _ = writeln!(out, "minalt={}", self.min_altitude_deg);
        let _ = writeln!(out, "minga={}", self.min_galactic_latitude_deg);
        let _ = writeln!(out, "uncert={}", self.max_uncertainty);
        out
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Read settings from `path`; `.json` files are read as JSON
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&text)
        } else {
            Self::from_properties(&text)
        }
    }

    /// Settings from the default location, or defaults when absent or unreadable
    pub fn load_or_default() -> Self {
        let path = DEFAULT_SETTINGS_PATH.as_path();
        if !path.exists() {
            return Settings::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Using default settings: {e}");
            Settings::default()
        })
    }

    /// Write settings to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let text = if path.extension().is_some_and(|ext| ext == "json") {
            self.to_json()
        } else {
            self.to_properties()
        };
        fs::write(path, text).map_err(|e| io_err(path, e))
    }

    pub fn save_default(&self) -> Result<()> {
        self.save(DEFAULT_SETTINGS_PATH.as_path())
    }

    /// Selected site from the catalog
    pub fn site(&self) -> Result<&'static Observatory> {
        Observatory::by_code(&self.observatory)
    }

    /// List filters implied by these settings
    pub fn constraints(&self) -> ConstraintSpec {
        ConstraintSpec::All(
            AllConfig::default()
                .with(ConstraintSpec::Altitude(AltitudeConfig {
                    min_altitude: self.min_altitude_deg,
                    max_altitude: None,
                }))
                .with(ConstraintSpec::Magnitude(MagnitudeConfig {
                    limiting_magnitude: self.display_magnitude,
                    require_magnitude: false,
                }))
                .with(ConstraintSpec::GalacticLatitude(GalacticLatitudeConfig {
                    min_latitude: self.min_galactic_latitude_deg,
                }))
                .with(ConstraintSpec::Uncertainty(UncertaintyConfig {
                    max_uncertainty: self.max_uncertainty,
                })),
        )
    }

    /// Limits for a visibility update
    pub fn visibility_config(&self) -> VisibilityConfig {
        VisibilityConfig {
            min_altitude_deg: self.min_altitude_deg,
            limiting_magnitude: self.display_magnitude,
            twilight: self.twilight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EphemError;

    #[test]
    fn test_parse_properties() {
        let text = "#CandidatesIni\n\
                    twilight=2\n\
                    observatory=1\n\
                    dlmag=21.5\n\
                    dispmag=19\n\
                    minalt=30\n\
                    minga=15\n\
                    uncert=5\n";
        let s = Settings::from_properties(text).unwrap();
        assert_eq!(s.twilight, TwilightType::Nautical);
        assert_eq!(s.observatory, "W88");
        assert_eq!(s.download_magnitude, 21.5);
        assert_eq!(s.display_magnitude, 19.0);
        assert_eq!(s.min_altitude_deg, 30.0);
        assert_eq!(s.min_galactic_latitude_deg, 15.0);
        assert_eq!(s.max_uncertainty, 5);
        assert_eq!(s.site().unwrap().code, "W88");
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let s = Settings::from_properties("observatory = g40\nfoo=bar\n").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_bad_number_is_reported() {
        match Settings::from_properties("minalt=high") {
            Err(EphemError::BadParameter { key, value }) => {
                assert_eq!(key, "minalt");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Settings::from_properties("uncert=12").is_err());
        assert!(Settings::from_properties("observatory=7").is_err());
    }

    #[test]
    fn test_properties_round_trip() {
        let mut s = Settings::default();
        s.twilight = TwilightType::Civil;
        s.min_galactic_latitude_deg = 12.5;
        assert_eq!(Settings::from_properties(&s.to_properties()).unwrap(), s);
    }

    #[test]
    fn test_partial_json() {
        let s = Settings::from_json(r#"{"observatory":"W88","min_altitude_deg":25.0}"#).unwrap();
        assert_eq!(s.observatory, "W88");
        assert_eq!(s.min_altitude_deg, 25.0);
        assert_eq!(s.twilight, TwilightType::Astronomical);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("candidate_ephem_{}", std::process::id()));
        let ini = dir.join("settings.ini");
        let json = dir.join("settings.json");
        let mut s = Settings::default();
        s.max_uncertainty = 3;
        s.save(&ini).unwrap();
        s.save(&json).unwrap();
        assert_eq!(Settings::load(&ini).unwrap(), s);
        assert_eq!(Settings::load(&json).unwrap(), s);
        let _ = fs::remove_dir_all(&dir);
        assert!(Settings::load(&ini).is_err());
    }

    #[test]
    fn test_constraints_follow_settings() {
        use crate::constraints::ConstraintConfig;
        let name = Settings::default().constraints().name();
        assert!(name.contains("min_alt=35.0°"), "{name}");
        assert!(name.contains("V≤19.5"), "{name}");
        assert!(name.contains("U≤9"), "{name}");
    }

    #[test]
    fn test_visibility_config() {
        let cfg = Settings::default().visibility_config();
        assert_eq!(cfg.min_altitude_deg, 35.0);
        assert_eq!(cfg.limiting_magnitude, 19.5);
    }
}
