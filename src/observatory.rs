//! Observing sites
//!
//! A small static catalog of the sites the tracker plans for. Geodetic
//! sine/cosine terms (ρ sin φ′, ρ cos φ′) are the MPC parallax constants.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{EphemError, Result};
use crate::utils::time_utils::{local_mean_sidereal_time, sidereal_offset_hours, Moment};

/// An observing site with its default filter limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observatory {
    /// MPC observatory code
    pub code: String,
    pub name: String,
    /// Geographic latitude in degrees
    pub latitude_deg: f64,
    /// East longitude in degrees, [0, 360)
    pub longitude_deg: f64,
    /// ρ sin φ′
    pub geo_sin: f64,
    /// ρ cos φ′
    pub geo_cos: f64,
    /// Default minimum altitude for planning (degrees)
    pub min_altitude_deg: f64,
    /// Default faintest magnitude worth planning
    pub limiting_magnitude: f64,
}

static CATALOG: Lazy<Vec<Observatory>> = Lazy::new(|| {
    vec![
        Observatory {
            code: "G40".to_string(),
            name: "Slooh Teide".to_string(),
            latitude_deg: 28.3,
            longitude_deg: 343.491740,
            geo_sin: 0.471441,
            geo_cos: 0.881470,
            min_altitude_deg: 35.0,
            limiting_magnitude: 19.5,
        },
        Observatory {
            code: "W88".to_string(),
            name: "Slooh Chile".to_string(),
            latitude_deg: -33.26,
            longitude_deg: 289.46570,
            geo_sin: -0.545574,
            geo_cos: 0.837136,
            min_altitude_deg: 35.0,
            limiting_magnitude: 19.5,
        },
    ]
});

impl Observatory {
    /// All known sites
    pub fn catalog() -> &'static [Observatory] {
        &CATALOG
    }

    /// Look up a site by MPC code (case-insensitive)
    pub fn by_code(code: &str) -> Result<&'static Observatory> {
        CATALOG
            .iter()
            .find(|site| site.code.eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| EphemError::UnknownSite(code.to_string()))
    }

    /// Latitude in radians
    pub fn latitude(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    /// East longitude in radians
    pub fn longitude(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// Local mean sidereal time at the site, radians
    pub fn lmst(&self, moment: &Moment) -> f64 {
        local_mean_sidereal_time(moment, self.longitude())
    }

    /// Local sidereal time minus UT, hours
    pub fn lmst_offset_hours(&self, moment: &Moment) -> f64 {
        sidereal_offset_hours(moment, self.longitude())
    }

    /// `G40-Slooh Teide`
    pub fn label(&self) -> String {
        format!("{}-{}", self.code, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let site = Observatory::by_code("g40").unwrap();
        assert_eq!(site.name, "Slooh Teide");
        assert_eq!(site.label(), "G40-Slooh Teide");
        assert!(Observatory::by_code("XXX").is_err());
        assert_eq!(Observatory::catalog().len(), 2);
    }

    #[test]
    fn test_parallax_constants_are_near_unit_radius() {
        for site in Observatory::catalog() {
            let rho = (site.geo_sin.powi(2) + site.geo_cos.powi(2)).sqrt();
            assert!((rho - 1.0).abs() < 0.01, "{}: rho = {rho}", site.code);
            assert_eq!(site.geo_sin.signum(), site.latitude_deg.signum());
        }
    }

    #[test]
    fn test_site_serializes() {
        let site = Observatory::by_code("W88").unwrap();
        let json = serde_json::to_string(site).unwrap();
        let back: Observatory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, site.code);
        assert!((back.longitude_deg - site.longitude_deg).abs() < 1e-9);
    }
}
