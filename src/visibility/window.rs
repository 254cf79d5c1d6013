//! Nightly observing window at a site
//!
//! The window runs from the Sun crossing the twilight altitude in the
//! evening to crossing it again in the morning. It is always the session
//! ending with the next sunrise after "now", so a window computed during the
//! night describes the session already in progress.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coordinates::RiseSet;
use crate::ephemeris::ephemeris_common::BodyEphemeris;
use crate::ephemeris::sun::Sun;
use crate::error::{bad_parameter, EphemError, Result};
use crate::observatory::Observatory;
use crate::utils::time_utils::Moment;

/// Twilight definition bounding the night
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwilightType {
    /// Civil twilight (-6° below horizon)
    Civil,
    /// Nautical twilight (-12° below horizon)
    Nautical,
    /// Astronomical twilight (-18° below horizon)
    #[default]
    Astronomical,
    /// No twilight - geometric sunset and sunrise
    None,
}

impl TwilightType {
    /// Sun altitude that ends the night, degrees
    pub fn sun_altitude_deg(&self) -> f64 {
        match self {
            TwilightType::Civil => -6.0,
            TwilightType::Nautical => -12.0,
            TwilightType::Astronomical => -18.0,
            TwilightType::None => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TwilightType::Civil => "civil",
            TwilightType::Nautical => "nautical",
            TwilightType::Astronomical => "astronomical",
            TwilightType::None => "none",
        }
    }

    /// Position in the settings selector: none, civil, nautical, astronomical
    pub fn index(&self) -> u8 {
        match self {
            TwilightType::None => 0,
            TwilightType::Civil => 1,
            TwilightType::Nautical => 2,
            TwilightType::Astronomical => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(TwilightType::None),
            1 => Some(TwilightType::Civil),
            2 => Some(TwilightType::Nautical),
            3 => Some(TwilightType::Astronomical),
            _ => None,
        }
    }
}

impl FromStr for TwilightType {
    type Err = EphemError;

    /// Accepts a selector index or a name, case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if let Ok(index) = value.parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| bad_parameter("twilight", s));
        }
        match value.to_ascii_lowercase().as_str() {
            "none" => Ok(TwilightType::None),
            "civil" => Ok(TwilightType::Civil),
            "nautical" => Ok(TwilightType::Nautical),
            "astronomical" => Ok(TwilightType::Astronomical),
            _ => Err(bad_parameter("twilight", s)),
        }
    }
}

/// Sunset, local midnight and next sunrise for one site and night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    /// Time the window was computed for
    pub now: Moment,
    pub sunset: Moment,
    pub midnight: Moment,
    /// First sunrise strictly after `now`
    pub sunrise: Moment,
    pub twilight: TwilightType,
}

impl ObservationWindow {
    /// Compute the window for `now` at `site`
    ///
    /// # Errors
    /// `NoObservingNight` when the Sun stays above the twilight altitude all
    /// day. When it never climbs above it (polar night) the window spans a
    /// full day ending at the Sun's meridian passage.
    pub fn compute(now: &Moment, site: &Observatory, twilight: TwilightType) -> Result<Self> {
        let sun = Sun.position_at(now)?;
        let offset = site.lmst_offset_hours(now);
        let threshold = twilight.sun_altitude_deg();

        let half_day_hours = match sun.equatorial.rise_set(site.latitude(), threshold) {
            RiseSet::RisesAndSets { half_width_hours } => half_width_hours,
            RiseSet::NeverRises => 0.0,
            RiseSet::Circumpolar => {
                return Err(EphemError::NoObservingNight {
                    threshold_deg: threshold,
                    latitude_deg: site.latitude_deg,
                })
            }
        };

        let mut sunrise = now
            .start_of_day()
            .plus_days((sun.equatorial.hours() - offset - half_day_hours) / 24.0);
        while sunrise.julian() <= now.julian() {
            sunrise.add_days(1.0);
        }
        while sunrise.julian() - 1.0 > now.julian() {
            sunrise.add_days(-1.0);
        }
        let sunset = sunrise.plus_days(-(24.0 - 2.0 * half_day_hours) / 24.0);
        let midnight = Moment::from_julian(0.5 * (sunset.julian() + sunrise.julian()));

        log::debug!(
            "{} window for {now}: sunset {sunset}, midnight {midnight}, sunrise {sunrise}",
            site.code
        );
        Ok(ObservationWindow {
            now: now.clone(),
            sunset,
            midnight,
            sunrise,
            twilight,
        })
    }

    /// Length of the night in hours
    pub fn night_hours(&self) -> f64 {
        self.sunrise.days_since(&self.sunset) * 24.0
    }

    /// True when `moment` falls between sunset and sunrise
    pub fn contains(&self, moment: &Moment) -> bool {
        self.sunset.julian() <= moment.julian() && moment.julian() <= self.sunrise.julian()
    }

    /// Whether the session has already started at `now`
    pub fn in_progress(&self) -> bool {
        self.contains(&self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teide() -> &'static Observatory {
        Observatory::by_code("G40").unwrap()
    }

    #[test]
    fn test_window_before_the_night() {
        let now = Moment::from_julian(2460600.8);
        let w = ObservationWindow::compute(&now, teide(), TwilightType::Astronomical).unwrap();
        assert!((w.sunset.julian() - 2460601.3285).abs() < 2e-4);
        assert!((w.midnight.julian() - 2460601.5357).abs() < 2e-4);
        assert!((w.sunrise.julian() - 2460601.7428).abs() < 2e-4);
        assert!(!w.in_progress());
        assert!(w.night_hours() > 9.0 && w.night_hours() < 11.0);
    }

    #[test]
    fn test_window_in_progress() {
        let now = Moment::from_julian(2460601.45);
        let w = ObservationWindow::compute(&now, teide(), TwilightType::Astronomical).unwrap();
        assert!(w.in_progress());
        assert!(w.sunrise > now);
        assert!(w.sunset <= w.midnight && w.midnight <= w.sunrise);
    }

    #[test]
    fn test_twilight_widens_night() {
        let now = Moment::from_julian(2460600.8);
        let civil = ObservationWindow::compute(&now, teide(), TwilightType::Civil).unwrap();
        let astro = ObservationWindow::compute(&now, teide(), TwilightType::Astronomical).unwrap();
        assert!(civil.night_hours() > astro.night_hours());
        assert!(civil.sunset < astro.sunset);
    }

    #[test]
    fn test_sunrise_is_next_after_now() {
        for k in 0..24 {
            let now = Moment::from_julian(2460600.5 + k as f64 / 24.0);
            let w = ObservationWindow::compute(&now, teide(), TwilightType::Nautical).unwrap();
            assert!(w.sunrise > now);
            assert!(w.sunrise.days_since(&now) <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_twilight_parsing() {
        assert_eq!("3".parse::<TwilightType>().unwrap(), TwilightType::Astronomical);
        assert_eq!("Civil".parse::<TwilightType>().unwrap(), TwilightType::Civil);
        assert!("7".parse::<TwilightType>().is_err());
        assert!("dusk".parse::<TwilightType>().is_err());
        for t in [TwilightType::None, TwilightType::Civil, TwilightType::Nautical] {
            assert_eq!(TwilightType::from_index(t.index()), Some(t));
        }
    }

    #[test]
    fn test_midnight_sun_has_no_night() {
        let arctic = Observatory {
            code: "TST".to_string(),
            name: "Arctic test".to_string(),
            latitude_deg: 78.0,
            longitude_deg: 15.0,
            geo_sin: 0.977,
            geo_cos: 0.209,
            min_altitude_deg: 20.0,
            limiting_magnitude: 18.0,
        };
        // 2024 Jun 21
        let now = Moment::from_julian(2460482.5);
        assert!(matches!(
            ObservationWindow::compute(&now, &arctic, TwilightType::Astronomical),
            Err(EphemError::NoObservingNight { .. })
        ));
        // 2024 Dec 21, polar night
        let now = Moment::from_julian(2460665.5);
        let w = ObservationWindow::compute(&now, &arctic, TwilightType::None).unwrap();
        assert!((w.night_hours() - 24.0).abs() < 1e-9);
    }
}
