//! Per-object meridian, rise/set and Moon-separation update
//!
//! The meridian transit is found in two passes. The first uses the position
//! at local midnight; the object is then re-propagated at that estimate and
//! the transit recomputed with the sidereal offset at the estimate. For
//! objects moving under a degree a day this lands within a few minutes of a
//! brute-force search without iterating to a fixed point.

use serde::{Deserialize, Serialize};

use crate::coordinates::{best_altitude, EquatorialFrame, RiseSet, SkyPosition, Topocentric};
use crate::ephemeris::elements::OrbitalElements;
use crate::ephemeris::magnitude::apparent_magnitude;
use crate::ephemeris::moon::Moon;
use crate::ephemeris::propagator::{position_at, PropagatedPosition};
use crate::error::Result;
use crate::observatory::Observatory;
use crate::tracked::{MagnitudeTrend, ObjectStatus, TrackedObject, Visibility};
use crate::utils::config::RAD_PER_DAY_TO_ARCMIN_PER_HOUR;
use crate::utils::time_utils::Moment;
use crate::visibility::window::{ObservationWindow, TwilightType};

/// Shortest midnight-to-transit span used for the motion estimate (days)
const MIN_MOTION_SPAN: f64 = 1.0 / 24.0;

/// Site-dependent limits for one update cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Altitude an object must clear to count as up (degrees)
    pub min_altitude_deg: f64,
    /// Faintest apparent magnitude worth planning
    pub limiting_magnitude: f64,
    pub twilight: TwilightType,
}

impl VisibilityConfig {
    /// The site's default limits with astronomical twilight
    pub fn from_site(site: &Observatory) -> Self {
        VisibilityConfig {
            min_altitude_deg: site.min_altitude_deg,
            limiting_magnitude: site.limiting_magnitude,
            twilight: TwilightType::Astronomical,
        }
    }
}

/// Transit time for a right ascension, placed in the night that `sunset` opens
///
/// # Arguments
/// * `ra_hours` - Right ascension in hours
/// * `offset_hours` - Local sidereal time minus UT at the site
/// * `day_start` - 0h UT of the observing date
/// * `sunset` - Start of the observing window
pub fn meridian_transit(ra_hours: f64, offset_hours: f64, day_start: &Moment, sunset: &Moment) -> Moment {
    let hours = (24.0 + ra_hours - offset_hours).rem_euclid(24.0);
    let mut transit = day_start.plus_days(hours / 24.0);
    while transit.julian() < sunset.julian() - 0.5 {
        transit.add_days(1.0);
    }
    while transit.julian() >= sunset.julian() + 0.5 {
        transit.add_days(-1.0);
    }
    transit
}

fn transit_of<F: EquatorialFrame>(
    position: &SkyPosition<F>,
    at: &Moment,
    window: &ObservationWindow,
    site: &Observatory,
) -> Moment {
    meridian_transit(
        position.hours(),
        site.lmst_offset_hours(at),
        &window.now.start_of_day(),
        &window.sunset,
    )
}

/// Propagated state at transit plus the midnight position it was refined from
struct Refined {
    meridian: Moment,
    at_meridian: PropagatedPosition,
    at_midnight: PropagatedPosition,
    motion: f64,
}

fn refine_with_elements(
    elements: &OrbitalElements,
    window: &ObservationWindow,
    site: &Observatory,
) -> Result<Refined> {
    let at_midnight = position_at(elements, &window.midnight, site)?;
    let first = transit_of(&at_midnight.topocentric, &window.midnight, window, site);
    let at_meridian = position_at(elements, &first, site)?;

    let span = first.days_since(&window.midnight).abs();
    let motion = if span >= MIN_MOTION_SPAN {
        at_meridian.geocentric.separation(&at_midnight.geocentric) / span
    } else {
        let later = position_at(elements, &window.midnight.plus_days(MIN_MOTION_SPAN), site)?;
        later.geocentric.separation(&at_midnight.geocentric) / MIN_MOTION_SPAN
    };

    let meridian = transit_of(&at_meridian.topocentric, &first, window, site);
    Ok(Refined {
        meridian,
        at_meridian,
        at_midnight,
        motion: motion * RAD_PER_DAY_TO_ARCMIN_PER_HOUR,
    })
}

fn visibility_at(
    position: &SkyPosition<Topocentric>,
    meridian: Moment,
    moon_reference: &SkyPosition<Topocentric>,
    site: &Observatory,
    config: &VisibilityConfig,
) -> Result<Visibility> {
    let moon = Moon.topocentric(&meridian, site)?;
    let rise_set = position.rise_set(site.latitude(), config.min_altitude_deg);
    let (rise, set) = match rise_set.half_width_hours() {
        Some(half_width) => (
            Some(meridian.plus_days(-half_width / 24.0)),
            Some(meridian.plus_days(half_width / 24.0)),
        ),
        None => (None, None),
    };
    Ok(Visibility {
        best_altitude_deg: best_altitude(position.dec(), site.latitude()).to_degrees(),
        moon_separation_deg: moon_reference.separation(&moon).to_degrees(),
        meridian,
        rise,
        set,
        rise_set,
    })
}

/// Update one object's position, motion and visibility for the night in `window`
///
/// Objects with elements are propagated; objects with only an observed
/// position use it as-is. With neither, the computed fields are cleared and
/// the status becomes [`ObjectStatus::NoPosition`].
///
/// # Errors
/// Propagation failures (invalid elements, Kepler non-convergence). The
/// object's computed fields are left as they were before the call.
pub fn update_object(
    object: &mut TrackedObject,
    window: &ObservationWindow,
    site: &Observatory,
    config: &VisibilityConfig,
) -> Result<()> {
    if let Some(elements) = &object.elements {
        let refined = refine_with_elements(elements, window, site)?;
        // comets are checked against the Moon where they actually are
        let moon_reference = if object.is_comet {
            refined.at_meridian.topocentric
        } else {
            refined.at_midnight.topocentric
        };
        let visibility = visibility_at(
            &refined.at_meridian.topocentric,
            refined.meridian,
            &moon_reference,
            site,
            config,
        )?;

        let at = refined.at_meridian;
        let magnitude = match (object.is_comet, object.absolute_magnitude) {
            (false, Some(h)) => Some(apparent_magnitude(
                h,
                object.slope,
                at.heliocentric_distance,
                at.geocentric_distance,
                at.phase_angle,
            )),
            _ => None,
        };
        match magnitude {
            Some(current) => {
                object.magnitude_trend = object
                    .magnitude
                    .map(|previous| MagnitudeTrend::between(previous, current));
                object.magnitude = Some(current);
            }
            // a magnitude supplied with the object stays in place
            None => object.magnitude_trend = None,
        }
        object.position = Some(at.topocentric);
        object.motion_arcmin_per_hour = Some(refined.motion);
        object.heliocentric_distance = Some(at.heliocentric_distance);
        object.geocentric_distance = Some(at.geocentric_distance);
        object.phase_angle = Some(at.phase_angle);
        object.visibility = Some(visibility);
    } else if let Some(observed) = object.observed_position {
        // no distance, so no parallax
        let position = observed.to_topocentric(site.lmst(&window.midnight), site.geo_sin, site.geo_cos, 0.0);
        let first = transit_of(&position, &window.midnight, window, site);
        let meridian = transit_of(&position, &first, window, site);
        let visibility = visibility_at(&position, meridian, &position, site, config)?;

        object.clear_computed();
        object.position = Some(position);
        object.visibility = Some(visibility);
    } else {
        log::debug!("{}: no elements or observed position", object.name);
        object.clear_computed();
        object.status = ObjectStatus::NoPosition;
        return Ok(());
    }

    if let Some(Visibility {
        rise_set: RiseSet::NeverRises,
        ..
    }) = &object.visibility
    {
        log::debug!(
            "{} never reaches {}° from {}",
            object.name,
            config.min_altitude_deg,
            site.code
        );
    }
    object.status = ObjectStatus::Updated;
    Ok(())
}

/// Whether the object is bright enough for the configured limit
///
/// Objects without a computed magnitude pass.
pub fn within_magnitude_limit(object: &TrackedObject, config: &VisibilityConfig) -> bool {
    object
        .magnitude
        .map_or(true, |m| m <= config.limiting_magnitude)
}
