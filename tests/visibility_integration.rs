/// End-to-end checks of the nightly visibility computation
use approx::assert_abs_diff_eq;
use candidate_ephem::ephemeris::position_at;
use candidate_ephem::{
    update_all, BodyEphemeris, Moment, Moon, ObjectStatus, ObservationWindow, Observatory,
    OrbitalElements, RiseSet, SkyPosition, Sun, TrackedObject, TwilightType, VisibilityConfig,
};
use std::f64::consts::PI;

const NOW: f64 = 2460600.8;
const MINUTE: f64 = 1.0 / 1440.0;

fn teide() -> &'static Observatory {
    Observatory::by_code("G40").unwrap()
}

fn main_belt() -> OrbitalElements {
    OrbitalElements::from_degrees(
        Moment::from_julian(2460600.5),
        60.0,
        10.6,
        80.3,
        73.4,
        2.77,
        0.079,
        0.2141,
    )
}

fn near_earth() -> OrbitalElements {
    OrbitalElements::from_degrees(Moment::from_julian(2460600.5), 350.0, 5.0, 30.0, 120.0, 1.3, 0.35, 0.0)
}

fn late_transit() -> OrbitalElements {
    OrbitalElements::from_degrees(Moment::from_julian(2460590.5), 200.0, 22.0, 200.0, 10.0, 1.8, 0.2, 0.0)
}

/// Minute of smallest |hour angle| within four hours of `around`
fn brute_force_transit(elements: &OrbitalElements, around: f64, site: &Observatory) -> f64 {
    (-240..=240)
        .map(|i| around + f64::from(i) * MINUTE)
        .map(|jd| {
            let moment = Moment::from_julian(jd);
            let pos = position_at(elements, &moment, site).unwrap();
            let ha = (site.lmst(&moment) - pos.topocentric.ra() + PI).rem_euclid(2.0 * PI) - PI;
            (jd, ha.abs())
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(jd, _)| jd)
        .unwrap()
}

#[test]
fn test_sun_at_j2000() {
    let sun = Sun.position_at(&Moment::j2000()).unwrap();
    assert_abs_diff_eq!(sun.equatorial.lon_degrees(), 281.29, epsilon = 0.01);
    assert_abs_diff_eq!(sun.equatorial.lat_degrees(), -23.03, epsilon = 0.01);
}

#[test]
fn test_window_for_teide() {
    let window =
        ObservationWindow::compute(&Moment::from_julian(NOW), teide(), TwilightType::Astronomical).unwrap();
    assert_abs_diff_eq!(window.sunset.julian(), 2460601.3285, epsilon = 2e-4);
    assert_abs_diff_eq!(window.midnight.julian(), 2460601.5357, epsilon = 2e-4);
    assert_abs_diff_eq!(window.sunrise.julian(), 2460601.7428, epsilon = 2e-4);
    assert!(!window.in_progress());
}

#[test]
fn test_meridian_matches_brute_force() {
    let site = teide();
    let expected = [
        (main_belt(), 2460601.0744, -9.49),
        (near_earth(), 2460600.9496, 6.68),
        (late_transit(), 2460601.6446, 4.30),
    ];
    let mut objects: Vec<TrackedObject> = expected
        .iter()
        .enumerate()
        .map(|(i, (elements, _, _))| TrackedObject::with_elements(format!("obj{i}"), elements.clone()))
        .collect();
    let config = VisibilityConfig::from_site(site);
    let report = update_all(&mut objects, &Moment::from_julian(NOW), site, &config).unwrap();
    assert_eq!(report.updated, 3);
    assert!(report.all_succeeded());

    for (object, (elements, meridian, dec)) in objects.iter().zip(&expected) {
        let vis = object.visibility.as_ref().unwrap();
        let found = vis.meridian.julian();
        assert_abs_diff_eq!(found, *meridian, epsilon = 2e-3);
        assert_abs_diff_eq!(object.position.unwrap().lat_degrees(), *dec, epsilon = 0.1);

        let brute = brute_force_transit(elements, found, site);
        assert!(
            (brute - found).abs() <= 2.0 * MINUTE,
            "{}: brute force {brute} vs {found}",
            object.name
        );
    }
}

#[test]
fn test_rise_set_boundary() {
    let site = teide();
    let window =
        ObservationWindow::compute(&Moment::from_julian(NOW), site, TwilightType::Astronomical).unwrap();
    let latitude = site.latitude();
    let min_alt = 35.0;

    // declination whose transit altitude is exactly the limit
    let boundary = latitude.to_degrees() - (90.0 - min_alt);
    let just_above = SkyPosition::<candidate_ephem::Equatorial>::from_degrees(0.0, boundary + 0.5);
    let just_below = SkyPosition::<candidate_ephem::Equatorial>::from_degrees(0.0, boundary - 0.5);
    assert!(matches!(just_above.rise_set(latitude, min_alt), RiseSet::RisesAndSets { .. }));
    assert_eq!(just_below.rise_set(latitude, min_alt), RiseSet::NeverRises);

    let mut objects = vec![
        TrackedObject::with_observed_position("above", just_above),
        TrackedObject::with_observed_position("below", just_below),
    ];
    let config = VisibilityConfig {
        min_altitude_deg: min_alt,
        limiting_magnitude: 20.0,
        twilight: TwilightType::Astronomical,
    };
    candidate_ephem::visibility::update_all_in_window(&mut objects, &window, site, &config);

    let above = objects[0].visibility.as_ref().unwrap();
    assert!(above.rise.is_some() && above.set.is_some());
    assert!(above.hours_visible() < 2.0);

    let below = objects[1].visibility.as_ref().unwrap();
    assert_eq!(below.rise_set, RiseSet::NeverRises);
    assert!(below.rise.is_none() && below.set.is_none());
    assert_eq!(objects[1].status, ObjectStatus::Updated);
}

fn short_period_comet() -> OrbitalElements {
    OrbitalElements::cometary(Moment::from_julian(2460620.5), 1.6, 0.7, 15.0, 100.0, 40.0)
}

#[test]
fn test_comet_measured_against_moon_at_meridian() {
    let site = teide();
    let mut comet = TrackedObject::with_elements("P/2024 X1", short_period_comet());
    comet.is_comet = true;
    comet.absolute_magnitude = Some(10.0);
    let asteroid = TrackedObject::with_elements("2024 XA", short_period_comet());
    let parabolic = TrackedObject {
        is_comet: true,
        ..TrackedObject::with_elements(
            "C/2024 X2",
            OrbitalElements::cometary(Moment::from_julian(2460580.5), 0.39, 1.0001, 139.1, 21.6, 308.5),
        )
    };
    let mut objects = vec![comet, asteroid, parabolic];

    let config = VisibilityConfig::from_site(site);
    let report = update_all(&mut objects, &Moment::from_julian(NOW), site, &config).unwrap();
    assert_eq!(report.updated, 3, "{:?}", report.failed);
    let window = &report.window;

    let comet = &objects[0];
    let vis = comet.visibility.as_ref().unwrap();
    assert!(vis.meridian.julian() >= window.sunset.julian() - 0.5);
    assert!(vis.meridian.julian() < window.sunset.julian() + 0.5);
    // comets have no H-G magnitude
    assert!(comet.magnitude.is_none());

    let moon = Moon.topocentric(&vis.meridian, site).unwrap();
    let expected = comet.position.unwrap().separation(&moon).to_degrees();
    assert_abs_diff_eq!(vis.moon_separation_deg, expected, epsilon = 1e-9);

    // the same orbit flagged as an asteroid is measured from its midnight position
    let asteroid = &objects[1];
    let vis = asteroid.visibility.as_ref().unwrap();
    let moon = Moon.topocentric(&vis.meridian, site).unwrap();
    let at_midnight = position_at(&short_period_comet(), &window.midnight, site).unwrap();
    let expected = at_midnight.topocentric.separation(&moon).to_degrees();
    assert_abs_diff_eq!(vis.moon_separation_deg, expected, epsilon = 1e-9);

    assert_eq!(objects[2].status, ObjectStatus::Updated);
    assert!(objects[2].heliocentric_distance.unwrap() > 0.39);
}

#[test]
fn test_kepler_failure_is_isolated() {
    let site = teide();
    let mut runaway = main_belt();
    // mean anomaly overflows to infinity a few days after epoch
    runaway.mean_motion = f64::MAX;
    let mut objects = vec![
        TrackedObject::with_elements("good", main_belt()),
        TrackedObject::with_elements("runaway", runaway),
        TrackedObject::with_elements("also good", near_earth()),
    ];
    let config = VisibilityConfig::from_site(site);
    let report = update_all(&mut objects, &Moment::from_julian(NOW), site, &config).unwrap();

    assert_eq!(report.updated, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "runaway");
    match &objects[1].status {
        ObjectStatus::Failed(reason) => assert!(reason.contains("Kepler"), "{reason}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(objects[1].visibility.is_none());
    assert_eq!(objects[0].status, ObjectStatus::Updated);
    assert_eq!(objects[2].status, ObjectStatus::Updated);
}
