//! Constraint evaluation modules
//!
//! This module provides the filters applied to the observing list after a
//! visibility update: altitude, Moon, magnitude, galactic latitude, orbit
//! uncertainty and night overlap, plus an AND combinator.

pub mod alt_az;
pub mod core;
pub mod daytime;
pub mod galactic;
pub mod magnitude;
pub mod moon_phase;
pub mod uncertainty;

// Re-export main types
pub use self::core::{
    AllConfig, ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult,
    ConstraintSpec, ConstraintViolation,
};
pub use alt_az::AltitudeConfig;
pub use daytime::{night_overlap, NightOverlapConfig};
pub use galactic::GalacticLatitudeConfig;
pub use magnitude::MagnitudeConfig;
pub use moon_phase::MoonConfig;
pub use uncertainty::UncertaintyConfig;


#[cfg(test)]
mod tests {
    use super::test_support::{context, object_with_visibility};
    use super::*;

    fn filters() -> ConstraintSpec {
        ConstraintSpec::All(
            AllConfig::default()
                .with(ConstraintSpec::Altitude(AltitudeConfig {
                    min_altitude: 35.0,
                    max_altitude: None,
                }))
                .with(ConstraintSpec::Moon(MoonConfig {
                    min_distance: 20.0,
                    max_illumination: None,
                }))
                .with(ConstraintSpec::Uncertainty(UncertaintyConfig { max_uncertainty: 6 })),
        )
    }

    #[test]
    fn test_all_collects_every_violation() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = filters().to_evaluator();

        assert!(eval.evaluate(&object_with_visibility("ok", 60.0, 45.0), &ctx).all_satisfied);

        let mut bad = object_with_visibility("bad", 20.0, 5.0);
        bad.uncertainty = Some(9);
        let result = eval.evaluate(&bad, &ctx);
        assert_eq!(result.violations.len(), 3);
        assert!(result.constraint_name.starts_with("All(AltitudeConstraint"));
        assert_eq!(result.object_name, "bad");
    }

    #[test]
    fn test_batch_matches_single() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = filters().to_evaluator();
        let objects = vec![
            object_with_visibility("a", 60.0, 45.0),
            object_with_visibility("b", 30.0, 45.0),
        ];
        let batch = eval.evaluate_batch(&objects, &ctx);
        for (object, result) in objects.iter().zip(&batch) {
            assert_eq!(&eval.evaluate(object, &ctx), result);
        }
    }

    #[test]
    fn test_spec_json() {
        let json = r#"{"type":"all","constraints":[
            {"type":"altitude","min_altitude":30.0},
            {"type":"galactic_latitude","min_latitude":10.0},
            {"type":"night_overlap","min_hours":1.5}
        ]}"#;
        let spec = ConstraintSpec::from_json(json).unwrap();
        match &spec {
            ConstraintSpec::All(all) => assert_eq!(all.constraints.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        let again = ConstraintSpec::from_json(&spec.to_json()).unwrap();
        assert_eq!(again.name(), spec.name());
    }
}
