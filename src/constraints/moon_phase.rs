/// Moon proximity and phase constraint implementation
use super::core::{
    relative_severity, ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult,
    ConstraintViolation,
};
use crate::ephemeris::moon::Moon;
use crate::tracked::TrackedObject;
use crate::utils::vector_math::{angular_separations_batch, spherical_to_unit_vectors_batch};
use serde::{Deserialize, Serialize};

/// Configuration for the Moon constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonConfig {
    /// Minimum allowed Moon distance in degrees
    pub min_distance: f64,
    /// Maximum allowed Moon illumination fraction (0.0 = new moon, 1.0 = full moon)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_illumination: Option<f64>,
}

impl ConstraintConfig for MoonConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(MoonEvaluator {
            min_distance: self.min_distance,
            max_illumination: self.max_illumination,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Evaluator for the Moon constraint
struct MoonEvaluator {
    min_distance: f64,
    max_illumination: Option<f64>,
}

impl MoonEvaluator {
    fn format_name(&self) -> String {
        match self.max_illumination {
            Some(max) => format!(
                "MoonConstraint(dist≥{:.1}°, illum≤{:.2})",
                self.min_distance, max
            ),
            None => format!("MoonConstraint(dist≥{:.1}°)", self.min_distance),
        }
    }

    /// Separation at transit, falling back to `fallback` for objects that were
    /// never given a visibility
    fn violations(
        &self,
        object: &TrackedObject,
        fallback: Option<f64>,
        illumination: f64,
    ) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();
        let separation = object
            .visibility
            .as_ref()
            .map(|v| v.moon_separation_deg)
            .or(fallback);
        match separation {
            Some(sep) if sep < self.min_distance => violations.push(ConstraintViolation::new(
                relative_severity(self.min_distance - sep, self.min_distance),
                format!(
                    "Target within {:.1}° of Moon (min allowed: {:.1}°)",
                    sep, self.min_distance
                ),
            )),
            Some(_) => {}
            None => violations.push(ConstraintViolation::new(
                1.0,
                "No position to compare with the Moon",
            )),
        }
        if let Some(max) = self.max_illumination.filter(|&max| illumination > max) {
            violations.push(ConstraintViolation::new(
                illumination - max,
                format!("Moon {:.0}% illuminated (max allowed: {:.0}%)", illumination * 100.0, max * 100.0),
            ));
        }
        violations
    }
}

impl ConstraintEvaluator for MoonEvaluator {
    fn evaluate(&self, object: &TrackedObject, context: &ConstraintContext) -> ConstraintResult {
        self.evaluate_batch(std::slice::from_ref(object), context)
            .pop()
            .unwrap_or_else(|| ConstraintResult::new(Vec::new(), self.format_name(), &object.name))
    }

    /// Objects lacking a transit separation are measured against the Moon
    /// at local midnight, all in one vectorised pass
    fn evaluate_batch(
        &self,
        objects: &[TrackedObject],
        context: &ConstraintContext,
    ) -> Vec<ConstraintResult> {
        let midnight = &context.window.midnight;
        let illumination = Moon.illuminated_fraction(midnight);

        let positions: Vec<(usize, f64, f64)> = objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.visibility.is_none())
            .filter_map(|(i, o)| o.position.map(|p| (i, p.lon, p.lat)))
            .collect();
        let mut fallback = vec![None; objects.len()];
        if !positions.is_empty() {
            match Moon.topocentric(midnight, context.site) {
                Ok(moon) => {
                    let lons: Vec<f64> = positions.iter().map(|p| p.1).collect();
                    let lats: Vec<f64> = positions.iter().map(|p| p.2).collect();
                    let vectors = spherical_to_unit_vectors_batch(&lons, &lats);
                    let separations = angular_separations_batch(&vectors, &moon.unit_vector());
                    for (&(i, _, _), sep) in positions.iter().zip(separations.iter()) {
                        fallback[i] = Some(sep.to_degrees());
                    }
                }
                Err(e) => log::warn!("Moon position unavailable at {midnight}: {e}"),
            }
        }

        let name = self.format_name();
        objects
            .iter()
            .zip(fallback)
            .map(|(object, sep)| {
                ConstraintResult::new(self.violations(object, sep, illumination), name.clone(), &object.name)
            })
            .collect()
    }

    fn name(&self) -> String {
        self.format_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{context, object_with_visibility};
    use crate::coordinates::SkyPosition;

    #[test]
    fn test_moon_distance() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = MoonConfig {
            min_distance: 30.0,
            max_illumination: None,
        }
        .to_evaluator();

        assert!(eval.evaluate(&object_with_visibility("far", 60.0, 50.0), &ctx).all_satisfied);
        let near = eval.evaluate(&object_with_visibility("near", 60.0, 10.0), &ctx);
        assert!(!near.all_satisfied);
        assert!(near.violations[0].description.contains("10.0°"));
    }

    #[test]
    fn test_full_moon_illumination() {
        // window night of 2024 Oct 17, one day after full Moon
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = MoonConfig {
            min_distance: 0.0,
            max_illumination: Some(0.5),
        }
        .to_evaluator();
        let result = eval.evaluate(&object_with_visibility("x", 60.0, 90.0), &ctx);
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].description.contains("illuminated"));
    }

    #[test]
    fn test_batch_fallback_uses_midnight_moon() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let moon = Moon.topocentric(&window.midnight, site).unwrap();

        let mut beside = TrackedObject::new("beside");
        beside.position = Some(moon.offset(5f64.to_radians(), 0.0));
        let mut opposite = TrackedObject::new("opposite");
        opposite.position = Some(SkyPosition::new(moon.lon + std::f64::consts::PI, -moon.lat));
        let nothing = TrackedObject::new("nothing");

        let eval = MoonConfig {
            min_distance: 20.0,
            max_illumination: None,
        }
        .to_evaluator();
        let results = eval.evaluate_batch(&[beside, opposite, nothing], &ctx);
        assert_eq!(results.len(), 3);
        assert!(!results[0].all_satisfied);
        assert!(results[1].all_satisfied);
        assert!(!results[2].all_satisfied);
    }
}
