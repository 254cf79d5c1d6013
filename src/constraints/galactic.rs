/// Galactic latitude constraint implementation
///
/// Crowded Milky Way fields make faint moving objects hard to pick out, so
/// targets close to the galactic plane can be skipped.
use super::core::{
    relative_severity, ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult,
    ConstraintViolation,
};
use crate::tracked::TrackedObject;
use serde::{Deserialize, Serialize};

/// Configuration for the galactic latitude constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalacticLatitudeConfig {
    /// Minimum absolute galactic latitude in degrees
    pub min_latitude: f64,
}

impl ConstraintConfig for GalacticLatitudeConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(GalacticLatitudeEvaluator {
            min_latitude: self.min_latitude,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

struct GalacticLatitudeEvaluator {
    min_latitude: f64,
}

impl ConstraintEvaluator for GalacticLatitudeEvaluator {
    fn evaluate(&self, object: &TrackedObject, _context: &ConstraintContext) -> ConstraintResult {
        let mut violations = Vec::new();
        let latitude = match (&object.position, &object.observed_position) {
            (Some(pos), _) => Some(pos.galactic_latitude()),
            (None, Some(pos)) => Some(pos.galactic_latitude()),
            (None, None) => None,
        };
        match latitude {
            Some(b) => {
                let b = b.to_degrees();
                if b.abs() < self.min_latitude {
                    violations.push(ConstraintViolation::new(
                        relative_severity(self.min_latitude - b.abs(), self.min_latitude),
                        format!(
                            "Galactic latitude {:+.1}° inside ±{:.1}°",
                            b, self.min_latitude
                        ),
                    ));
                }
            }
            None if self.min_latitude > 0.0 => {
                violations.push(ConstraintViolation::new(1.0, "No position available"))
            }
            None => {}
        }
        ConstraintResult::new(violations, self.name(), &object.name)
    }

    fn name(&self) -> String {
        format!("GalacticLatitudeConstraint(|b|≥{:.1}°)", self.min_latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::context;
    use crate::coordinates::{Equatorial, SkyPosition};

    #[test]
    fn test_galactic_plane_rejected() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = GalacticLatitudeConfig { min_latitude: 15.0 }.to_evaluator();

        // galactic centre direction, b ≈ 0
        let centre = TrackedObject::with_observed_position(
            "centre",
            SkyPosition::<Equatorial>::from_degrees(266.405, -28.936),
        );
        assert!(!eval.evaluate(&centre, &ctx).all_satisfied);

        // north galactic pole
        let pole = TrackedObject::with_observed_position(
            "pole",
            SkyPosition::<Equatorial>::from_degrees(192.859, 27.128),
        );
        assert!(eval.evaluate(&pole, &ctx).all_satisfied);

        let open = GalacticLatitudeConfig { min_latitude: 0.0 }.to_evaluator();
        assert!(open.evaluate(&TrackedObject::new("x"), &ctx).all_satisfied);
    }
}
