/// Altitude constraint implementation
use super::core::{
    relative_severity, ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult,
    ConstraintViolation,
};
use crate::coordinates::RiseSet;
use crate::tracked::TrackedObject;
use serde::{Deserialize, Serialize};

/// Configuration for the altitude constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltitudeConfig {
    /// Minimum altitude at meridian transit in degrees (0 = horizon, 90 = zenith)
    pub min_altitude: f64,
    /// Maximum altitude at transit in degrees (optional, for mounts that cannot reach the zenith)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_altitude: Option<f64>,
}

impl ConstraintConfig for AltitudeConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(AltitudeEvaluator {
            min_altitude: self.min_altitude,
            max_altitude: self.max_altitude,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Evaluator for the altitude constraint
struct AltitudeEvaluator {
    min_altitude: f64,
    max_altitude: Option<f64>,
}

impl AltitudeEvaluator {
    fn format_name(&self) -> String {
        match self.max_altitude {
            Some(max_alt) => format!(
                "AltitudeConstraint(min_alt={:.1}°, max_alt={:.1}°)",
                self.min_altitude, max_alt
            ),
            None => format!("AltitudeConstraint(min_alt={:.1}°)", self.min_altitude),
        }
    }
}

impl ConstraintEvaluator for AltitudeEvaluator {
    fn evaluate(&self, object: &TrackedObject, _context: &ConstraintContext) -> ConstraintResult {
        let mut violations = Vec::new();
        match &object.visibility {
            None => violations.push(ConstraintViolation::new(
                1.0,
                "No visibility computed for tonight",
            )),
            Some(vis) => {
                let alt = vis.best_altitude_deg;
                if alt < self.min_altitude || vis.rise_set == RiseSet::NeverRises {
                    violations.push(ConstraintViolation::new(
                        relative_severity(self.min_altitude - alt, self.min_altitude),
                        format!(
                            "Transit altitude {:.1}° below minimum {:.1}°",
                            alt, self.min_altitude
                        ),
                    ));
                }
                if let Some(max_alt) = self.max_altitude.filter(|&max| alt > max) {
                    violations.push(ConstraintViolation::new(
                        relative_severity(alt - max_alt, max_alt),
                        format!("Transit altitude {alt:.1}° above maximum {max_alt:.1}°"),
                    ));
                }
            }
        }
        ConstraintResult::new(violations, self.format_name(), &object.name)
    }

    fn name(&self) -> String {
        self.format_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{context, object_with_visibility};

    #[test]
    fn test_altitude_limits() {
        let (window, site) = context();
        let ctx = ConstraintContext { window: &window, site };
        let eval = AltitudeConfig {
            min_altitude: 35.0,
            max_altitude: Some(85.0),
        }
        .to_evaluator();

        let high = object_with_visibility("a", 60.0, 20.0);
        assert!(eval.evaluate(&high, &ctx).all_satisfied);

        let low = object_with_visibility("b", 30.0, 20.0);
        let result = eval.evaluate(&low, &ctx);
        assert!(!result.all_satisfied);
        assert!((result.max_severity() - 5.0 / 35.0).abs() < 1e-12);

        let zenith = object_with_visibility("c", 88.0, 20.0);
        assert_eq!(eval.evaluate(&zenith, &ctx).violations.len(), 1);

        let unknown = TrackedObject::new("d");
        assert!(!eval.evaluate(&unknown, &ctx).all_satisfied);
    }

    #[test]
    fn test_name() {
        let cfg = AltitudeConfig {
            min_altitude: 35.0,
            max_altitude: None,
        };
        assert_eq!(cfg.name(), "AltitudeConstraint(min_alt=35.0°)");
    }
}
