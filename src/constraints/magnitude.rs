/// Limiting magnitude constraint implementation
use super::core::{
    ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult, ConstraintViolation,
};
use crate::tracked::TrackedObject;
use serde::{Deserialize, Serialize};

/// Configuration for the limiting magnitude constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnitudeConfig {
    /// Faintest apparent magnitude allowed
    pub limiting_magnitude: f64,
    /// Reject objects whose magnitude could not be computed
    #[serde(default)]
    pub require_magnitude: bool,
}

impl ConstraintConfig for MagnitudeConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(MagnitudeEvaluator {
            limit: self.limiting_magnitude,
            require_magnitude: self.require_magnitude,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

struct MagnitudeEvaluator {
    limit: f64,
    require_magnitude: bool,
}

impl ConstraintEvaluator for MagnitudeEvaluator {
    fn evaluate(&self, object: &TrackedObject, _context: &ConstraintContext) -> ConstraintResult {
        let mut violations = Vec::new();
        match object.magnitude {
            // a magnitude fainter than the limit is numerically larger
            Some(mag) if mag > self.limit => violations.push(ConstraintViolation::new(
                mag - self.limit,
                format!("V={mag:.1} fainter than limit {:.1}", self.limit),
            )),
            None if self.require_magnitude => {
                violations.push(ConstraintViolation::new(1.0, "No magnitude available"))
            }
            _ => {}
        }
        ConstraintResult::new(violations, self.name(), &object.name)
    }

    fn name(&self) -> String {
        format!("MagnitudeConstraint(V≤{:.1})", self.limit)
    }
}
