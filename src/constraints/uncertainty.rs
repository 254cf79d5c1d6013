/// Orbit uncertainty constraint implementation
use super::core::{
    ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult, ConstraintViolation,
};
use crate::tracked::TrackedObject;
use serde::{Deserialize, Serialize};

/// Configuration for the orbit uncertainty constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertaintyConfig {
    /// Largest acceptable MPC uncertainty parameter U (0-9)
    pub max_uncertainty: u8,
}

impl ConstraintConfig for UncertaintyConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(UncertaintyEvaluator {
            max_uncertainty: self.max_uncertainty,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

struct UncertaintyEvaluator {
    max_uncertainty: u8,
}

impl ConstraintEvaluator for UncertaintyEvaluator {
    /// Objects without a U value pass; poorly observed objects are the ones
    /// that most need follow-up.
    fn evaluate(&self, object: &TrackedObject, _context: &ConstraintContext) -> ConstraintResult {
        let mut violations = Vec::new();
        if let Some(u) = object.uncertainty.filter(|&u| u > self.max_uncertainty) {
            violations.push(ConstraintViolation::new(
                f64::from(u - self.max_uncertainty) / 9.0,
                format!("Uncertainty U={u} above {}", self.max_uncertainty),
            ));
        }
        ConstraintResult::new(violations, self.name(), &object.name)
    }

    fn name(&self) -> String {
        format!("UncertaintyConstraint(U≤{})", self.max_uncertainty)
    }
}
