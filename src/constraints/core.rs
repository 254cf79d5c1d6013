/// Constraint system for filtering the observing list
///
/// Each constraint is described by a serializable configuration that builds
/// an evaluator. Evaluators look at an object after its visibility update
/// and report whether it is worth planning tonight, for example:
/// - Altitude at meridian transit
/// - Moon proximity and illumination
/// - Limiting magnitude
/// - Galactic latitude
/// - Orbit uncertainty
/// - Hours above the altitude limit inside the night
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::observatory::Observatory;
use crate::tracked::TrackedObject;
use crate::utils::time_utils::Moment;
use crate::visibility::ObservationWindow;

use super::alt_az::AltitudeConfig;
use super::daytime::NightOverlapConfig;
use super::galactic::GalacticLatitudeConfig;
use super::magnitude::MagnitudeConfig;
use super::moon_phase::MoonConfig;
use super::uncertainty::UncertaintyConfig;

/// Why an object fails a constraint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Start of the affected interval, when the violation is time-bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Moment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Moment>,
    /// 0.0 = just violated, 1.0+ = severe
    pub max_severity: f64,
    /// Human-readable description of the violation
    pub description: String,
}

impl ConstraintViolation {
    pub fn new(max_severity: f64, description: impl Into<String>) -> Self {
        ConstraintViolation {
            start: None,
            end: None,
            max_severity,
            description: description.into(),
        }
    }

    pub fn during(mut self, start: Moment, end: Moment) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Result of evaluating one constraint against one object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub violations: Vec<ConstraintViolation>,
    pub all_satisfied: bool,
    /// Constraint name/description
    pub constraint_name: String,
    pub object_name: String,
}

impl ConstraintResult {
    pub fn new(
        violations: Vec<ConstraintViolation>,
        constraint_name: String,
        object_name: &str,
    ) -> Self {
        ConstraintResult {
            all_satisfied: violations.is_empty(),
            violations,
            constraint_name,
            object_name: object_name.to_string(),
        }
    }

    /// Worst severity among the violations, 0.0 when satisfied
    pub fn max_severity(&self) -> f64 {
        self.violations
            .iter()
            .map(|v| v.max_severity)
            .fold(0.0, f64::max)
    }

    /// Total hours covered by time-bound violations
    pub fn total_violation_hours(&self) -> f64 {
        self.violations
            .iter()
            .filter_map(|v| match (&v.start, &v.end) {
                (Some(start), Some(end)) => Some(end.days_since(start) * 24.0),
                _ => None,
            })
            .sum()
    }
}

impl fmt::Display for ConstraintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} violations)",
            self.object_name,
            self.constraint_name,
            self.violations.len()
        )
    }
}

/// Night and site an evaluation refers to
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub window: &'a ObservationWindow,
    pub site: &'a Observatory,
}

/// Configuration for constraint evaluation
///
/// This is the base trait that all constraint configurations must implement.
pub trait ConstraintConfig: fmt::Debug + Send + Sync {
    /// Create a constraint evaluator from this configuration
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator>;

    /// Get a human-readable name for this constraint
    fn name(&self) -> String {
        self.to_evaluator().name()
    }

    /// Serialize to JSON
    fn to_json(&self) -> String;
}

/// Trait for evaluating constraints
pub trait ConstraintEvaluator: Send + Sync {
    /// Evaluate the constraint for one updated object
    fn evaluate(&self, object: &TrackedObject, context: &ConstraintContext) -> ConstraintResult;

    /// Evaluate for a whole list, in list order
    fn evaluate_batch(
        &self,
        objects: &[TrackedObject],
        context: &ConstraintContext,
    ) -> Vec<ConstraintResult> {
        objects.iter().map(|o| self.evaluate(o, context)).collect()
    }

    /// Get constraint name
    fn name(&self) -> String;
}

/// Any supported constraint, tagged by `type` in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintSpec {
    Altitude(AltitudeConfig),
    Moon(MoonConfig),
    Magnitude(MagnitudeConfig),
    GalacticLatitude(GalacticLatitudeConfig),
    Uncertainty(UncertaintyConfig),
    NightOverlap(NightOverlapConfig),
    All(AllConfig),
}

impl ConstraintSpec {
    fn config(&self) -> &dyn ConstraintConfig {
        match self {
            ConstraintSpec::Altitude(c) => c,
            ConstraintSpec::Moon(c) => c,
            ConstraintSpec::Magnitude(c) => c,
            ConstraintSpec::GalacticLatitude(c) => c,
            ConstraintSpec::Uncertainty(c) => c,
            ConstraintSpec::NightOverlap(c) => c,
            ConstraintSpec::All(c) => c,
        }
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ConstraintConfig for ConstraintSpec {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        self.config().to_evaluator()
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Logical AND combinator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllConfig {
    pub constraints: Vec<ConstraintSpec>,
}

impl AllConfig {
    pub fn with(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }
}

impl ConstraintConfig for AllConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(AllEvaluator {
            evaluators: self.constraints.iter().map(|c| c.to_evaluator()).collect(),
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Evaluator for logical AND: satisfied only when every member is
struct AllEvaluator {
    evaluators: Vec<Box<dyn ConstraintEvaluator>>,
}

impl ConstraintEvaluator for AllEvaluator {
    fn evaluate(&self, object: &TrackedObject, context: &ConstraintContext) -> ConstraintResult {
        let violations = self
            .evaluators
            .iter()
            .flat_map(|e| e.evaluate(object, context).violations)
            .collect();
        ConstraintResult::new(violations, self.name(), &object.name)
    }

    fn evaluate_batch(
        &self,
        objects: &[TrackedObject],
        context: &ConstraintContext,
    ) -> Vec<ConstraintResult> {
        let mut merged: Vec<Vec<ConstraintViolation>> = vec![Vec::new(); objects.len()];
        for evaluator in &self.evaluators {
            for (acc, result) in merged
                .iter_mut()
                .zip(evaluator.evaluate_batch(objects, context))
            {
                acc.extend(result.violations);
            }
        }
        let name = self.name();
        objects
            .iter()
            .zip(merged)
            .map(|(object, violations)| ConstraintResult::new(violations, name.clone(), &object.name))
            .collect()
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.evaluators.iter().map(|e| e.name()).collect();
        format!("All({})", names.join(", "))
    }
}

/// Severity of falling `short` of `limit`, relative to the limit
pub(crate) fn relative_severity(short: f64, limit: f64) -> f64 {
    short.abs() / limit.abs().max(1.0)
}
