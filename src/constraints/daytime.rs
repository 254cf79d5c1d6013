/// Night overlap constraint implementation
///
/// An object is only useful while it is above the altitude limit and the
/// Sun is below the twilight altitude. This constraint measures that overlap.
use super::core::{
    relative_severity, ConstraintConfig, ConstraintContext, ConstraintEvaluator, ConstraintResult,
    ConstraintViolation,
};
use crate::tracked::TrackedObject;
use crate::utils::time_utils::Moment;
use serde::{Deserialize, Serialize};

/// Configuration for the night overlap constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightOverlapConfig {
    /// Minimum hours above the altitude limit during the night
    pub min_hours: f64,
}

impl ConstraintConfig for NightOverlapConfig {
    fn to_evaluator(&self) -> Box<dyn ConstraintEvaluator> {
        Box::new(NightOverlapEvaluator {
            min_hours: self.min_hours,
        })
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

struct NightOverlapEvaluator {
    min_hours: f64,
}

/// Hours shared by `[rise, set]` and `[sunset, sunrise]`, and the shared interval
pub fn night_overlap(
    rise: &Moment,
    set: &Moment,
    sunset: &Moment,
    sunrise: &Moment,
) -> Option<(Moment, Moment)> {
    let start = rise.julian().max(sunset.julian());
    let end = set.julian().min(sunrise.julian());
    (end > start).then(|| (Moment::from_julian(start), Moment::from_julian(end)))
}

impl ConstraintEvaluator for NightOverlapEvaluator {
    fn evaluate(&self, object: &TrackedObject, context: &ConstraintContext) -> ConstraintResult {
        let window = context.window;
        let overlap = object.visibility.as_ref().and_then(|vis| match (&vis.rise, &vis.set) {
            (Some(rise), Some(set)) => night_overlap(rise, set, &window.sunset, &window.sunrise),
            _ => None,
        });
        let hours = overlap
            .as_ref()
            .map_or(0.0, |(start, end)| end.days_since(start) * 24.0);

        let mut violations = Vec::new();
        if hours < self.min_hours {
            let violation = ConstraintViolation::new(
                relative_severity(self.min_hours - hours, self.min_hours),
                format!(
                    "Up for {:.1} h of the night (min required: {:.1} h)",
                    hours, self.min_hours
                ),
            );
            violations.push(violation.during(window.sunset.clone(), window.sunrise.clone()));
        }
        ConstraintResult::new(violations, self.name(), &object.name)
    }

    fn name(&self) -> String {
        format!("NightOverlapConstraint(min={:.1}h)", self.min_hours)
    }
}
