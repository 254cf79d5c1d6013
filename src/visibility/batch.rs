//! Parallel update of a whole observing list

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::observatory::Observatory;
use crate::tracked::{ObjectStatus, TrackedObject};
use crate::utils::time_utils::Moment;
use crate::visibility::update::{update_object, VisibilityConfig};
use crate::visibility::window::ObservationWindow;

/// Summary of one batch update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub window: ObservationWindow,
    pub updated: usize,
    /// Objects with neither elements nor an observed position
    pub without_position: usize,
    /// (name, error) for every object whose computation failed
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Update every object in `objects` for the night containing or following `now`
///
/// Objects are independent and run in parallel. A failure is recorded in
/// that object's status and in the report; it never stops the batch.
///
/// # Errors
/// Only when no observing window exists for `now` at `site`.
pub fn update_all(
    objects: &mut [TrackedObject],
    now: &Moment,
    site: &Observatory,
    config: &VisibilityConfig,
) -> Result<BatchReport> {
    let window = ObservationWindow::compute(now, site, config.twilight)?;
    Ok(update_all_in_window(objects, &window, site, config))
}

/// Update every object against an already computed window
pub fn update_all_in_window(
    objects: &mut [TrackedObject],
    window: &ObservationWindow,
    site: &Observatory,
    config: &VisibilityConfig,
) -> BatchReport {
    objects.par_iter_mut().for_each(|object| {
        if let Err(e) = update_object(object, window, site, config) {
            log::warn!("{}: visibility update failed: {e}", object.name);
            object.status = ObjectStatus::Failed(e.to_string());
        }
    });

    let mut report = BatchReport {
        window: window.clone(),
        updated: 0,
        without_position: 0,
        failed: Vec::new(),
    };
    for object in objects.iter() {
        match &object.status {
            ObjectStatus::Updated => report.updated += 1,
            ObjectStatus::NoPosition => report.without_position += 1,
            ObjectStatus::Failed(reason) => report.failed.push((object.name.clone(), reason.clone())),
            ObjectStatus::Pending => {}
        }
    }
    log::info!(
        "Updated {} of {} objects for {} (night {} to {})",
        report.updated,
        objects.len(),
        site.code,
        window.sunset,
        window.sunrise
    );
    report
}
