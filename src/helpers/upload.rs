use chrono::NaiveDate;
use serde_json::Map;
use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    helpers::hours::HoursSource,
    models::ppmpro::{ActivityUpdate, Timesheet},
};

/// Builds the activity records for PUT /timesheet/{id}/activities.
///
/// Activities and entries keep their original order. Only the entry dated
/// `date` is changed: its hours become the `source` value at the activity's
/// position.
pub fn build_upload(
    timesheet: &Timesheet,
    date: NaiveDate,
    source: &impl HoursSource,
) -> Result<Vec<ActivityUpdate>> {
    let hours = source.hours(timesheet);
    if hours.len() != timesheet.activities.len() {
        error!(
            "Hours source returned {} values for {} activities",
            hours.len(),
            timesheet.activities.len()
        );
        return Err(Error::HoursMismatch {
            expected: timesheet.activities.len(),
            actual: hours.len(),
        });
    }

    if let Some(bad) = hours.iter().find(|h| !h.is_finite() || **h < 0.0) {
        error!("Hours source returned unusable value {}", bad);
        return Err(Error::InvalidHours(bad.to_string()));
    }

    let today = date.format("%Y-%m-%d").to_string();
    info!("Setting hours for {} on {} activities", today, hours.len());

    let upload = timesheet
        .activities
        .iter()
        .zip(hours)
        .map(|(activity, hours)| {
            let entries = activity
                .entries
                .iter()
                .map(|entry| {
                    let mut entry = entry.clone();
                    if entry.entry_date == today {
                        debug!(
                            "Activity {}: {} -> {} hours",
                            activity.id,
                            entry.hours(),
                            hours
                        );
                        entry.set_hours(hours);
                    }
                    entry
                })
                .collect();

            ActivityUpdate {
                entries,
                id: activity.id.clone(),
                project_id: activity.project_id.clone(),
                task_id: activity.task_id.clone(),
                role: activity.role.clone(),
                task_schedule_id: 0,
                remaining_hours: 0,
                dynamic_fields: Map::new(),
                activity_type: activity.activity_type.clone(),
                is_pinned: activity.is_pinned,
                is_billable: activity.is_billable,
                is_capitalized: activity.is_capitalized,
                is_editable: activity.is_editable,
                state: activity.state.clone(),
            }
        })
        .collect();

    Ok(upload)
}
