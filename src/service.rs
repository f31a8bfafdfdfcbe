use std::io::Write;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::{
    error::{Error, Result},
    helpers::{
        hours::{EvenSplit, HoursSource, OverrideHours},
        ppmpro::{TimesheetApi, utils::find_current_timesheet},
        report::print_report,
        upload::build_upload,
    },
    models::ppmpro::{Note, TimesheetId},
};

/// Steps requested for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operations {
    pub report: bool,
    pub update: bool,
    pub submit: bool,
    pub approve: bool,
}

impl Operations {
    fn needs_timesheet(&self) -> bool {
        self.report || self.update
    }
}

/// Runs the timesheet workflow against a PPM Pro API: locate this week's
/// timesheet, then report, update, submit and approve as requested
pub struct TimesheetService<A, S = EvenSplit> {
    pub api: A,
    pub hours: S,
}

impl<A: TimesheetApi> TimesheetService<A> {
    pub fn new(api: A) -> Self {
        info!("Creating new TimesheetService instance");
        Self {
            api,
            hours: EvenSplit::default(),
        }
    }
}

impl<A: TimesheetApi, S: HoursSource> TimesheetService<A, S> {
    /// Replaces the source of today's hours used when no override is given.
    pub fn with_hours_source<T: HoursSource>(self, hours: T) -> TimesheetService<A, T> {
        TimesheetService {
            api: self.api,
            hours,
        }
    }

    /// Any failure stops the run; steps already sent are not undone.
    pub async fn run(
        &self,
        operations: Operations,
        date: NaiveDate,
        hours: Option<&[f64]>,
        out: &mut impl Write,
    ) -> Result<TimesheetId> {
        info!("Processing timesheet for {} ({:?})", date, operations);

        let summaries = self.api.recent().await?;
        let id = find_current_timesheet(&summaries, date)?;

        if operations.needs_timesheet() {
            let timesheet = self.api.timesheet(&id).await?;

            if operations.report {
                if let Err(e) = print_report(out, &timesheet) {
                    error!("Failed to write report: {}", e);
                    return Err(Error::Report(e.to_string()));
                }
            }

            if operations.update {
                let upload = match hours {
                    Some(hours) => {
                        let source = OverrideHours::new(hours.to_vec(), &self.hours);
                        build_upload(&timesheet, date, &source)?
                    }
                    None => build_upload(&timesheet, date, &self.hours)?,
                };
                self.api.update_activities(&id, &upload).await?;
                info!("Updated hours for timesheet {}", id);
            }
        }

        if operations.submit {
            self.api.submit(&id, &Note::default()).await?;
            info!("Submitted timesheet {} for approval", id);
        }

        if operations.approve {
            self.api.approve_all(&Note::default()).await?;
            info!("Approved all pending timesheets");
        }

        Ok(id)
    }
}
