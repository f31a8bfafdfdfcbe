use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::ppmpro::{Activity, Timesheet};

/// Prints the week as a table of hours per activity and day, followed by the
/// daily totals. Date columns are headed `MM-DD`.
pub fn print_report(writer: &mut impl Write, timesheet: &Timesheet) -> Result<()> {
    let dates = report_dates(timesheet);
    let totals = column_totals(timesheet, &dates);

    write!(writer, "{:<25}DATES:\t", format!("[{}]", timesheet.state_name()))?;
    for date in &dates {
        write!(writer, "{:<5.5} ", column_label(date))?;
    }
    writeln!(writer)?;

    for activity in &timesheet.activities {
        write!(
            writer,
            "{:<32}",
            activity.project_name.as_deref().unwrap_or_default()
        )?;
        for date in &dates {
            match hours_on(activity, date) {
                Some(hours) => write!(writer, "{:<4.1}  ", hours)?,
                None => write!(writer, "{:6}", "")?,
            }
        }
        writeln!(writer)?;
    }

    write!(writer, "\t\t\tTOTALS:\t")?;
    for total in totals {
        write!(writer, "{:<4.1}  ", total)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// `2024-12-30` (or `2024-12-30T00:00:00`) becomes `12-30`.
fn column_label(date: &str) -> String {
    date.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .map(|day| day.format("%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

/// Report columns: every entry date in order of first appearance.
pub fn report_dates(timesheet: &Timesheet) -> Vec<String> {
    let mut dates: Vec<String> = Vec::new();
    for entry in timesheet.activities.iter().flat_map(|a| &a.entries) {
        if !dates.contains(&entry.entry_date) {
            dates.push(entry.entry_date.clone());
        }
    }
    dates
}

/// Hours an activity logged on `date`, summed if the date appears more than
/// once; `None` when there is no entry for it.
pub fn hours_on(activity: &Activity, date: &str) -> Option<f64> {
    activity
        .entries
        .iter()
        .filter(|e| e.entry_date == date)
        .map(|e| e.hours())
        .reduce(|a, b| a + b)
}

/// Sum of each date's hours across all activities.
pub fn column_totals(timesheet: &Timesheet, dates: &[String]) -> Vec<f64> {
    dates
        .iter()
        .map(|date| {
            timesheet
                .activities
                .iter()
                .filter_map(|a| hours_on(a, date))
                .sum()
        })
        .collect()
}
