//! Sources for the hours worked today, one value per activity.
//!
//! The default [`EvenSplit`] simply divides a daily target evenly between all
//! activities, which is rarely what was actually worked. Anything that knows
//! better (a time tracker export, a manual list) can implement
//! [`HoursSource`] and be handed to the upload builder instead.

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    models::ppmpro::Timesheet,
};

pub const DEFAULT_TARGET_HOURS: f64 = 8.0;

pub trait HoursSource {
    /// Must return exactly one value per activity, in activity order.
    fn hours(&self, timesheet: &Timesheet) -> Vec<f64>;
}

/// Splits `target` evenly, each share rounded to one decimal place. The shares
/// need not add back up to the target (8 / 3 gives 2.7 three times).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvenSplit {
    pub target: f64,
}

impl Default for EvenSplit {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_HOURS,
        }
    }
}

impl HoursSource for EvenSplit {
    fn hours(&self, timesheet: &Timesheet) -> Vec<f64> {
        let activities = timesheet.activities.len();
        if activities == 0 {
            return Vec::new();
        }
        let share = round_tenth(self.target / activities as f64);
        debug!("Splitting {} hours into {} shares of {}", self.target, activities, share);
        vec![share; activities]
    }
}

/// An explicit list of hours. The list is only used when it has one value per
/// activity; any other length silently defers to `fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideHours<S> {
    pub hours: Vec<f64>,
    pub fallback: S,
}

impl<S> OverrideHours<S> {
    pub fn new(hours: Vec<f64>, fallback: S) -> Self {
        Self { hours, fallback }
    }
}

impl<S: HoursSource> HoursSource for OverrideHours<S> {
    fn hours(&self, timesheet: &Timesheet) -> Vec<f64> {
        if self.hours.len() == timesheet.activities.len() {
            return self.hours.clone();
        }
        warn!(
            "Ignoring {} override hours for {} activities",
            self.hours.len(),
            timesheet.activities.len()
        );
        self.fallback.hours(timesheet)
    }
}

impl<S: HoursSource + ?Sized> HoursSource for &S {
    fn hours(&self, timesheet: &Timesheet) -> Vec<f64> {
        (**self).hours(timesheet)
    }
}

/// Hours for `timesheet`, preferring `overrides` over the even split.
pub fn allocate(timesheet: &Timesheet, overrides: Option<&[f64]>) -> Vec<f64> {
    match overrides {
        Some(hours) => OverrideHours::new(hours.to_vec(), EvenSplit::default()).hours(timesheet),
        None => EvenSplit::default().hours(timesheet),
    }
}

/// Parses a comma separated list such as `3,5` or `2.5, 5.5`. Every item
/// must be a finite, non-negative number.
pub fn parse_hours_list(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(|item| {
            let item = item.trim();
            match item.parse::<f64>() {
                Ok(hours) if hours.is_finite() && hours >= 0.0 => Ok(hours),
                _ => Err(Error::InvalidHours(item.to_string())),
            }
        })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
