//! PPM Pro Timesheet Utility Library
//!
//! This library provides functionality for locating the current week's PPM Pro
//! timesheet, printing it as a text report, filling in today's hours and
//! submitting or approving timesheets.

pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod service;

pub use config::Config;
pub use error::Error;
pub use service::{Operations, TimesheetService};

// Re-export key types for convenience
pub use helpers::hours::{EvenSplit, HoursSource, OverrideHours};
pub use helpers::ppmpro::{PpmProClient, TimesheetApi};
pub use models::ppmpro::{Activity, ActivityUpdate, Entry, Timesheet, TimesheetId, TimesheetSummary};
