use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to make request. Code {status} returned: {reason}.")]
    Http { status: u16, reason: String },
    #[error("Failed to send request to PPM Pro API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse PPM Pro response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Could not get id of current timesheet (no timesheet starts on {week_start}).")]
    TimesheetNotFound { week_start: String },
    #[error("Could not read session cookie from {path:?}: {source}")]
    Credential {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Session cookie file {path:?} is empty")]
    EmptyCredential { path: PathBuf },
    #[error("Invalid client configuration: {0}")]
    Config(String),
    #[error("Failed to write report: {0}")]
    Report(String),
    #[error("Invalid hours {0:?}: expected a finite, non-negative number")]
    InvalidHours(String),
    #[error("Hours source returned {actual} values for {expected} activities")]
    HoursMismatch { expected: usize, actual: usize },
}

impl Error {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Http { .. } | Error::Transport(_) | Error::Decode(_) | Error::Report(_) => 1,
            Error::TimesheetNotFound { .. } => 2,
            Error::Credential { .. } | Error::EmptyCredential { .. } | Error::Config(_) => 3,
            Error::HoursMismatch { .. } | Error::InvalidHours(_) => 4,
        }
    }
}
