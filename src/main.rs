use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ppmpro_timesheet_util::{
    Config, Error, Operations, PpmProClient, TimesheetService,
    config::{DEFAULT_ORG, default_session_path, load_cookie},
    helpers::hours::parse_hours_list,
};

/// Programmatically interact with PPM Pro timesheets.
///
/// Designed to be called from cron on a regular basis to keep hours updated.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Arguments {
    /// File to read in session cookie from [default: ~/.ppmpro.session]
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Generate a report of the current week's timesheet.
    #[arg(short, long)]
    report: bool,

    /// Update timesheet values for today.
    #[arg(short, long)]
    update: bool,

    /// Submit current timesheet for approval.
    #[arg(short, long)]
    submit: bool,

    /// Approve all pending timesheets.
    #[arg(short, long)]
    approve: bool,

    /// Use specified proxy server to make API requests. Format is "host:port".
    #[arg(short, long)]
    proxy: Option<String>,

    /// Override timesheet date we're operating on. Format is "YYYY-MM-DD".
    #[arg(short = 'D', long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Override externally generated hours with data. Format is a
    /// comma-separated list of hours for each project.
    #[arg(short = 'H', long, value_parser = parse_hours)]
    hours: Option<Hours>,

    /// Organization name of your PPM Pro instance.
    #[arg(short, long, env = "PPMPRO_ORG", default_value = DEFAULT_ORG)]
    org: String,

    /// Increase logging verbosity (can be repeated).
    #[arg(short, long, action = clap::ArgAction::Count, help_heading = "Logging")]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, help_heading = "Logging")]
    quiet: bool,
}

#[derive(Debug, Clone)]
struct Hours(Vec<f64>);

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_hours(value: &str) -> Result<Hours, String> {
    parse_hours_list(value)
        .map(Hours)
        .map_err(|e| format!("expected comma-separated hours: {e}"))
}

fn init_logging(verbose: u8, quiet: bool) -> anyhow::Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ppmpro={level},ppmpro_timesheet_util={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Arguments::parse();

    if let Err(e) = init_logging(args.verbose, args.quiet) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_failure(&e, &mut io::stderr())),
    }
}

/// Prints the failure regardless of the log filter and returns its exit code.
fn report_failure(e: &Error, writer: &mut impl Write) -> u8 {
    debug!("Run failed: {:?}", e);
    let _ = writeln!(writer, "{e}");
    e.exit_code()
}

async fn run(args: Arguments) -> ppmpro_timesheet_util::error::Result<()> {
    let session_path = args.file.unwrap_or_else(default_session_path);
    let cookie = load_cookie(&session_path)?;
    let config = Config::new(args.org, cookie).with_proxy(args.proxy);

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let operations = Operations {
        report: args.report,
        update: args.update,
        submit: args.submit,
        approve: args.approve,
    };

    let client = PpmProClient::new(&config)?;
    let service = TimesheetService::new(client);

    let hours = args.hours.map(|Hours(hours)| hours);
    let id = service
        .run(operations, date, hours.as_deref(), &mut io::stdout().lock())
        .await?;
    info!("Finished with timesheet {}", id);
    Ok(())
}
