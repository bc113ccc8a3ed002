//! liftload CLI - Command-line interface for the liftload engine
//!
//! Commands:
//! - daily: Per-day intensity against all-time maxima
//! - day: Intensity for one day against that day's maxima
//! - summary: Headline aggregates
//! - max-weights: Max weight per exercise, optionally for one day
//! - report: Full report (summary, daily, per-exercise breakdown)
//! - validate: Check records for data-quality problems

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use liftload::ingest::{parse_day, RecordAdapter};
use liftload::intensity::{
    compute_daily_intensities, compute_intensity_for_date, compute_max_weights,
    compute_max_weights_for_date,
};
use liftload::report::{summarize, ReportEncoder};
use liftload::{WorkoutRecord, LIFTLOAD_VERSION};

/// liftload - Training-load engine for strength workout logs
#[derive(Parser)]
#[command(name = "liftload")]
#[command(version = LIFTLOAD_VERSION)]
#[command(about = "Compute training intensity from workout records", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "json-pretty")]
    output_format: OutputFormat,

    /// Output file path (use - for stdout)
    #[arg(short, long, global = true, default_value = "-")]
    output: PathBuf,

    /// Log debug information to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-day intensity against all-time maxima, newest day first
    Daily {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Intensity for one day measured against that day's maxima
    Day {
        #[command(flatten)]
        input: InputArgs,

        /// Day to compute (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },

    /// Headline aggregates over all records
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Reference time for day counts (YYYY-MM-DD or RFC 3339, defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Max weight per exercise
    MaxWeights {
        #[command(flatten)]
        input: InputArgs,

        /// Restrict to one day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Full report: summary, daily intensities and per-exercise breakdown
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Reference time for day counts (YYYY-MM-DD or RFC 3339, defaults to now)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Check records for data-quality problems
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "json")]
    input_format: InputFormat,

    /// Drop invalid records with a warning instead of failing
    #[arg(long)]
    skip_invalid: bool,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one item per line)
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), LiftloadCliError> {
    let output = match cli.command {
        Commands::Daily { input } => {
            let records = load_records(&input)?;
            format_items(&compute_daily_intensities(&records), &cli.output_format)?
        }

        Commands::Day { input, date } => {
            let day = parse_day(&date)?;
            let records = load_records(&input)?;
            // A day without workouts prints `null`, matching the library and FFI
            format_value(&compute_intensity_for_date(&records, day), &cli.output_format)?
        }

        Commands::Summary { input, as_of } => {
            let now = parse_as_of(as_of.as_deref())?;
            let records = load_records(&input)?;
            format_value(&summarize(&records, now), &cli.output_format)?
        }

        Commands::MaxWeights { input, date } => {
            let records = load_records(&input)?;
            let max_weights = match date {
                Some(date) => compute_max_weights_for_date(&records, parse_day(&date)?),
                None => compute_max_weights(&records),
            };
            format_value(&max_weights, &cli.output_format)?
        }

        Commands::Report { input, as_of } => {
            let now = parse_as_of(as_of.as_deref())?;
            let records = load_records(&input)?;
            let report = ReportEncoder::new().encode(&records, now);
            format_value(&report, &cli.output_format)?
        }

        Commands::Validate { input, json } => return cmd_validate(&input, json),
    };

    write_output(&cli.output, &output)
}

fn read_input(path: &PathBuf) -> Result<String, LiftloadCliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading records from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_records(input: &InputArgs) -> Result<Vec<WorkoutRecord>, LiftloadCliError> {
    let data = read_input(&input.input)?;
    let records = match input.input_format {
        InputFormat::Json => RecordAdapter::parse_array(&data)?,
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
    };
    debug!(records = records.len(), path = %input.input.display(), "loaded input");
    Ok(records)
}

fn load_records(input: &InputArgs) -> Result<Vec<WorkoutRecord>, LiftloadCliError> {
    let records = parse_records(input)?;

    if input.skip_invalid {
        Ok(RecordAdapter::partition_valid(records))
    } else {
        RecordAdapter::require_valid(&records)?;
        Ok(records)
    }
}

fn parse_as_of(value: Option<&str>) -> Result<DateTime<Local>, LiftloadCliError> {
    let Some(value) = value else {
        return Ok(Local::now());
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Local));
    }

    let day = parse_day(value)?;
    local_midnight(day).ok_or_else(|| LiftloadCliError::InvalidAsOf(value.to_string()))
}

fn local_midnight(day: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&midnight).earliest()
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), LiftloadCliError> {
    let records = parse_records(input)?;
    let results = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                record_id: r.record_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (index {}): {}",
                    err.record_id, err.index, err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(LiftloadCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn format_items<T: Serialize>(items: &[T], format: &OutputFormat) -> Result<String, LiftloadCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines = String::new();
            for item in items {
                lines.push_str(&serde_json::to_string(item)?);
                lines.push('\n');
            }
            Ok(lines)
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string(items)?)),
        OutputFormat::JsonPretty => Ok(format!("{}\n", serde_json::to_string_pretty(items)?)),
    }
}

fn format_value<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, LiftloadCliError> {
    match format {
        OutputFormat::Ndjson | OutputFormat::Json => {
            Ok(format!("{}\n", serde_json::to_string(value)?))
        }
        OutputFormat::JsonPretty => Ok(format!("{}\n", serde_json::to_string_pretty(value)?)),
    }
}

fn write_output(path: &PathBuf, data: &str) -> Result<(), LiftloadCliError> {
    if path.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(path, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug, Error)]
enum LiftloadCliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Compute(#[from] liftload::ComputeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Cannot resolve {0:?} to a local time")]
    InvalidAsOf(String),
    #[error("{0} records failed validation")]
    ValidationFailed(usize),
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LiftloadCliError> for CliError {
    fn from(e: LiftloadCliError) -> Self {
        let message = e.to_string();
        let (code, hint) = match e {
            LiftloadCliError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
            LiftloadCliError::Compute(liftload::ComputeError::InvalidRecord(_)) => (
                "INVALID_RECORD",
                "Run 'liftload validate' for details, or pass --skip-invalid",
            ),
            LiftloadCliError::Compute(liftload::ComputeError::DateParseError(_)) => {
                ("DATE_ERROR", "Dates use the YYYY-MM-DD format")
            }
            LiftloadCliError::Compute(_) => (
                "PARSE_ERROR",
                "Ensure input is a JSON array (or NDJSON) of workout records",
            ),
            LiftloadCliError::Json(_) => ("JSON_ERROR", "Check JSON syntax"),
            LiftloadCliError::InvalidAsOf(_) => {
                ("AS_OF_ERROR", "Use an RFC 3339 timestamp instead")
            }
            LiftloadCliError::ValidationFailed(_) => {
                ("VALIDATION_FAILED", "Fix validation errors and retry")
            }
        };

        CliError {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    record_id: String,
    error: String,
}
