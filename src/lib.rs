//! liftload - Deterministic training-load engine for strength workout logs
//!
//! liftload turns a snapshot of workout records into relative intensity
//! metrics: per-set percentage of max, per-day totals, and aggregate
//! averages. The engine is a set of pure functions over `&[WorkoutRecord]`;
//! ingestion, reporting, a stateful processor, a C ABI and a CLI wrap it.
//!
//! ## Modules
//!
//! - **Intensity Engine** (`intensity`): max weights, set/day intensity, averages
//! - **Volume** (`volume`): tonnage per day and per exercise
//! - **Boundaries** (`ingest`, `report`, `processor`, `ffi`): JSON in, JSON out

pub mod error;
pub mod ingest;
pub mod intensity;
pub mod processor;
pub mod report;
pub mod types;
pub mod volume;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use ingest::{RecordAdapter, ValidationError};
pub use intensity::{
    compute_average_intensity, compute_average_intensity_excluding_zero_days,
    compute_daily_intensities, compute_days_since_first_workout,
    compute_days_since_first_workout_at, compute_intensity_for_date, compute_max_weights,
    compute_max_weights_for_date, compute_set_intensity, compute_total_intensity,
    compute_workout_intensity,
};
pub use processor::{
    records_to_daily_json, records_to_date_json, records_to_report_json, records_to_summary_json,
    IntensityProcessor, ProcessorConfig,
};
pub use report::{summarize, IntensityReport, ReportEncoder, TrainingSummary};
pub use types::{DailyIntensity, IntensityResult, MaxWeights, WorkoutRecord, WorkoutSet};

/// liftload version embedded in all reports
pub const LIFTLOAD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "liftload";
