//! Processing entry points
//!
//! JSON-in, JSON-out helpers over the intensity engine, and a stateful
//! [`IntensityProcessor`] that keeps a record snapshot between calls. The
//! snapshot is always handed to the engine as an argument; the engine never
//! sees the processor.

use crate::error::ComputeError;
use crate::ingest::RecordAdapter;
use crate::intensity::{
    compute_daily_intensities, compute_intensity_for_date, compute_max_weights,
    compute_max_weights_for_date,
};
use crate::report::{summarize, IntensityReport, ReportEncoder, TrainingSummary};
use crate::types::{DailyIntensity, MaxWeights, WorkoutRecord};
use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

/// Daily intensities (newest first) for a JSON array of records.
///
/// # Example
/// ```ignore
/// let daily_json = records_to_daily_json(records_json)?;
/// ```
pub fn records_to_daily_json(raw_json: &str) -> Result<String, ComputeError> {
    let records = parse_valid(raw_json)?;
    let daily = compute_daily_intensities(&records);
    Ok(serde_json::to_string(&daily)?)
}

/// Training summary for a JSON array of records, as of now
pub fn records_to_summary_json(raw_json: &str) -> Result<String, ComputeError> {
    let records = parse_valid(raw_json)?;
    let summary = summarize(&records, Local::now());
    Ok(serde_json::to_string(&summary)?)
}

/// Day-local intensity for `date`; the JSON literal `null` when the day has
/// no records
pub fn records_to_date_json(raw_json: &str, date: NaiveDate) -> Result<String, ComputeError> {
    let records = parse_valid(raw_json)?;
    let result = compute_intensity_for_date(&records, date);
    Ok(serde_json::to_string(&result)?)
}

/// Full report for a JSON array of records
pub fn records_to_report_json(raw_json: &str) -> Result<String, ComputeError> {
    let records = parse_valid(raw_json)?;
    ReportEncoder::new().encode_to_json(&records, Local::now())
}

fn parse_valid(raw_json: &str) -> Result<Vec<WorkoutRecord>, ComputeError> {
    let records = RecordAdapter::parse_array(raw_json)?;
    RecordAdapter::require_valid(&records)?;
    Ok(records)
}

/// Processor configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Fail ingestion on the first invalid record instead of skipping it
    pub reject_invalid: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            reject_invalid: true,
        }
    }
}

/// Stateful processor holding a record snapshot across calls.
///
/// Use this when records arrive in batches (for example from a live
/// subscription) and several views are computed from the same snapshot.
pub struct IntensityProcessor {
    config: ProcessorConfig,
    records: Vec<WorkoutRecord>,
    as_of: Option<DateTime<Local>>,
    encoder: ReportEncoder,
}

impl Default for IntensityProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl IntensityProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            as_of: None,
            encoder: ReportEncoder::new(),
        }
    }

    /// Pin "now" for day counts instead of reading the wall clock
    pub fn with_as_of(mut self, as_of: DateTime<Local>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Current snapshot
    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    /// Add records from a JSON array; returns how many were kept
    pub fn ingest_json(&mut self, raw_json: &str) -> Result<usize, ComputeError> {
        let records = RecordAdapter::parse_array(raw_json)?;
        self.ingest(records)
    }

    /// Add records from NDJSON; returns how many were kept
    pub fn ingest_ndjson(&mut self, ndjson: &str) -> Result<usize, ComputeError> {
        let records = RecordAdapter::parse_ndjson(ndjson)?;
        self.ingest(records)
    }

    /// Add already-parsed records, replacing any with the same id
    pub fn ingest(&mut self, records: Vec<WorkoutRecord>) -> Result<usize, ComputeError> {
        let records = self.screen(records)?;

        let kept = records.len();
        for record in records {
            match self.records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => self.records.push(record),
            }
        }

        debug!(kept, total = self.records.len(), "ingested workout records");
        Ok(kept)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn max_weights(&self) -> MaxWeights {
        compute_max_weights(&self.records)
    }

    pub fn max_weights_for_date(&self, date: NaiveDate) -> MaxWeights {
        compute_max_weights_for_date(&self.records, date)
    }

    pub fn daily_intensities(&self) -> Vec<DailyIntensity> {
        compute_daily_intensities(&self.records)
    }

    pub fn intensity_for_date(&self, date: NaiveDate) -> Option<DailyIntensity> {
        compute_intensity_for_date(&self.records, date)
    }

    pub fn summary(&self) -> TrainingSummary {
        summarize(&self.records, self.now())
    }

    pub fn report(&self) -> IntensityReport {
        self.encoder.encode(&self.records, self.now())
    }

    pub fn report_json(&self) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(&self.records, self.now())
    }

    /// Save the snapshot as a JSON array
    pub fn save_records(&self) -> Result<String, ComputeError> {
        serde_json::to_string(&self.records).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Replace the snapshot with a JSON array saved by [`Self::save_records`].
    ///
    /// The held snapshot is left untouched if parsing or validation fails.
    pub fn load_records(&mut self, json: &str) -> Result<(), ComputeError> {
        let records = self.screen(RecordAdapter::parse_array(json)?)?;

        let mut loaded: Vec<WorkoutRecord> = Vec::with_capacity(records.len());
        for record in records {
            match loaded.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => loaded.push(record),
            }
        }

        debug!(total = loaded.len(), "loaded workout records");
        self.records = loaded;
        Ok(())
    }

    /// Apply the configured invalid-record policy
    fn screen(&self, records: Vec<WorkoutRecord>) -> Result<Vec<WorkoutRecord>, ComputeError> {
        if self.config.reject_invalid {
            RecordAdapter::require_valid(&records)?;
            Ok(records)
        } else {
            Ok(RecordAdapter::partition_valid(records))
        }
    }

    fn now(&self) -> DateTime<Local> {
        self.as_of.unwrap_or_else(Local::now)
    }
}
