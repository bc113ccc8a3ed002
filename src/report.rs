//! Report encoding
//!
//! Bundles the engine's aggregates into a single serializable report for
//! presentation layers (summary cards, charts, calendars).

use crate::error::ComputeError;
use crate::intensity::{
    compute_average_intensity, compute_average_intensity_excluding_zero_days,
    compute_daily_intensities, compute_days_since_first_workout_at, compute_max_weights,
    compute_total_intensity,
};
use crate::types::{DailyIntensity, MaxWeights, WorkoutRecord};
use crate::volume::{compute_label_breakdown, compute_total_volume, LabelStats};
use crate::{LIFTLOAD_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Headline aggregates over a record snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub workouts: usize,
    pub sets: usize,
    /// Distinct calendar days with at least one record
    pub active_days: usize,
    pub total_intensity: f64,
    pub average_intensity: f64,
    pub average_intensity_excluding_zero_days: f64,
    pub days_since_first_workout: i64,
    pub total_volume: f64,
    pub max_weights: MaxWeights,
}

/// Summarize `records` as of `now`
pub fn summarize(records: &[WorkoutRecord], now: DateTime<Local>) -> TrainingSummary {
    let active_days: BTreeSet<NaiveDate> = records.iter().map(|r| r.day()).collect();

    TrainingSummary {
        workouts: records.len(),
        sets: records.iter().map(|r| r.sets.len()).sum(),
        active_days: active_days.len(),
        total_intensity: compute_total_intensity(records),
        average_intensity: compute_average_intensity(records),
        average_intensity_excluding_zero_days: compute_average_intensity_excluding_zero_days(
            records,
        ),
        days_since_first_workout: compute_days_since_first_workout_at(records, now),
        total_volume: compute_total_volume(records),
        max_weights: compute_max_weights(records),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Full report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntensityReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub summary: TrainingSummary,
    /// Newest day first
    pub daily: Vec<DailyIntensity>,
    pub breakdown: Vec<LabelStats>,
}

/// Encoder producing [`IntensityReport`]s
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, records: &[WorkoutRecord], now: DateTime<Local>) -> IntensityReport {
        IntensityReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: LIFTLOAD_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: now.with_timezone(&Utc).to_rfc3339(),
            summary: summarize(records, now),
            daily: compute_daily_intensities(records),
            breakdown: compute_label_breakdown(records),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        records: &[WorkoutRecord],
        now: DateTime<Local>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(records, now);
        serde_json::to_string_pretty(&report).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkoutSet;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<WorkoutRecord> {
        let make = |id: &str, day: u32, sets: Vec<WorkoutSet>| WorkoutRecord {
            id: id.to_string(),
            user_id: "u1".to_string(),
            date: Local.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            sets,
            name: Some("Bench Press".to_string()),
            memo: String::new(),
            tags: vec![],
        };
        vec![
            make("a", 1, vec![WorkoutSet::new(50.0, 10), WorkoutSet::new(100.0, 2)]),
            make("b", 3, vec![WorkoutSet::typed("Squat", 120.0, 5)]),
            make("c", 3, vec![]),
        ]
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&records(), now());

        assert_eq!(summary.workouts, 3);
        assert_eq!(summary.sets, 3);
        assert_eq!(summary.active_days, 2);
        assert_eq!(summary.days_since_first_workout, 9);
        assert_eq!(summary.total_volume, 500.0 + 200.0 + 600.0);
        assert!((summary.total_intensity - 12.0).abs() < 1e-9);
        assert!((summary.average_intensity - 4.0).abs() < 1e-9);
        assert!((summary.average_intensity_excluding_zero_days - 6.0).abs() < 1e-9);
        assert_eq!(summary.max_weights.get("Squat"), Some(&120.0));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], now());
        assert_eq!(summary.workouts, 0);
        assert_eq!(summary.total_intensity, 0.0);
        assert_eq!(summary.average_intensity, 0.0);
        assert_eq!(summary.average_intensity_excluding_zero_days, 0.0);
        assert_eq!(summary.days_since_first_workout, 0);
        assert!(summary.max_weights.is_empty());
    }

    #[test]
    fn test_encode_report() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&records(), now());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, LIFTLOAD_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.breakdown.len(), 2);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder.encode_to_json(&records(), now()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert_eq!(parsed["summary"]["workouts"], 3);
        assert_eq!(parsed["daily"][0]["date"], "2024-01-03");
    }
}
