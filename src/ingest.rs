//! Record ingestion
//!
//! Parses workout records handed over by the persistence layer (a JSON array
//! or NDJSON, one record per line) and checks them for the data-quality
//! problems the intensity engine assumes have already been ruled out.

use crate::error::ComputeError;
use crate::types::WorkoutRecord;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Day format accepted for date-scoped queries
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Data-quality errors for a single record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Record id is empty")]
    MissingId,

    #[error("Set {set_index} has a non-finite weight")]
    NonFiniteWeight { set_index: usize },

    #[error("Set {set_index} has a negative weight: {weight}")]
    NegativeWeight { set_index: usize, weight: f64 },
}

impl WorkoutRecord {
    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }

        for (set_index, set) in self.sets.iter().enumerate() {
            if !set.weight.is_finite() {
                return Err(ValidationError::NonFiniteWeight { set_index });
            }
            if set.weight < 0.0 {
                return Err(ValidationError::NegativeWeight {
                    set_index,
                    weight: set.weight,
                });
            }
        }

        Ok(())
    }
}

/// Adapter for turning serialized records into engine input
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<WorkoutRecord>, ComputeError> {
        let records: Vec<WorkoutRecord> = serde_json::from_str(json)?;
        debug!(records = records.len(), "parsed record array");
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing records
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<WorkoutRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<WorkoutRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        debug!(records = records.len(), "parsed record ndjson");
        Ok(records)
    }

    /// List every record that fails validation
    pub fn validate_records(records: &[WorkoutRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    record_id: record.id.clone(),
                    error,
                })
            })
            .collect()
    }

    /// Fail on the first invalid record
    pub fn require_valid(records: &[WorkoutRecord]) -> Result<(), ComputeError> {
        match Self::validate_records(records).into_iter().next() {
            Some(invalid) => Err(ComputeError::InvalidRecord(format!(
                "record {} (index {}): {}",
                invalid.record_id, invalid.index, invalid.error
            ))),
            None => Ok(()),
        }
    }

    /// Keep valid records, dropping the rest with a warning
    pub fn partition_valid(records: Vec<WorkoutRecord>) -> Vec<WorkoutRecord> {
        let total = records.len();
        let valid: Vec<WorkoutRecord> = records
            .into_iter()
            .filter(|record| match record.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "dropping invalid workout record");
                    false
                }
            })
            .collect();

        if valid.len() < total {
            debug!(kept = valid.len(), dropped = total - valid.len(), "filtered records");
        }
        valid
    }
}

/// One failed record from [`RecordAdapter::validate_records`]
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub record_id: String,
    pub error: ValidationError,
}

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(value: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
        .map_err(|e| ComputeError::DateParseError(format!("{value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorkoutSet;
    use pretty_assertions::assert_eq;

    fn sample_array_json() -> &'static str {
        r#"[
            {
                "id": "w1",
                "userId": "u1",
                "date": "2024-01-01T09:00:00+00:00",
                "name": "Bench Press",
                "memo": "felt strong",
                "tags": ["push"],
                "sets": [
                    {"weight": 60, "reps": 10},
                    {"weight": 70, "reps": 8}
                ]
            },
            {
                "id": "w2",
                "userId": "u1",
                "date": "2024-01-02T09:00:00+00:00",
                "sets": [{"weight": 100, "reps": 8, "workoutType": "Squat"}]
            }
        ]"#
    }

    #[test]
    fn test_parse_array() {
        let records = RecordAdapter::parse_array(sample_array_json()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Bench Press"));
        assert_eq!(records[0].tags, vec!["push".to_string()]);
        assert_eq!(records[1].memo, "");
        assert_eq!(records[1].sets[0], WorkoutSet::typed("Squat", 100.0, 8));
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = concat!(
            r#"{"id":"a","date":"2024-01-01T09:00:00Z","sets":[{"weight":50,"reps":5}]}"#,
            "\n\n",
            r#"{"id":"b","date":"2024-01-02T09:00:00Z","sets":[]}"#,
            "\n"
        );
        let records = RecordAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].user_id, "");
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = concat!(
            r#"{"id":"a","date":"2024-01-01T09:00:00Z","sets":[]}"#,
            "\n",
            "not json\n"
        );
        let err = RecordAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array_invalid_json() {
        assert!(matches!(
            RecordAdapter::parse_array("not valid json"),
            Err(ComputeError::JsonError(_))
        ));
    }

    #[test]
    fn test_validate_records() {
        let mut records = RecordAdapter::parse_array(sample_array_json()).unwrap();
        records[1].sets[0].weight = -5.0;
        records[0].id = " ".to_string();

        let results = RecordAdapter::validate_records(&records);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].error, ValidationError::MissingId);
        assert_eq!(
            results[1].error,
            ValidationError::NegativeWeight {
                set_index: 0,
                weight: -5.0
            }
        );
    }

    #[test]
    fn test_validate_non_finite_weight() {
        let mut records = RecordAdapter::parse_array(sample_array_json()).unwrap();
        records[0].sets[1].weight = f64::NAN;
        assert_eq!(
            records[0].validate(),
            Err(ValidationError::NonFiniteWeight { set_index: 1 })
        );
        assert!(RecordAdapter::require_valid(&records).is_err());
    }

    #[test]
    fn test_partition_valid_drops_invalid() {
        let mut records = RecordAdapter::parse_array(sample_array_json()).unwrap();
        records[0].sets[0].weight = f64::INFINITY;
        let kept = RecordAdapter::partition_valid(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "w2");
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-01-01").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(matches!(parse_day("01-01-2024"), Err(ComputeError::DateParseError(_))));
    }
}
