//! Core types for the liftload engine
//!
//! Input records as handed over by the persistence layer, and the derived
//! values the intensity engine produces from them.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label used when neither the set nor its record names an exercise
pub const UNKNOWN_WORKOUT_TYPE: &str = "unknown";

/// One performed set of an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    /// Load in kilograms (zero for bodyweight or timed entries)
    pub weight: f64,
    /// Repetitions performed
    pub reps: u32,
    /// Exercise label for this set; falls back to the record name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<String>,
}

impl WorkoutSet {
    pub fn new(weight: f64, reps: u32) -> Self {
        Self {
            weight,
            reps,
            workout_type: None,
        }
    }

    pub fn typed(workout_type: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            weight,
            reps,
            workout_type: Some(workout_type.into()),
        }
    }
}

/// One logged session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    /// Local timestamp; the calendar day is what groups records together
    pub date: DateTime<Local>,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
    /// Record-level default exercise label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WorkoutRecord {
    /// Calendar day of this record in the local timezone
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.day() == day
    }

    /// Effective exercise label for one of this record's sets.
    ///
    /// Resolution order is `set.workout_type`, then `self.name`, then
    /// [`UNKNOWN_WORKOUT_TYPE`]. Empty strings count as missing.
    pub fn workout_type_of<'a>(&'a self, set: &'a WorkoutSet) -> &'a str {
        non_empty(set.workout_type.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or(UNKNOWN_WORKOUT_TYPE)
    }
}

fn non_empty(label: Option<&str>) -> Option<&str> {
    label.filter(|l| !l.is_empty())
}

/// Maximum observed weight per exercise label
pub type MaxWeights = BTreeMap<String, f64>;

/// Relative intensity of a single set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityResult {
    pub workout_type: String,
    /// `weight / max_weight * reps`
    pub intensity: f64,
    pub weight: f64,
    pub reps: u32,
    /// Reference max the set was measured against
    pub max_weight: f64,
    /// Weight as a percentage of `max_weight`
    pub percentage: f64,
}

/// Intensity totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIntensity {
    pub date: NaiveDate,
    pub total_intensity: f64,
    /// Distinct labels trained that day, in first-seen order
    pub workout_types: Vec<String>,
    /// Per-set results in record and set order
    pub details: Vec<IntensityResult>,
}

impl DailyIntensity {
    pub(crate) fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_intensity: 0.0,
            workout_types: Vec::new(),
            details: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, result: IntensityResult) {
        self.total_intensity += result.intensity;
        if !self.workout_types.contains(&result.workout_type) {
            self.workout_types.push(result.workout_type.clone());
        }
        self.details.push(result);
    }
}
