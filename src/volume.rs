//! Volume (tonnage) metrics
//!
//! Absolute training volume complements the relative intensity computed in
//! [`crate::intensity`]: a set's volume is `weight * reps` in kilograms.

use crate::intensity::{compute_max_weights, compute_set_intensity};
use crate::types::{WorkoutRecord, WorkoutSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Volume totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub volume: f64,
    pub sets: usize,
    pub reps: u64,
}

/// Aggregates for one exercise label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    pub workout_type: String,
    pub sets: usize,
    pub reps: u64,
    pub volume: f64,
    pub max_weight: f64,
    /// Intensity against the all-time max for the label
    pub total_intensity: f64,
}

pub fn set_volume(set: &WorkoutSet) -> f64 {
    set.weight * f64::from(set.reps)
}

pub fn compute_total_volume(records: &[WorkoutRecord]) -> f64 {
    records
        .iter()
        .flat_map(|r| r.sets.iter())
        .map(set_volume)
        .sum()
}

/// Volume per calendar day, newest day first
pub fn compute_daily_volumes(records: &[WorkoutRecord]) -> Vec<DailyVolume> {
    let mut by_day: BTreeMap<NaiveDate, DailyVolume> = BTreeMap::new();
    for record in records {
        let day = by_day.entry(record.day()).or_insert_with(|| DailyVolume {
            date: record.day(),
            volume: 0.0,
            sets: 0,
            reps: 0,
        });
        for set in &record.sets {
            day.volume += set_volume(set);
            day.sets += 1;
            day.reps += u64::from(set.reps);
        }
    }
    by_day.into_values().rev().collect()
}

/// Per-label totals sorted by label
pub fn compute_label_breakdown(records: &[WorkoutRecord]) -> Vec<LabelStats> {
    let max_weights = compute_max_weights(records);

    let mut by_label: BTreeMap<&str, LabelStats> = BTreeMap::new();
    for record in records {
        for set in &record.sets {
            let label = record.workout_type_of(set);
            let stats = by_label.entry(label).or_insert_with(|| LabelStats {
                workout_type: label.to_string(),
                sets: 0,
                reps: 0,
                volume: 0.0,
                max_weight: max_weights.get(label).copied().unwrap_or_default(),
                total_intensity: 0.0,
            });
            stats.sets += 1;
            stats.reps += u64::from(set.reps);
            stats.volume += set_volume(set);
            stats.total_intensity += compute_set_intensity(set, label, &max_weights).intensity;
        }
    }
    by_label.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn record(id: &str, day: u32, name: Option<&str>, sets: Vec<WorkoutSet>) -> WorkoutRecord {
        WorkoutRecord {
            id: id.to_string(),
            user_id: "u1".to_string(),
            date: Local.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            sets,
            name: name.map(str::to_string),
            memo: String::new(),
            tags: vec![],
        }
    }

    fn records() -> Vec<WorkoutRecord> {
        vec![
            record(
                "a",
                1,
                Some("Bench Press"),
                vec![WorkoutSet::new(60.0, 10), WorkoutSet::typed("Row", 50.0, 12)],
            ),
            record("b", 2, None, vec![WorkoutSet::typed("Squat", 100.0, 5)]),
            record("c", 1, Some("Bench Press"), vec![WorkoutSet::new(80.0, 3)]),
        ]
    }

    #[test]
    fn test_total_volume() {
        assert_eq!(compute_total_volume(&records()), 600.0 + 600.0 + 500.0 + 240.0);
        assert_eq!(compute_total_volume(&[]), 0.0);
    }

    #[test]
    fn test_daily_volumes() {
        let daily = compute_daily_volumes(&records());
        assert_eq!(
            daily,
            vec![
                DailyVolume {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    volume: 500.0,
                    sets: 1,
                    reps: 5,
                },
                DailyVolume {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    volume: 1440.0,
                    sets: 3,
                    reps: 25,
                },
            ]
        );
    }

    #[test]
    fn test_label_breakdown() {
        let breakdown = compute_label_breakdown(&records());
        let labels: Vec<&str> = breakdown.iter().map(|s| s.workout_type.as_str()).collect();
        assert_eq!(labels, vec!["Bench Press", "Row", "Squat"]);

        let bench = &breakdown[0];
        assert_eq!(bench.sets, 2);
        assert_eq!(bench.reps, 13);
        assert_eq!(bench.volume, 840.0);
        assert_eq!(bench.max_weight, 80.0);
        assert!((bench.total_intensity - (7.5 + 3.0)).abs() < 1e-9);
    }
}
