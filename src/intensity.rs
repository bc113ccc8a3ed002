//! Intensity engine
//!
//! Pure functions deriving relative training intensity from a snapshot of
//! workout records. Set intensity is `weight / reference_max * reps`, where
//! the reference max is either the all-time max for the label (global
//! variants) or the max seen on one calendar day (`*_for_date` variants).
//!
//! Nothing here performs I/O or keeps state between calls; the only clock
//! read is in [`compute_days_since_first_workout`].

use crate::types::{DailyIntensity, IntensityResult, MaxWeights, WorkoutRecord, WorkoutSet};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Reference max used for labels missing from a [`MaxWeights`] map
pub const DEFAULT_REFERENCE_MAX: f64 = 1.0;

/// Maximum weight per resolved label across every record
pub fn compute_max_weights(records: &[WorkoutRecord]) -> MaxWeights {
    max_weights_of(records.iter())
}

/// Maximum weight per resolved label, restricted to records on `date`
pub fn compute_max_weights_for_date(records: &[WorkoutRecord], date: NaiveDate) -> MaxWeights {
    max_weights_of(records.iter().filter(|r| r.is_on(date)))
}

fn max_weights_of<'a>(records: impl Iterator<Item = &'a WorkoutRecord>) -> MaxWeights {
    let mut max_weights = MaxWeights::new();
    for record in records {
        for set in &record.sets {
            let label = record.workout_type_of(set);
            match max_weights.get_mut(label) {
                Some(max) if *max >= set.weight => {}
                Some(max) => *max = set.weight,
                None => {
                    max_weights.insert(label.to_string(), set.weight);
                }
            }
        }
    }
    max_weights
}

/// Intensity of one set against the label's entry in `max_weights`.
///
/// A label missing from the map is measured against
/// [`DEFAULT_REFERENCE_MAX`], so its intensity is `weight * reps`. A
/// reference max of zero yields zero intensity and percentage.
pub fn compute_set_intensity(
    set: &WorkoutSet,
    workout_type: &str,
    max_weights: &MaxWeights,
) -> IntensityResult {
    let max_weight = max_weights
        .get(workout_type)
        .copied()
        .unwrap_or(DEFAULT_REFERENCE_MAX);

    // A zero max only comes from labels logged exclusively at 0 kg
    let (intensity, percentage) = if max_weight > 0.0 {
        let ratio = set.weight / max_weight;
        (ratio * f64::from(set.reps), ratio * 100.0)
    } else {
        (0.0, 0.0)
    };

    IntensityResult {
        workout_type: workout_type.to_string(),
        intensity,
        weight: set.weight,
        reps: set.reps,
        max_weight,
        percentage,
    }
}

/// Per-set intensities of one record, in set order
pub fn compute_workout_intensity(
    record: &WorkoutRecord,
    max_weights: &MaxWeights,
) -> Vec<IntensityResult> {
    record
        .sets
        .iter()
        .map(|set| compute_set_intensity(set, record.workout_type_of(set), max_weights))
        .collect()
}

/// Per-day intensity against all-time maxima, newest day first
pub fn compute_daily_intensities(records: &[WorkoutRecord]) -> Vec<DailyIntensity> {
    let max_weights = compute_max_weights(records);

    let mut by_day: BTreeMap<NaiveDate, DailyIntensity> = BTreeMap::new();
    for record in records {
        let day = by_day
            .entry(record.day())
            .or_insert_with(|| DailyIntensity::empty(record.day()));
        for result in compute_workout_intensity(record, &max_weights) {
            day.push(result);
        }
    }

    by_day.into_values().rev().collect()
}

/// Intensity for one day measured against that day's own maxima.
///
/// Returns `None` when no record falls on `date`, which is distinct from a
/// day whose sets add up to zero intensity.
pub fn compute_intensity_for_date(
    records: &[WorkoutRecord],
    date: NaiveDate,
) -> Option<DailyIntensity> {
    let day_records: Vec<&WorkoutRecord> = records.iter().filter(|r| r.is_on(date)).collect();
    if day_records.is_empty() {
        return None;
    }

    let max_weights = max_weights_of(day_records.iter().copied());

    let mut daily = DailyIntensity::empty(date);
    for record in day_records {
        for result in compute_workout_intensity(record, &max_weights) {
            daily.push(result);
        }
    }
    Some(daily)
}

/// Sum of every set's intensity against all-time maxima
pub fn compute_total_intensity(records: &[WorkoutRecord]) -> f64 {
    let max_weights = compute_max_weights(records);
    records
        .iter()
        .flat_map(|record| compute_workout_intensity(record, &max_weights))
        .map(|result| result.intensity)
        .sum()
}

/// Total intensity divided by the number of sets; 0 without sets
pub fn compute_average_intensity(records: &[WorkoutRecord]) -> f64 {
    let set_count: usize = records.iter().map(|r| r.sets.len()).sum();
    if set_count == 0 {
        return 0.0;
    }
    compute_total_intensity(records) / set_count as f64
}

/// Mean daily total over days whose total intensity is non-zero
pub fn compute_average_intensity_excluding_zero_days(records: &[WorkoutRecord]) -> f64 {
    let totals: Vec<f64> = compute_daily_intensities(records)
        .into_iter()
        .map(|day| day.total_intensity)
        .filter(|total| *total != 0.0)
        .collect();

    if totals.is_empty() {
        return 0.0;
    }
    totals.iter().sum::<f64>() / totals.len() as f64
}

/// Whole days elapsed since the earliest record, measured from now
pub fn compute_days_since_first_workout(records: &[WorkoutRecord]) -> i64 {
    compute_days_since_first_workout_at(records, Local::now())
}

/// Whole days elapsed between the earliest record and `now`.
///
/// Uses full timestamps, not calendar days, and truncates toward zero.
pub fn compute_days_since_first_workout_at<Tz: TimeZone>(
    records: &[WorkoutRecord],
    now: DateTime<Tz>,
) -> i64 {
    match records.iter().map(|r| r.date).min() {
        Some(first) => now.signed_duration_since(first).num_days(),
        None => 0,
    }
}
