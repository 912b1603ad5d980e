use std::collections::{HashMap, HashSet};

use csv::StringRecord;

use crate::mapping;
use crate::models::{cell, Derived, RawTable, RequiredColumns};

pub const SUBJECTS_WEIGHT: f64 = 0.5;
pub const REPORTING_TIME_WEIGHT: f64 = 0.3;
pub const DATA_TYPES_WEIGHT: f64 = 0.2;

/// Composite grouping key. The raw reference alone is not unique: the
/// same reference recurs when an incident is re-reported in a later
/// period, so year and quarter are part of the identity.
pub fn incident_id(row: &StringRecord, columns: &RequiredColumns) -> String {
    format!(
        "{}_{}_{}",
        row.get(columns.bi_reference).unwrap_or(""),
        row.get(columns.year).unwrap_or(""),
        row.get(columns.quarter).unwrap_or("")
    )
}

/// Runs the mapper, aggregator, normalizer, and scorer over a validated
/// table, producing one `Derived` per input row.
pub fn enrich(table: &RawTable, columns: &RequiredColumns) -> Vec<Derived> {
    let ids: Vec<String> = table
        .rows
        .iter()
        .map(|row| incident_id(row, columns))
        .collect();

    let hours: Vec<Option<f64>> = table
        .rows
        .iter()
        .map(|row| {
            let bucket = cell(row, columns.time_taken);
            if bucket.is_empty() {
                None
            } else {
                mapping::reporting_hours(bucket)
            }
        })
        .collect();

    // Subjects are mapped once per distinct incident and broadcast back,
    // so redundant rows of the same incident cannot diverge. First
    // observed bucket wins if rows ever disagree; the consistency check
    // surfaces anything that still slips through.
    let mut subjects_by_incident: HashMap<&str, Option<f64>> = HashMap::new();
    for (row, id) in table.rows.iter().zip(&ids) {
        subjects_by_incident
            .entry(id.as_str())
            .or_insert_with(|| mapping::subjects_midpoint(cell(row, columns.subjects_affected)));
    }
    let subjects: Vec<Option<f64>> = ids
        .iter()
        .map(|id| subjects_by_incident.get(id.as_str()).copied().flatten())
        .collect();

    // Distinct data-type labels per incident; blank labels do not count.
    let mut types_by_incident: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (row, id) in table.rows.iter().zip(&ids) {
        let label = row.get(columns.data_type).unwrap_or("");
        let seen = types_by_incident.entry(id.as_str()).or_default();
        if !label.is_empty() {
            seen.insert(label);
        }
    }
    let type_counts: Vec<usize> = ids
        .iter()
        .map(|id| types_by_incident.get(id.as_str()).map_or(0, HashSet::len))
        .collect();

    let subjects_norm = normalize(&subjects);
    let reporting_norm = normalize(&hours);
    let counts_as_f64: Vec<Option<f64>> = type_counts.iter().map(|&c| Some(c as f64)).collect();
    let types_norm = normalize(&counts_as_f64);

    ids.iter()
        .enumerate()
        .map(|(i, id)| Derived {
            reporting_time_hrs: hours[i],
            incident_id: id.clone(),
            subjects_num: subjects[i],
            data_types_per_incident: type_counts[i],
            subjects_norm: subjects_norm[i],
            reporting_time_norm: reporting_norm[i],
            data_types_norm: types_norm[i],
            severity_score: severity_score(subjects_norm[i], reporting_norm[i], types_norm[i]),
        })
        .collect()
}

/// Min-max scales a series to [0, 1]. A constant series (or one with no
/// defined values) normalizes to all-missing: it carries no
/// discriminating signal. Missing inputs stay missing.
pub fn normalize(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values.iter().flatten() {
        min = min.min(*value);
        max = max.max(*value);
    }

    if !min.is_finite() || !max.is_finite() || min == max {
        return vec![None; values.len()];
    }

    values
        .iter()
        .map(|value| value.map(|x| (x - min) / (max - min)))
        .collect()
}

/// Weighted severity score, rounded to an integer in [1, 10].
///
/// Missing normalized components are substituted with 0 here, unlike the
/// normalizer, which propagates them. The score is therefore always
/// defined, at the cost of underweighting incidents with incomplete
/// categorical data rather than excluding them. Deliberate: scores must
/// cover the whole dataset.
pub fn severity_score(
    subjects_norm: Option<f64>,
    reporting_time_norm: Option<f64>,
    data_types_norm: Option<f64>,
) -> u8 {
    let weighted = subjects_norm.unwrap_or(0.0) * SUBJECTS_WEIGHT
        + reporting_time_norm.unwrap_or(0.0) * REPORTING_TIME_WEIGHT
        + data_types_norm.unwrap_or(0.0) * DATA_TYPES_WEIGHT;
    (1.0 + 9.0 * weighted).round() as u8
}
