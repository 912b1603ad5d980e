use std::collections::{HashMap, HashSet};

use crate::models::{Derived, Inconsistency};

/// Verifies that every row of an incident carries identical derived
/// values. Returns one finding per violating incident, sorted by key.
/// Diagnostic only; callers log the findings and keep going.
pub fn check_consistency(derived: &[Derived]) -> Vec<Inconsistency> {
    let mut groups: HashMap<&str, Vec<&Derived>> = HashMap::new();
    for row in derived {
        groups.entry(row.incident_id.as_str()).or_default().push(row);
    }

    let mut findings = Vec::new();
    for (id, rows) in &groups {
        let mut columns: Vec<&'static str> = Vec::new();
        if distinct(rows.iter().map(|d| d.subjects_norm)) > 1 {
            columns.push("subjects_norm");
        }
        if distinct(rows.iter().map(|d| d.reporting_time_norm)) > 1 {
            columns.push("reporting_time_norm");
        }
        if distinct(rows.iter().map(|d| d.data_types_norm)) > 1 {
            columns.push("data_types_norm");
        }
        let scores: HashSet<u8> = rows.iter().map(|d| d.severity_score).collect();
        if scores.len() > 1 {
            columns.push("severity_score");
        }
        if !columns.is_empty() {
            findings.push(Inconsistency {
                incident_id: (*id).to_string(),
                columns,
            });
        }
    }

    findings.sort_by(|a, b| a.incident_id.cmp(&b.incident_id));
    findings
}

// Distinct defined values; missing values do not count toward the tally.
fn distinct(values: impl Iterator<Item = Option<f64>>) -> usize {
    values
        .flatten()
        .map(f64::to_bits)
        .collect::<HashSet<u64>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived(incident_id: &str, subjects_norm: Option<f64>, severity_score: u8) -> Derived {
        Derived {
            reporting_time_hrs: Some(12.0),
            incident_id: incident_id.to_string(),
            subjects_num: Some(5.0),
            data_types_per_incident: 1,
            subjects_norm,
            reporting_time_norm: Some(0.0),
            data_types_norm: Some(0.0),
            severity_score,
        }
    }

    #[test]
    fn consistent_groups_produce_no_findings() {
        let rows = vec![
            derived("BI001_2023_Q1", Some(0.5), 3),
            derived("BI001_2023_Q1", Some(0.5), 3),
            derived("BI002_2023_Q2", Some(1.0), 6),
        ];
        assert!(check_consistency(&rows).is_empty());
    }

    #[test]
    fn diverging_values_are_reported_with_their_columns() {
        let rows = vec![
            derived("BI001_2023_Q1", Some(0.5), 3),
            derived("BI001_2023_Q1", Some(0.7), 4),
        ];
        let findings = check_consistency(&rows);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].incident_id, "BI001_2023_Q1");
        assert_eq!(findings[0].columns, vec!["subjects_norm", "severity_score"]);
    }

    #[test]
    fn missing_values_do_not_count_as_divergence() {
        let rows = vec![
            derived("BI001_2023_Q1", None, 3),
            derived("BI001_2023_Q1", Some(0.5), 3),
        ];
        assert!(check_consistency(&rows).is_empty());
    }
}
