use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

/// The slice of an enhanced export the report needs; any other columns
/// in the file are ignored.
#[derive(Debug, Deserialize)]
pub struct EnrichedRow {
    #[serde(rename = "BI Reference")]
    pub bi_reference: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "Time Taken to Report")]
    pub time_taken_to_report: Option<String>,
    #[serde(rename = "Incident_ID")]
    pub incident_id: String,
    #[serde(rename = "subjects_num")]
    pub subjects_num: Option<f64>,
    #[serde(rename = "severity_score")]
    pub severity_score: f64,
}

pub fn generate(input: &Path, out: &Path) -> anyhow::Result<()> {
    info!("reading enhanced file: {}", input.display());
    let rows = read_enhanced(input)?;
    let report = build_report(&rows, chrono::Utc::now().date_naive());
    std::fs::write(out, report)
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn read_enhanced(path: &Path) -> anyhow::Result<Vec<EnrichedRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<EnrichedRow>() {
        let row = result.with_context(|| {
            format!("{} does not look like an enhanced export", path.display())
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn build_report(rows: &[EnrichedRow], generated: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Security Incident Severity Report");
    let _ = writeln!(output, "Generated on {generated}");
    let _ = writeln!(output);

    let incidents: HashSet<&str> = rows.iter().map(|r| r.incident_id.as_str()).collect();
    let references: HashSet<&str> = rows.iter().map(|r| r.bi_reference.as_str()).collect();

    let _ = writeln!(output, "## Dataset");
    let _ = writeln!(output, "- {} rows", rows.len());
    let _ = writeln!(output, "- {} incidents", incidents.len());
    let _ = writeln!(output, "- {} distinct raw references", references.len());

    // One score per incident; every row of an incident carries the same
    // score, so the first observation stands for the group.
    let mut score_by_incident: HashMap<&str, u8> = HashMap::new();
    for row in rows {
        score_by_incident
            .entry(row.incident_id.as_str())
            .or_insert(row.severity_score.round() as u8);
    }
    let mut distribution: [usize; 11] = [0; 11];
    for score in score_by_incident.values() {
        if (1..=10).contains(score) {
            distribution[usize::from(*score)] += 1;
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Severity Distribution");
    if score_by_incident.is_empty() {
        let _ = writeln!(output, "No incidents in this export.");
    } else {
        for score in 1..=10usize {
            if distribution[score] > 0 {
                let _ = writeln!(
                    output,
                    "- score {}: {} incidents",
                    score, distribution[score]
                );
            }
        }
    }

    // References reported across more than one period.
    let mut periods_by_reference: HashMap<&str, HashSet<(&str, &str)>> = HashMap::new();
    for row in rows {
        periods_by_reference
            .entry(row.bi_reference.as_str())
            .or_default()
            .insert((row.year.as_str(), row.quarter.as_str()));
    }
    let recurring: Vec<usize> = periods_by_reference
        .values()
        .map(HashSet::len)
        .filter(|&n| n > 1)
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cross-Quarter Incidents");
    if recurring.is_empty() {
        let _ = writeln!(output, "No references recur across reporting periods.");
    } else {
        let total: usize = recurring.iter().sum();
        let _ = writeln!(
            output,
            "- {} references appear in more than one period",
            recurring.len()
        );
        let _ = writeln!(
            output,
            "- {:.2} periods per recurring reference on average",
            total as f64 / recurring.len() as f64
        );
    }

    let missing_delay = rows
        .iter()
        .filter(|r| {
            r.time_taken_to_report
                .as_deref()
                .map_or(true, |v| v.trim().is_empty())
        })
        .count();
    let unknown_subjects: HashSet<&str> = rows
        .iter()
        .filter(|r| r.subjects_num.is_none())
        .map(|r| r.incident_id.as_str())
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Quality");
    let _ = writeln!(output, "- {missing_delay} rows without a reporting delay");
    let _ = writeln!(
        output,
        "- {} incidents with an unknown subjects bucket",
        unknown_subjects.len()
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        bi_reference: &str,
        year: &str,
        quarter: &str,
        subjects_num: Option<f64>,
        severity_score: f64,
    ) -> EnrichedRow {
        EnrichedRow {
            bi_reference: bi_reference.to_string(),
            year: year.to_string(),
            quarter: quarter.to_string(),
            time_taken_to_report: Some("Less than 24 hours".to_string()),
            incident_id: format!("{bi_reference}_{year}_{quarter}"),
            subjects_num,
            severity_score,
        }
    }

    fn generated() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[test]
    fn counts_incidents_once_despite_multiple_rows() {
        let rows = vec![
            row("BI001", "2023", "Q1", Some(5.0), 4.0),
            row("BI001", "2023", "Q1", Some(5.0), 4.0),
            row("BI002", "2023", "Q2", None, 1.0),
        ];
        let report = build_report(&rows, generated());
        assert!(report.contains("- 3 rows"));
        assert!(report.contains("- 2 incidents"));
        assert!(report.contains("- score 4: 1 incidents"));
        assert!(report.contains("- 1 incidents with an unknown subjects bucket"));
    }

    #[test]
    fn detects_cross_quarter_references() {
        let rows = vec![
            row("BI001", "2023", "Q1", Some(5.0), 4.0),
            row("BI001", "2023", "Q3", Some(5.0), 4.0),
            row("BI002", "2023", "Q2", Some(54.5), 6.0),
        ];
        let report = build_report(&rows, generated());
        assert!(report.contains("- 1 references appear in more than one period"));
        assert!(report.contains("- 2.00 periods per recurring reference"));
    }

    #[test]
    fn handles_empty_export() {
        let report = build_report(&[], generated());
        assert!(report.contains("No incidents in this export."));
        assert!(report.contains("No references recur across reporting periods."));
    }
}
