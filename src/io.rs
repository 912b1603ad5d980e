use std::path::Path;

use anyhow::Context;

use crate::models::{Derived, RawTable};

/// Derived columns appended to the input schema, in output order.
pub const DERIVED_HEADERS: [&str; 8] = [
    "reporting_time_hrs",
    "Incident_ID",
    "subjects_num",
    "data_types_per_incident",
    "subjects_norm",
    "reporting_time_norm",
    "data_types_norm",
    "severity_score",
];

pub fn read_table(path: &Path) -> anyhow::Result<RawTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result.with_context(|| format!("malformed CSV row in {}", path.display()))?;
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

pub fn write_table(path: &Path, table: &RawTable) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the input table with the derived columns appended to each row.
/// `derived` must be row-aligned with `table.rows`.
pub fn write_enriched(path: &Path, table: &RawTable, derived: &[Derived]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut headers = table.headers.clone();
    for name in DERIVED_HEADERS {
        headers.push_field(name);
    }
    writer.write_record(&headers)?;

    for (row, extra) in table.rows.iter().zip(derived) {
        let mut record = row.clone();
        record.push_field(&fmt_opt(extra.reporting_time_hrs));
        record.push_field(&extra.incident_id);
        record.push_field(&fmt_opt(extra.subjects_num));
        record.push_field(&extra.data_types_per_incident.to_string());
        record.push_field(&fmt_opt(extra.subjects_norm));
        record.push_field(&fmt_opt(extra.reporting_time_norm));
        record.push_field(&fmt_opt(extra.data_types_norm));
        record.push_field(&extra.severity_score.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

// Missing values write as empty cells, the same shape they arrive in.
fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_format_as_empty_cells() {
        assert_eq!(fmt_opt(None), "");
        assert_eq!(fmt_opt(Some(54.5)), "54.5");
        assert_eq!(fmt_opt(Some(12.0)), "12");
    }
}
