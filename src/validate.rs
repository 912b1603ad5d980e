use anyhow::bail;
use tracing::warn;

use crate::mapping;
use crate::models::{cell, RawTable, RequiredColumns};

/// Checks structural and domain-value preconditions on the raw table.
///
/// Fails when the table has no rows, when any required column is absent,
/// or when any non-blank reporting-delay value falls outside the
/// recognized bucket set. Blank delay values are tolerated and counted
/// as a warning only.
pub fn validate_input(table: &RawTable) -> anyhow::Result<RequiredColumns> {
    if table.rows.is_empty() {
        bail!("input table is empty");
    }

    let columns = match RequiredColumns::resolve(table) {
        Ok(columns) => columns,
        Err(missing) => bail!("missing required columns: {}", missing.join(", ")),
    };

    let mut invalid: Vec<String> = Vec::new();
    let mut blank = 0usize;
    for row in &table.rows {
        let value = cell(row, columns.time_taken);
        if value.is_empty() {
            blank += 1;
        } else if !mapping::is_recognized_delay(value) && !invalid.iter().any(|seen| seen == value)
        {
            invalid.push(value.to_string());
        }
    }

    if !invalid.is_empty() {
        bail!("invalid reporting-delay values: {}", invalid.join(", "));
    }
    if blank > 0 {
        warn!("found {blank} blank 'Time Taken to Report' values");
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::StringRecord;

    fn sample_table() -> RawTable {
        let headers = StringRecord::from(vec![
            "BI Reference",
            "Year",
            "Quarter",
            "Time Taken to Report",
            "Data Type",
            "No. Data Subjects Affected",
        ]);
        let rows = vec![
            StringRecord::from(vec![
                "BI001",
                "2023",
                "Q1",
                "Less than 24 hours",
                "Personal",
                "1 to 9",
            ]),
            StringRecord::from(vec![
                "BI002",
                "2023",
                "Q2",
                "24 hours to 72 hours",
                "Financial",
                "10 to 99",
            ]),
        ];
        RawTable { headers, rows }
    }

    #[test]
    fn accepts_valid_table() {
        assert!(validate_input(&sample_table()).is_ok());
    }

    #[test]
    fn rejects_empty_table() {
        let mut table = sample_table();
        table.rows.clear();
        let err = validate_input(&table).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_missing_required_column() {
        let mut table = sample_table();
        table.headers = StringRecord::from(vec![
            "BI Reference",
            "Quarter",
            "Time Taken to Report",
            "Data Type",
            "No. Data Subjects Affected",
        ]);
        let err = validate_input(&table).unwrap_err();
        assert!(err.to_string().contains("Year"));
    }

    #[test]
    fn rejects_unrecognized_delay_bucket() {
        let mut table = sample_table();
        table.rows.push(StringRecord::from(vec![
            "BI003",
            "2023",
            "Q2",
            "Within a month",
            "Personal",
            "Unknown",
        ]));
        let err = validate_input(&table).unwrap_err();
        assert!(err.to_string().contains("Within a month"));
    }

    #[test]
    fn tolerates_blank_delay_values() {
        let mut table = sample_table();
        table.rows.push(StringRecord::from(vec![
            "BI003",
            "2023",
            "Q2",
            "",
            "Personal",
            "Unknown",
        ]));
        assert!(validate_input(&table).is_ok());
    }

    #[test]
    fn trims_delay_values_before_matching() {
        let mut table = sample_table();
        table.rows.push(StringRecord::from(vec![
            "BI003",
            "2023",
            "Q2",
            "  More than 1 week ",
            "Personal",
            "1 to 9",
        ]));
        assert!(validate_input(&table).is_ok());
    }
}
