use csv::StringRecord;

/// Columns that must be present in every incident export.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "BI Reference",
    "Year",
    "Quarter",
    "Time Taken to Report",
    "Data Type",
    "No. Data Subjects Affected",
];

/// A CSV table held wholesale in memory. Only the required columns are
/// interpreted; everything else passes through to the output untouched.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// Resolved indexes of the required columns.
#[derive(Debug, Clone, Copy)]
pub struct RequiredColumns {
    pub bi_reference: usize,
    pub year: usize,
    pub quarter: usize,
    pub time_taken: usize,
    pub data_type: usize,
    pub subjects_affected: usize,
}

impl RequiredColumns {
    /// Resolves all required columns, or returns the names that are absent.
    pub fn resolve(table: &RawTable) -> Result<Self, Vec<&'static str>> {
        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| table.column_index(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let index = |name| table.column_index(name).unwrap_or_default();
        Ok(Self {
            bi_reference: index("BI Reference"),
            year: index("Year"),
            quarter: index("Quarter"),
            time_taken: index("Time Taken to Report"),
            data_type: index("Data Type"),
            subjects_affected: index("No. Data Subjects Affected"),
        })
    }
}

/// Returns a cell trimmed of surrounding whitespace; out-of-range or
/// missing cells read as empty.
pub fn cell<'a>(row: &'a StringRecord, index: usize) -> &'a str {
    row.get(index).unwrap_or("").trim()
}

/// Derived values appended to one output row. Every row of a multi-row
/// incident carries identical values here; the rows differ only in the
/// source data-type label, which is already collapsed into the count.
#[derive(Debug, Clone)]
pub struct Derived {
    pub reporting_time_hrs: Option<f64>,
    pub incident_id: String,
    pub subjects_num: Option<f64>,
    pub data_types_per_incident: usize,
    pub subjects_norm: Option<f64>,
    pub reporting_time_norm: Option<f64>,
    pub data_types_norm: Option<f64>,
    pub severity_score: u8,
}

/// An incident whose rows disagree on one or more derived columns.
#[derive(Debug, Clone)]
pub struct Inconsistency {
    pub incident_id: String,
    pub columns: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct DedupeSummary {
    pub original_rows: usize,
    pub unique_rows: usize,
    pub removed: usize,
}
