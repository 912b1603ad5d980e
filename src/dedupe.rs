use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use crate::io;
use crate::models::{cell, DedupeSummary, RawTable};

/// Collapses the table to one row per raw incident reference, keeping
/// the earliest report (by year, then quarter number) and writing the
/// result sorted by reference.
pub fn dedupe(input: &Path, output: &Path) -> anyhow::Result<DedupeSummary> {
    info!("reading input file: {}", input.display());
    let table = io::read_table(input)?;
    let deduped = keep_first_reports(&table)?;

    info!("writing deduplicated data to: {}", output.display());
    io::write_table(output, &deduped)?;

    Ok(DedupeSummary {
        original_rows: table.rows.len(),
        unique_rows: deduped.rows.len(),
        removed: table.rows.len() - deduped.rows.len(),
    })
}

pub fn keep_first_reports(table: &RawTable) -> anyhow::Result<RawTable> {
    let bi = table
        .column_index("BI Reference")
        .context("missing 'BI Reference' column")?;
    let year = table.column_index("Year").context("missing 'Year' column")?;
    let quarter = table
        .column_index("Quarter")
        .context("missing 'Quarter' column")?;

    let mut keys: Vec<(String, i32, u32)> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let year_value = cell(row, year);
        let year_num: i32 = year_value
            .parse()
            .with_context(|| format!("unparseable Year value '{year_value}'"))?;
        let quarter_num = quarter_number(cell(row, quarter))?;
        keys.push((
            row.get(bi).unwrap_or("").to_string(),
            year_num,
            quarter_num,
        ));
    }

    let mut order: Vec<usize> = (0..table.rows.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();
    for i in order {
        if seen.insert(keys[i].0.as_str()) {
            rows.push(table.rows[i].clone());
        }
    }

    Ok(RawTable {
        headers: table.headers.clone(),
        rows,
    })
}

fn quarter_number(quarter: &str) -> anyhow::Result<u32> {
    let digits: String = quarter.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("no quarter number in '{quarter}'");
    }
    digits
        .parse()
        .with_context(|| format!("unparseable Quarter value '{quarter}'"))
}
