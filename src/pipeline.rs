use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::{check, io, severity, validate};

#[derive(Debug, Clone, Copy)]
pub struct PrepareSummary {
    pub rows: usize,
    pub incidents: usize,
    pub inconsistencies: usize,
}

/// Runs the full preparation pass: read, validate, derive, write, verify.
/// All-or-nothing: any validation or I/O error aborts before the output
/// file is written.
pub fn prepare(input: &Path, output: &Path) -> anyhow::Result<PrepareSummary> {
    info!("reading input file: {}", input.display());
    let table = io::read_table(input)?;

    let columns = validate::validate_input(&table)
        .with_context(|| format!("validation failed for {}", input.display()))?;

    info!("deriving reporting hours, subject numbers, and severity scores");
    let derived = severity::enrich(&table, &columns);

    info!("writing enhanced data to: {}", output.display());
    io::write_enriched(output, &table, &derived)?;

    let findings = check::check_consistency(&derived);
    if findings.is_empty() {
        info!("all incident ids carry consistent derived values");
    } else {
        for finding in &findings {
            warn!(
                "inconsistent derived values for {}: {}",
                finding.incident_id,
                finding.columns.join(", ")
            );
        }
    }

    let incidents = derived
        .iter()
        .map(|d| d.incident_id.as_str())
        .collect::<HashSet<&str>>()
        .len();

    Ok(PrepareSummary {
        rows: table.rows.len(),
        incidents,
        inconsistencies: findings.len(),
    })
}
