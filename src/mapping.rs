/// Hours assigned to each reporting-delay bucket. Values outside this
/// set are rejected during validation; a blank bucket maps to `None`.
pub fn reporting_hours(bucket: &str) -> Option<f64> {
    match bucket {
        "Less than 24 hours" => Some(12.0),
        "24 hours to 72 hours" => Some(48.0),
        "72 hours to 1 week" => Some(160.0),
        "More than 1 week" => Some(192.0),
        _ => None,
    }
}

pub fn is_recognized_delay(bucket: &str) -> bool {
    reporting_hours(bucket).is_some()
}

fn subjects_range(bucket: &str) -> Option<(f64, f64)> {
    match bucket {
        "1 to 9" => Some((1.0, 9.0)),
        "10 to 99" => Some((10.0, 99.0)),
        "100 to 1k" => Some((100.0, 1_000.0)),
        "1k to 10k" => Some((1_000.0, 10_000.0)),
        "10k to 100k" => Some((10_000.0, 100_000.0)),
        "100k and above" => Some((100_000.0, 1_000_000.0)),
        // "Unknown" and anything unrecognized carry no number.
        _ => None,
    }
}

/// Midpoint of the affected-subjects bucket, `None` for the `Unknown`
/// sentinel and unrecognized labels.
pub fn subjects_midpoint(bucket: &str) -> Option<f64> {
    subjects_range(bucket).map(|(low, high)| (low + high) / 2.0)
}
