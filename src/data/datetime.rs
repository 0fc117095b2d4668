use chrono::{NaiveDate, NaiveDateTime};

/// PRTG's native export format, e.g. `16.10.2026 13:05:00`.
pub const PRTG_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Fallback formats for exports produced with other locale settings or
/// re-saved through a spreadsheet application.
pub const DATE_FORMATS: &[&str] = &[
    PRTG_FORMAT,
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d",
    "%d.%m.%Y",
];

/// Strip PRTG's interval notation: `"01.02.2026 10:00:00 - 01.02.2026 10:05:00"`
/// becomes the interval start.
pub fn interval_start(cell: &str) -> &str {
    cell.split(" - ").next().unwrap_or(cell).trim()
}

/// Detect the most likely date format from a sample of cells.
/// Returns the format with the highest parse success rate, preferring
/// earlier entries of [`DATE_FORMATS`] on ties.
pub fn detect_date_format<'a, I>(values: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let sample: Vec<&str> = values
        .into_iter()
        .map(interval_start)
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let mut best_format: Option<&'static str> = None;
    let mut best_score = 0usize;

    for &fmt in DATE_FORMATS {
        let valid = sample.iter().filter(|s| parse_with(s, fmt).is_some()).count();
        if valid > best_score {
            best_score = valid;
            best_format = Some(fmt);
        }
    }

    best_format
}

/// Parse a single cell with the given format, accepting date-only formats as
/// midnight.
pub fn parse_with(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        Some(dt)
    } else if let Ok(d) = NaiveDate::parse_from_str(value, format) {
        d.and_hms_opt(0, 0, 0)
    } else {
        None
    }
}

/// Parse a PRTG `Date Time` cell, trying the PRTG format first and then
/// `fallback` (usually the format detected over the whole column).
pub fn parse_cell(cell: &str, fallback: Option<&str>) -> Option<NaiveDateTime> {
    let value = interval_start(cell);
    parse_with(value, PRTG_FORMAT).or_else(|| fallback.and_then(|fmt| parse_with(value, fmt)))
}

/// Format a timestamp for display in the report.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
