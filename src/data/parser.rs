use crate::data::columns::{find_temperature_column, TemperatureUnit};
use crate::data::datetime::{detect_date_format, parse_cell};
use crate::data::loader::LoadedData;
use crate::error::ParseError;
use crate::state::series::{Reading, TimeSeries};

/// Turn a loaded PRTG export into a clean, sorted time series.
///
/// Summary rows (date cell not starting with a digit), unparseable dates and
/// non-numeric values are dropped. The result may be empty.
pub fn normalize(data: &LoadedData) -> Result<TimeSeries, ParseError> {
    let date_idx = data
        .column_index("date time")
        .ok_or(ParseError::NoHeader(crate::data::loader::HEADER_SCAN_ROWS))?;
    let temp_idx = find_temperature_column(&data.columns)
        .ok_or_else(|| ParseError::NoTemperatureColumn(data.columns.join(", ")))?;

    let column_name = &data.columns[temp_idx];
    let unit = TemperatureUnit::infer(column_name);
    tracing::debug!(column = %column_name, ?unit, "Temperature column selected");

    let dates = data.column(date_idx).unwrap_or_default();
    let temps = data.column(temp_idx).unwrap_or_default();

    let data_rows = || {
        dates
            .iter()
            .zip(temps.iter())
            .filter(|(d, _)| d.trim_start().starts_with(|c: char| c.is_ascii_digit()))
    };

    let fallback = detect_date_format(data_rows().map(|(d, _)| d.as_str()));

    let mut readings = Vec::with_capacity(data.row_count);
    let mut dropped = 0usize;
    for (date, temp) in data_rows() {
        let parsed = parse_cell(date, fallback).zip(clean_value(temp));
        match parsed {
            Some((timestamp, value)) => {
                readings.push(Reading::new(timestamp, unit.to_celsius(value)))
            }
            None => dropped += 1,
        }
    }

    tracing::debug!(
        kept = readings.len(),
        dropped,
        summary_rows = data.row_count - readings.len() - dropped,
        "Export normalized",
    );

    Ok(TimeSeries::new(readings))
}

/// Strip unit suffixes such as ` °C` and parse. Only digits, `.` and `-`
/// survive.
pub fn clean_value(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
