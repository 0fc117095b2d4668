use std::path::Path;

use crate::error::ParseError;

/// Rows scanned when looking for the header.
pub const HEADER_SCAN_ROWS: usize = 50;

/// Result of loading a PRTG export: column names and column data as strings
pub struct LoadedData {
    pub columns: Vec<String>,
    pub column_data: Vec<Vec<String>>,  // column-major: column_data[col_idx][row_idx]
    pub row_count: usize,
}

impl LoadedData {
    /// Index of the first column whose trimmed name matches `name`, ignoring case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    pub fn column(&self, idx: usize) -> Option<&[String]> {
        self.column_data.get(idx).map(|c| c.as_slice())
    }
}

/// Load a CSV or Excel export from disk.
pub fn load_file(path: &Path) -> Result<LoadedData, ParseError> {
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let content = std::fs::read(path).map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            load_csv_bytes(&content)
        }
        "xls" | "xlsx" => load_excel(path),
        _ => Err(ParseError::UnsupportedFormat(ext)),
    }
}

/// Load CSV text as returned by `historicdata.csv`.
pub fn load_csv_text(text: &str) -> Result<LoadedData, ParseError> {
    load_csv_bytes(text.as_bytes())
}

fn load_csv_bytes(content: &[u8]) -> Result<LoadedData, ParseError> {
    // PRTG exports are UTF-8 with a BOM on some versions and latin1 on others.
    let text = match std::str::from_utf8(content) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(_) => content.iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                all_rows.push(record.iter().map(|s| s.to_string()).collect());
            }
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable CSV record");
                continue;
            }
        }
    }

    to_columns(all_rows)
}

fn load_excel(path: &Path) -> Result<LoadedData, ParseError> {
    use calamine::{open_workbook_auto, Reader, Data};

    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook.sheet_names().first()
        .cloned()
        .ok_or(ParseError::NoData)?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let all_rows: Vec<Vec<String>> = range.rows().map(|row| {
        row.iter().map(|cell| {
            match cell {
                Data::Empty => String::new(),
                Data::String(s) => s.clone(),
                Data::Float(f) => f.to_string(),
                Data::Int(i) => i.to_string(),
                Data::Bool(b) => b.to_string(),
                Data::DateTime(dt) => dt
                    .as_datetime()
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| dt.to_string()),
                Data::DateTimeIso(s) => s.clone(),
                Data::DurationIso(s) => s.clone(),
                Data::Error(e) => format!("{e:?}"),
            }
        }).collect()
    }).collect();

    to_columns(all_rows)
}

/// Index of the header row: the first row within the scan window that has a
/// `Date Time` cell.
pub fn detect_header_row(rows: &[Vec<String>], max_rows: usize) -> Option<usize> {
    rows.iter()
        .take(max_rows)
        .position(|row| row.iter().any(|c| c.trim().eq_ignore_ascii_case("date time")))
}

fn to_columns(all_rows: Vec<Vec<String>>) -> Result<LoadedData, ParseError> {
    if all_rows.is_empty() {
        return Err(ParseError::NoData);
    }

    let header_row = detect_header_row(&all_rows, HEADER_SCAN_ROWS)
        .ok_or(ParseError::NoHeader(HEADER_SCAN_ROWS))?;

    let columns: Vec<String> = all_rows[header_row].iter()
        .map(|s| s.trim().to_string())
        .collect();

    // Data starts after header row
    let data_rows = &all_rows[header_row + 1..];
    let num_cols = columns.len();

    // Convert to column-major format
    let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(data_rows.len()); num_cols];
    let row_count = data_rows.len();

    for row in data_rows {
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            col_data.push(row.get(col_idx).cloned().unwrap_or_default());
        }
    }

    Ok(LoadedData { columns, column_data, row_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\u{feff}Date Time,Date Time(RAW),Temperature,Temperature(RAW),Coverage\n\
01.03.2026 00:00:00 - 01.03.2026 00:05:00,46082.0,21.4 °C,21.4,100 %\n\
01.03.2026 00:05:00 - 01.03.2026 00:10:00,46082.0035,21.6 °C,21.6\n\
Sums (of which 2 in range),,,,\n";

    #[test]
    fn csv_is_loaded_column_major() {
        let data = load_csv_text(EXPORT).unwrap();
        assert_eq!(data.columns[0], "Date Time");
        assert_eq!(data.row_count, 3);
        assert_eq!(data.column_index("temperature"), Some(2));
        let temps = data.column(2).unwrap();
        assert_eq!(temps[0], "21.4 °C");
        // Short rows are padded with empty cells.
        assert_eq!(data.column(4).unwrap()[1], "");
    }

    #[test]
    fn preamble_rows_before_header_are_skipped() {
        let text = format!("Sensor export\nGenerated by PRTG\n{}", EXPORT.trim_start_matches('\u{feff}'));
        let data = load_csv_text(&text).unwrap();
        assert_eq!(data.columns[0], "Date Time");
        assert_eq!(data.row_count, 3);
    }

    #[test]
    fn missing_header_is_an_error() {
        let err = load_csv_text("a,b\n1,2\n").err().unwrap();
        assert!(matches!(err, ParseError::NoHeader(_)));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(load_csv_text("").err().unwrap(), ParseError::NoData));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("export.json")).err().unwrap();
        assert!(matches!(err, ParseError::UnsupportedFormat(ext) if ext == "json"));
    }
}
