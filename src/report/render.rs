use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Color, Workbook, Worksheet, XlsxError};

use crate::data::datetime::format_timestamp;
use crate::report::model::{ReportModel, SensorReportEntry};
use crate::report::style::{self, Styles};
use crate::state::theme::Palette;
use crate::error::ReportError;

pub const SUMMARY_SHEET: &str = "Summary";

const SUMMARY_HEADERS: [&str; 12] = [
    "Sensor", "Current", "Avg", "Min", "Max", "Range", "Std Dev", "Stability",
    "Upper Err", "Upper Warn", "Lower Warn", "Lower Err",
];
const SUMMARY_WIDTHS: [f64; 12] = [22.0, 12.0, 10.0, 10.0, 10.0, 10.0, 10.0, 14.0, 12.0, 12.0, 12.0, 12.0];
const SUMMARY_FIRST_ROW: u32 = 4;

const MAX_SHEET_NAME: usize = 31;

/// Render the model and save it to `path`.
pub fn render_workbook(model: &ReportModel, palette: &Palette, path: &Path) -> Result<(), ReportError> {
    let mut workbook = build_workbook(model, palette)?;
    workbook.save(path)?;
    tracing::info!(path = %path.display(), sheets = 1 + 2 * model.entries.len(), "Workbook saved");
    Ok(())
}

/// Build the three sheet families: summary, one stats sheet per sensor, one
/// raw-data sheet per sensor.
pub fn build_workbook(model: &ReportModel, palette: &Palette) -> Result<Workbook, ReportError> {
    let styles = Styles::new(palette);
    let mut names = SheetNames::default();
    let mut workbook = Workbook::new();

    let mut ws = Worksheet::new();
    ws.set_name(names.claim(SUMMARY_SHEET))?;
    ws.set_tab_color(Color::RGB(palette.accent.0));
    write_summary_sheet(&mut ws, model, &styles)?;
    workbook.push_worksheet(ws);

    for entry in &model.entries {
        let mut ws = Worksheet::new();
        ws.set_name(names.claim(&format!("Stats - {}", truncate(&entry.name, 22))))?;
        ws.set_tab_color(Color::RGB(palette.blue.0));
        write_detail_sheet(&mut ws, entry, &styles)?;
        workbook.push_worksheet(ws);
    }

    for entry in &model.entries {
        let mut ws = Worksheet::new();
        ws.set_name(names.claim(&format!("{} ({})", truncate(&entry.name, 20), entry.id)))?;
        ws.set_tab_color(Color::RGB(palette.bg_header.0));
        write_raw_sheet(&mut ws, entry, &styles)?;
        workbook.push_worksheet(ws);
    }

    Ok(workbook)
}

fn fill_background(ws: &mut Worksheet, rows: u32, cols: u16, styles: &Styles) -> Result<(), XlsxError> {
    for row in 0..rows {
        for col in 0..cols {
            ws.write_blank(row, col, &styles.dark_fill)?;
        }
    }
    Ok(())
}

fn write_summary_sheet(ws: &mut Worksheet, model: &ReportModel, styles: &Styles) -> Result<(), XlsxError> {
    let p = styles.palette();
    let last_col = (SUMMARY_HEADERS.len() - 1) as u16;
    let footer_row = SUMMARY_FIRST_ROW + model.summary.len() as u32 + 1;

    fill_background(ws, (footer_row + 1).max(50), 20, styles)?;
    for (i, w) in SUMMARY_WIDTHS.iter().enumerate() {
        ws.set_column_width(i as u16, *w)?;
    }

    ws.merge_range(0, 0, 0, last_col, &model.title, &styles.headline())?;
    ws.merge_range(
        1, 0, 1, last_col,
        &model.generated_at.format("%B %d, %Y  %H:%M").to_string(),
        &styles.subtitle,
    )?;

    for (col, h) in SUMMARY_HEADERS.iter().enumerate() {
        ws.write_string_with_format(SUMMARY_FIRST_ROW - 1, col as u16, *h, &styles.header)?;
    }

    for (i, row) in model.summary.iter().enumerate() {
        let r = SUMMARY_FIRST_ROW + i as u32;
        let fill = styles.stripe(i);
        let num = |fg, bold, fmt: &str| styles.cell(fg, fill, bold, true).set_num_format(fmt);
        let t = &row.thresholds;

        ws.write_string_with_format(r, 0, &row.label, &styles.cell(p.white, fill, true, false))?;
        ws.write_number_with_format(r, 1, row.current, &num(p.severity(row.current_severity), true, "0.0"))?;
        ws.write_number_with_format(r, 2, row.mean, &num(p.white, false, "0.0"))?;
        ws.write_number_with_format(r, 3, row.min, &num(p.white, false, "0.0"))?;
        ws.write_number_with_format(r, 4, row.max, &num(p.white, false, "0.0"))?;
        ws.write_number_with_format(r, 5, row.range, &num(p.white, false, "0.0"))?;
        ws.write_number_with_format(r, 6, row.std_dev, &num(p.white, false, "0.00"))?;
        ws.write_string_with_format(
            r, 7, row.stability.label(),
            &styles.cell(p.stability(row.stability), fill, true, true),
        )?;
        ws.write_number_with_format(r, 8, t.upper_error, &num(p.red, false, "0.0"))?;
        ws.write_number_with_format(r, 9, t.upper_warning, &num(p.orange, false, "0.0"))?;
        ws.write_number_with_format(r, 10, t.lower_warning, &num(p.orange, false, "0.0"))?;
        ws.write_number_with_format(r, 11, t.lower_error, &num(p.red, false, "0.0"))?;
    }

    ws.merge_range(footer_row, 0, footer_row, last_col, &model.footer(), &styles.footer)?;
    Ok(())
}

/// Value column content of a detail row.
enum Detail<'a> {
    Temp(f64, &'static str),
    Text(&'a str),
}

fn write_detail_sheet(ws: &mut Worksheet, entry: &SensorReportEntry, styles: &Styles) -> Result<(), XlsxError> {
    let p = styles.palette();
    let s = &entry.stats;

    let rows_needed = 30 + entry.hourly.len() as u32;
    fill_background(ws, rows_needed.max(80), 7, styles)?;
    ws.set_column_width(0, 25)?;
    ws.set_column_width(1, 15)?;
    for col in 2..7 {
        ws.set_column_width(col, 14)?;
    }

    ws.merge_range(0, 0, 0, 3, &format!("{} (Sensor {})", entry.name, entry.id), &styles.title)?;
    ws.write_string_with_format(
        1, 0,
        format!("{} days  |  {} readings", s.span_days, s.reading_count),
        &styles.subtitle,
    )?;

    let t = &s.thresholds;
    let pct = s.percentiles;
    let stat_rows: Vec<(&str, Option<Detail>)> = vec![
        ("Current Temperature", Some(Detail::Temp(s.current, style::TEMP_2DP))),
        ("Average", Some(Detail::Temp(s.mean, style::TEMP_2DP))),
        ("Minimum", Some(Detail::Temp(s.min, style::TEMP_2DP))),
        ("Maximum", Some(Detail::Temp(s.max, style::TEMP_2DP))),
        ("Range", Some(Detail::Temp(s.range, style::TEMP_2DP))),
        ("Standard Deviation", Some(Detail::Temp(s.std_dev, style::TEMP_2DP))),
        ("Stability", Some(Detail::Text(s.stability.label()))),
        ("", None),
        ("PERCENTILES", None),
        ("1st percentile", Some(Detail::Temp(pct.p01, style::TEMP_2DP))),
        ("5th percentile", Some(Detail::Temp(pct.p05, style::TEMP_2DP))),
        ("25th percentile", Some(Detail::Temp(pct.p25, style::TEMP_2DP))),
        ("50th percentile (median)", Some(Detail::Temp(pct.p50, style::TEMP_2DP))),
        ("75th percentile", Some(Detail::Temp(pct.p75, style::TEMP_2DP))),
        ("95th percentile", Some(Detail::Temp(pct.p95, style::TEMP_2DP))),
        ("99th percentile", Some(Detail::Temp(pct.p99, style::TEMP_2DP))),
        ("", None),
        ("THRESHOLDS", None),
        ("Upper Error", Some(Detail::Temp(t.upper_error, style::TEMP_1DP))),
        ("Upper Warning", Some(Detail::Temp(t.upper_warning, style::TEMP_1DP))),
        ("Lower Warning", Some(Detail::Temp(t.lower_warning, style::TEMP_1DP))),
        ("Lower Error", Some(Detail::Temp(t.lower_error, style::TEMP_1DP))),
        ("", None),
        ("Note", Some(Detail::Text(t.basis.note()))),
    ];

    let mut row: u32 = 3;
    for (label, value) in &stat_rows {
        match value {
            None if label.is_empty() => {}
            None => {
                ws.write_string_with_format(row, 0, *label, &styles.section)?;
            }
            Some(value) => {
                let card = p.bg_card;
                let value_fg = match *label {
                    "Stability" => p.stability(s.stability),
                    l if l.contains("Error") => p.red,
                    l if l.contains("Warning") => p.orange,
                    _ => p.white,
                };
                let value_fmt = styles.cell(value_fg, card, *label == "Stability", true);
                ws.write_string_with_format(row, 0, *label, &styles.data(card, false))?;
                match value {
                    Detail::Temp(v, fmt) => {
                        ws.write_number_with_format(row, 1, *v, &value_fmt.set_num_format(*fmt))?;
                    }
                    Detail::Text(text) => {
                        ws.write_string_with_format(row, 1, *text, &value_fmt)?;
                    }
                }
            }
        }
        row += 1;
    }

    row += 1;
    ws.write_string_with_format(row, 0, "HOURLY AVERAGES", &styles.section)?;
    row += 1;
    for (col, h) in ["Hour", "Avg", "Min", "Max"].iter().enumerate() {
        ws.write_string_with_format(row, col as u16, *h, &styles.header)?;
    }
    row += 1;

    for bucket in &entry.hourly {
        let fill = styles.stripe(bucket.hour as usize);
        let num = styles.data(fill, true).set_num_format("0.0");
        ws.write_string_with_format(row, 0, format!("{:02}:00", bucket.hour), &styles.data(fill, true))?;
        ws.write_number_with_format(row, 1, bucket.mean, &num)?;
        ws.write_number_with_format(row, 2, bucket.min, &num)?;
        ws.write_number_with_format(row, 3, bucket.max, &num)?;
        row += 1;
    }

    Ok(())
}

fn write_raw_sheet(ws: &mut Worksheet, entry: &SensorReportEntry, styles: &Styles) -> Result<(), XlsxError> {
    ws.merge_range(0, 0, 0, 1, &format!("{} - Raw Data", entry.name), &styles.title)?;
    ws.write_string_with_format(1, 0, "DateTime", &styles.header)?;
    ws.write_string_with_format(1, 1, "Temperature", &styles.header)?;
    ws.set_column_width(0, 22)?;
    ws.set_column_width(1, 14)?;

    for (i, reading) in entry.series.readings().iter().enumerate() {
        let row = 2 + i as u32;
        let fill = styles.stripe(row as usize);
        let ts_fmt = styles.data(fill, true).set_num_format(style::DATETIME);
        ws.write_datetime_with_format(row, 0, &reading.timestamp, &ts_fmt)?;
        ws.write_number_with_format(row, 1, reading.value, &styles.data(fill, true))?;
    }

    tracing::debug!(
        sensor_id = entry.id,
        rows = entry.series.len(),
        first = entry.series.first().map(|r| format_timestamp(&r.timestamp)).unwrap_or_default(),
        "Raw sheet written",
    );
    Ok(())
}

/// Hands out valid, unique Excel sheet names.
#[derive(Default)]
struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    fn claim(&mut self, wanted: &str) -> String {
        let base = sanitize_sheet_name(wanted);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({n})");
            candidate = format!("{}{}", truncate(&base, MAX_SHEET_NAME - suffix.len()), suffix);
            n += 1;
        }
        self.used.insert(candidate.to_lowercase());
        candidate
    }
}

/// Replace characters Excel forbids in sheet names and clamp to 31 chars.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let trimmed = cleaned.trim().trim_matches('\'');
    let out = truncate(trimmed, MAX_SHEET_NAME).trim_end().to_string();
    if out.is_empty() {
        "Sheet".to_string()
    } else {
        out
    }
}

/// First `max` characters of `s` (char-aware).
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
