use chrono::NaiveDateTime;
use serde::Serialize;

use crate::processing::hourly::HourlyBucket;
use crate::processing::statistics::{Stability, StatisticsRecord};
use crate::processing::thresholds::ThresholdBand;
use crate::state::series::TimeSeries;

/// Classification of the latest reading against the sensor's bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Error bands are checked before warning bands; both bounds inclusive.
    pub fn classify(current: f64, t: &ThresholdBand) -> Self {
        if current >= t.upper_error || current <= t.lower_error {
            Severity::Critical
        } else if current >= t.upper_warning || current <= t.lower_warning {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "NORMAL",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// One sensor handed to the builder.
#[derive(Debug, Clone)]
pub struct SensorInput {
    pub id: u32,
    pub name: String,
    pub series: TimeSeries,
}

/// Everything the renderer needs about one sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReportEntry {
    pub id: u32,
    pub name: String,
    pub stats: StatisticsRecord,
    pub hourly: Vec<HourlyBucket>,
    /// Full series for the archival sheets.
    pub series: TimeSeries,
}

impl SensorReportEntry {
    /// `"Server Room (2051)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// One row of the summary table.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub id: u32,
    pub label: String,
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub std_dev: f64,
    pub stability: Stability,
    pub thresholds: ThresholdBand,
    pub current_severity: Severity,
}

impl SummaryRow {
    pub fn from_entry(entry: &SensorReportEntry) -> Self {
        let s = &entry.stats;
        Self {
            id: entry.id,
            label: entry.label(),
            current: s.current,
            mean: s.mean,
            min: s.min,
            max: s.max,
            range: s.range,
            std_dev: s.std_dev,
            stability: s.stability,
            thresholds: s.thresholds,
            current_severity: Severity::classify(s.current, &s.thresholds),
        }
    }
}

/// Renderer-agnostic report: no colours, fonts or layout.
#[derive(Debug, Clone, Serialize)]
pub struct ReportModel {
    pub title: String,
    pub prepared_by: String,
    pub generated_at: NaiveDateTime,
    /// Sensors listed in the configuration, including ones that failed.
    pub configured_sensors: usize,
    pub summary: Vec<SummaryRow>,
    pub entries: Vec<SensorReportEntry>,
}

impl ReportModel {
    /// Sensors actually represented in the report.
    pub fn sensor_count(&self) -> usize {
        self.entries.len()
    }

    pub fn footer(&self) -> String {
        format!(
            "{} of {} sensor(s)  |  Prepared by: {}",
            self.sensor_count(),
            self.configured_sensors,
            self.prepared_by
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::thresholds::ThresholdBasis;

    fn band() -> ThresholdBand {
        ThresholdBand {
            upper_error: 25.0,
            upper_warning: 23.0,
            lower_warning: 15.0,
            lower_error: 13.0,
            basis: ThresholdBasis::Empirical,
        }
    }

    #[test]
    fn severity_classification() {
        let t = band();
        assert_eq!(Severity::classify(26.0, &t), Severity::Critical);
        assert_eq!(Severity::classify(24.0, &t), Severity::Warning);
        assert_eq!(Severity::classify(20.0, &t), Severity::Normal);
        assert_eq!(Severity::classify(14.0, &t), Severity::Warning);
        assert_eq!(Severity::classify(12.0, &t), Severity::Critical);
    }

    #[test]
    fn severity_bounds_are_inclusive() {
        let t = band();
        assert_eq!(Severity::classify(25.0, &t), Severity::Critical);
        assert_eq!(Severity::classify(23.0, &t), Severity::Warning);
        assert_eq!(Severity::classify(15.0, &t), Severity::Warning);
        assert_eq!(Severity::classify(13.0, &t), Severity::Critical);
    }

    #[test]
    fn severity_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(
            serde_json::to_string(&Stability::HighlyVariable).unwrap(),
            "\"HIGHLY_VARIABLE\""
        );
    }
}
