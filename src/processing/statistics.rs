use serde::Serialize;

use crate::error::AnalysisError;
use crate::processing::thresholds::{ThresholdBand, ThresholdPolicy};
use crate::state::series::TimeSeries;

/// Categorical stability of a sensor, derived from its standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stability {
    VeryStable,
    Stable,
    Variable,
    HighlyVariable,
}

/// Ordered `(exclusive upper bound, label)` bands. The first band whose
/// bound exceeds the std dev wins; anything past the last bound is
/// `HighlyVariable`.
const STABILITY_BANDS: [(f64, Stability); 3] = [
    (1.0, Stability::VeryStable),
    (2.0, Stability::Stable),
    (3.0, Stability::Variable),
];

impl Stability {
    pub fn from_std_dev(std_dev: f64) -> Self {
        STABILITY_BANDS
            .iter()
            .find(|(bound, _)| std_dev < *bound)
            .map(|(_, label)| *label)
            .unwrap_or(Stability::HighlyVariable)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stability::VeryStable => "VERY STABLE",
            Stability::Stable => "STABLE",
            Stability::Variable => "VARIABLE",
            Stability::HighlyVariable => "HIGHLY VARIABLE",
        }
    }
}

/// Percentile values at ranks 1, 5, 25, 50, 75, 95 and 99.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    pub p01: f64,
    pub p05: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Percentiles {
    /// Compute from values already sorted ascending.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p01: percentile(sorted, 0.01),
            p05: percentile(sorted, 0.05),
            p25: percentile(sorted, 0.25),
            p50: percentile(sorted, 0.50),
            p75: percentile(sorted, 0.75),
            p95: percentile(sorted, 0.95),
            p99: percentile(sorted, 0.99),
        }
    }
}

/// Linear-interpolation percentile over values sorted ascending.
///
/// `rank = q * (n - 1)`, interpolating between the floor and ceil order
/// statistics. `q` is a fraction in `[0, 1]`. Returns NaN for an empty slice;
/// callers reject empty series before getting here.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Immutable summary of one sensor's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRecord {
    pub reading_count: usize,
    pub span_days: i64,
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Sample standard deviation (n - 1 denominator); 0.0 for one reading.
    pub std_dev: f64,
    pub stability: Stability,
    pub percentiles: Percentiles,
    pub thresholds: ThresholdBand,
}

/// Compute the statistics record using the default threshold policy.
pub fn compute_statistics(series: &TimeSeries) -> Result<StatisticsRecord, AnalysisError> {
    compute_statistics_with(series, &ThresholdPolicy::default())
}

pub fn compute_statistics_with(
    series: &TimeSeries,
    policy: &ThresholdPolicy,
) -> Result<StatisticsRecord, AnalysisError> {
    // TimeSeries sorts on construction; re-sort anyway if a caller built one
    // through deserialization with out-of-order readings.
    let resorted;
    let series = if series.is_sorted() {
        series
    } else {
        resorted = TimeSeries::new(series.readings().to_vec());
        &resorted
    };

    let (first, last) = match (series.first(), series.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(AnalysisError::EmptySeries),
    };

    let span_days = (last.timestamp - first.timestamp).num_days();
    let current = last.value;

    let mut vals = series.values();
    let count = vals.len();
    let mean = vals.iter().sum::<f64>() / count as f64;

    vals.sort_by(|a, b| a.total_cmp(b));
    let min = vals[0];
    let max = vals[count - 1];

    let std_dev = if count > 1 {
        let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    let percentiles = Percentiles::from_sorted(&vals);
    let thresholds = policy.derive(&vals, span_days, mean);

    Ok(StatisticsRecord {
        reading_count: count,
        span_days,
        current,
        mean,
        min,
        max,
        range: max - min,
        std_dev,
        stability: Stability::from_std_dev(std_dev),
        percentiles,
        thresholds,
    })
}
