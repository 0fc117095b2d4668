use serde::{Deserialize, Serialize};

use crate::processing::statistics::percentile;

/// Which derivation produced a sensor's bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBasis {
    /// Fixed offsets around the mean; used when history is short.
    Conservative,
    /// Tail percentiles of the observed distribution.
    Empirical,
}

impl ThresholdBasis {
    pub fn note(&self) -> &'static str {
        match self {
            ThresholdBasis::Conservative => "Conservative estimates (limited data)",
            ThresholdBasis::Empirical => "Based on statistical analysis",
        }
    }
}

/// Warning and error bands for one sensor.
///
/// Ordering `upper_error >= upper_warning >= lower_warning >= lower_error`
/// holds for both bases (config validation rejects a policy whose warning
/// offset exceeds its error offset), but the bands are not guaranteed to
/// straddle the mean for skewed or bimodal data. No reconciliation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBand {
    pub upper_error: f64,
    pub upper_warning: f64,
    pub lower_warning: f64,
    pub lower_error: f64,
    pub basis: ThresholdBasis,
}

/// Selects between conservative and empirical bands on history depth.
///
/// The switch is a hard step at `min_empirical_span_days`; downstream
/// alerting relies on the bands being reproducible, so there is no blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub min_empirical_span_days: i64,
    pub warning_offset: f64,
    pub error_offset: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            min_empirical_span_days: 7,
            warning_offset: 2.0,
            error_offset: 3.0,
        }
    }
}

impl ThresholdPolicy {
    /// Offsets must be finite, non-negative, and the warning offset must not
    /// exceed the error offset.
    pub fn check(&self) -> Result<(), String> {
        let offsets = [self.warning_offset, self.error_offset];
        if offsets.iter().any(|o| !o.is_finite() || *o < 0.0) {
            return Err("threshold offsets must be finite and non-negative".into());
        }
        if self.warning_offset > self.error_offset {
            return Err(format!(
                "warning_offset ({}) must not exceed error_offset ({})",
                self.warning_offset, self.error_offset
            ));
        }
        Ok(())
    }

    /// `sorted` must be the series values sorted ascending.
    pub fn derive(&self, sorted: &[f64], span_days: i64, mean: f64) -> ThresholdBand {
        if span_days < self.min_empirical_span_days {
            ThresholdBand {
                upper_error: mean + self.error_offset,
                upper_warning: mean + self.warning_offset,
                lower_warning: mean - self.warning_offset,
                lower_error: mean - self.error_offset,
                basis: ThresholdBasis::Conservative,
            }
        } else {
            ThresholdBand {
                upper_error: percentile(sorted, 0.99),
                upper_warning: percentile(sorted, 0.95),
                lower_warning: percentile(sorted, 0.05),
                lower_error: percentile(sorted, 0.01),
                basis: ThresholdBasis::Empirical,
            }
        }
    }
}

/// Derive bands with the default policy.
pub fn derive_thresholds(sorted: &[f64], span_days: i64, mean: f64) -> ThresholdBand {
    ThresholdPolicy::default().derive(sorted, span_days, mean)
}
