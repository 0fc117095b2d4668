use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One (timestamp, temperature) observation.
///
/// Timestamps are wall-clock values exactly as the source reported them;
/// no timezone conversion is performed anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered readings for a single sensor over the analysis window.
///
/// Construction sorts by timestamp (stable, so equal timestamps keep their
/// source order). The series may be empty; the statistics engine rejects
/// that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    readings: Vec<Reading>,
}

impl TimeSeries {
    pub fn new(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    pub fn is_sorted(&self) -> bool {
        self.readings.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}

impl FromIterator<Reading> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
