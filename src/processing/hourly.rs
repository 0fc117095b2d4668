use std::collections::BTreeMap;

use chrono::Timelike;
use serde::Serialize;

use crate::state::series::TimeSeries;

/// Aggregate of all readings sharing one hour-of-day across the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyBucket {
    /// 0..=23, taken from the reading's own wall-clock time.
    pub hour: u32,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Group readings by hour-of-day, collapsing the day dimension.
///
/// Hours with no readings are omitted rather than zero-filled. Output is
/// ascending by hour.
pub fn hourly_buckets(series: &TimeSeries) -> Vec<HourlyBucket> {
    let mut acc: BTreeMap<u32, (f64, usize, f64, f64)> = BTreeMap::new();

    for r in series.readings() {
        let entry = acc
            .entry(r.timestamp.hour())
            .or_insert((0.0, 0, f64::INFINITY, f64::NEG_INFINITY));
        entry.0 += r.value;
        entry.1 += 1;
        entry.2 = entry.2.min(r.value);
        entry.3 = entry.3.max(r.value);
    }

    acc.into_iter()
        .map(|(hour, (sum, count, min, max))| HourlyBucket {
            hour,
            count,
            mean: sum / count as f64,
            min,
            max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::series::Reading;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn same_hour_on_different_days_is_merged() {
        let series = TimeSeries::new(vec![
            Reading::new(at(1, 5, 0), 10.0),
            Reading::new(at(2, 5, 30), 20.0),
        ]);
        let buckets = hourly_buckets(&series);
        assert_eq!(buckets.len(), 1);
        let b = buckets[0];
        assert_eq!(b.hour, 5);
        assert_eq!(b.count, 2);
        assert_eq!(b.mean, 15.0);
        assert_eq!(b.min, 10.0);
        assert_eq!(b.max, 20.0);
    }

    #[test]
    fn missing_hours_are_absent() {
        let series = TimeSeries::new(vec![
            Reading::new(at(1, 23, 0), 18.0),
            Reading::new(at(1, 0, 10), 19.0),
            Reading::new(at(1, 12, 0), 22.0),
        ]);
        let hours: Vec<u32> = hourly_buckets(&series).iter().map(|b| b.hour).collect();
        assert_eq!(hours, vec![0, 12, 23]);
    }

    #[test]
    fn empty_series_has_no_buckets() {
        assert!(hourly_buckets(&TimeSeries::default()).is_empty());
    }
}
