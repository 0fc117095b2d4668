use std::num::NonZeroUsize;

use chrono::NaiveDateTime;

use crate::error::{AnalysisError, ReportError};
use crate::processing::hourly::hourly_buckets;
use crate::processing::statistics::compute_statistics_with;
use crate::processing::thresholds::ThresholdPolicy;
use crate::report::model::{ReportModel, SensorInput, SensorReportEntry, SummaryRow};

/// Inputs to [`build_report`] that are not per-sensor data.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub prepared_by: String,
    pub generated_at: NaiveDateTime,
    pub configured_sensors: usize,
    pub policy: ThresholdPolicy,
}

/// Analyse every sensor and assemble the report model.
///
/// Sensors whose analysis fails are logged and left out. Fails with
/// [`ReportError::NoData`] only when no sensor survives.
pub fn build_report(inputs: Vec<SensorInput>, ctx: &ReportContext) -> Result<ReportModel, ReportError> {
    let entries: Vec<SensorReportEntry> = analyze_all(inputs, &ctx.policy)
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(sensor_id = id, error = %e, "Sensor skipped");
                None
            }
        })
        .collect();

    if entries.is_empty() {
        return Err(ReportError::NoData);
    }

    let summary = entries.iter().map(SummaryRow::from_entry).collect();

    Ok(ReportModel {
        title: ctx.title.clone(),
        prepared_by: ctx.prepared_by.clone(),
        generated_at: ctx.generated_at,
        configured_sensors: ctx.configured_sensors,
        summary,
        entries,
    })
}

/// Analyse one sensor.
pub fn analyze_sensor(
    input: SensorInput,
    policy: &ThresholdPolicy,
) -> Result<SensorReportEntry, AnalysisError> {
    let stats = compute_statistics_with(&input.series, policy)?;
    let hourly = hourly_buckets(&input.series);
    Ok(SensorReportEntry {
        id: input.id,
        name: input.name,
        stats,
        hourly,
        series: input.series,
    })
}

/// Analyse all sensors on scoped worker threads, one contiguous chunk per
/// worker. Results come back in input order.
fn analyze_all(
    inputs: Vec<SensorInput>,
    policy: &ThresholdPolicy,
) -> Vec<(u32, Result<SensorReportEntry, AnalysisError>)> {
    let workers = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(inputs.len().max(1));

    if workers <= 1 {
        return inputs
            .into_iter()
            .map(|input| (input.id, analyze_sensor(input, policy)))
            .collect();
    }

    let chunk_size = inputs.len().div_ceil(workers);
    let mut chunks: Vec<Vec<SensorInput>> = Vec::with_capacity(workers);
    let mut rest = inputs.into_iter().peekable();
    while rest.peek().is_some() {
        chunks.push(rest.by_ref().take(chunk_size).collect());
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .into_iter()
                        .map(|input| (input.id, analyze_sensor(input, policy)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(results) => results,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::thresholds::ThresholdBasis;
    use crate::report::model::Severity;
    use crate::state::series::{Reading, TimeSeries};
    use chrono::{Duration, NaiveDate};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn ctx(configured: usize) -> ReportContext {
        ReportContext {
            title: "Report".into(),
            prepared_by: "Ops".into(),
            generated_at: t0(),
            configured_sensors: configured,
            policy: ThresholdPolicy::default(),
        }
    }

    fn input(id: u32, values: &[f64]) -> SensorInput {
        SensorInput {
            id,
            name: format!("Sensor {id}"),
            series: values
                .iter()
                .enumerate()
                .map(|(i, v)| Reading::new(t0() + Duration::hours(i as i64 * 6), *v))
                .collect(),
        }
    }

    #[test]
    fn empty_sensors_are_skipped() {
        let inputs = vec![
            input(1, &[20.0, 21.0]),
            SensorInput { id: 2, name: "Dead".into(), series: TimeSeries::default() },
            input(3, &[19.0]),
        ];
        let model = build_report(inputs, &ctx(4)).unwrap();
        let ids: Vec<u32> = model.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(model.summary.len(), 2);
        assert_eq!(model.sensor_count(), 2);
        assert_eq!(model.footer(), "2 of 4 sensor(s)  |  Prepared by: Ops");
    }

    #[test]
    fn no_surviving_sensor_is_fatal() {
        let inputs = vec![SensorInput { id: 9, name: "x".into(), series: TimeSeries::default() }];
        assert!(matches!(build_report(inputs, &ctx(1)), Err(ReportError::NoData)));
        assert!(matches!(build_report(Vec::new(), &ctx(0)), Err(ReportError::NoData)));
    }

    #[test]
    fn order_is_preserved_across_workers() {
        let inputs: Vec<SensorInput> = (0..37).map(|id| input(id, &[20.0, 20.5, id as f64])).collect();
        let model = build_report(inputs, &ctx(37)).unwrap();
        let ids: Vec<u32> = model.summary.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn summary_carries_severity() {
        // Short history: conservative bands around mean 20.0, last reading 22.5.
        let model = build_report(vec![input(5, &[19.0, 18.5, 20.0, 22.5])], &ctx(1)).unwrap();
        let row = &model.summary[0];
        assert_eq!(row.label, "Sensor 5 (5)");
        assert_eq!(row.thresholds.basis, ThresholdBasis::Conservative);
        assert_eq!(row.current, 22.5);
        assert_eq!(row.current_severity, Severity::Warning);
    }

    #[test]
    fn entries_include_hourly_buckets() {
        let model = build_report(vec![input(1, &[10.0, 11.0, 12.0, 13.0, 14.0])], &ctx(1)).unwrap();
        let hours: Vec<u32> = model.entries[0].hourly.iter().map(|b| b.hour).collect();
        // 6-hour cadence from midnight wraps back to 00:00 on the fifth reading.
        assert_eq!(hours, vec![0, 6, 12, 18]);
        assert_eq!(model.entries[0].hourly[0].mean, 12.0);
    }
}
