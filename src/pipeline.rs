//! One report run: collect every configured sensor, analyse, render.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::data::parser;
use crate::error::{ReportError, SourceError};
use crate::report::builder::{build_report, ReportContext};
use crate::report::json::export_json;
use crate::report::model::{ReportModel, SensorInput};
use crate::report::render::render_workbook;
use crate::source::SensorSource;
use crate::state::config::{Config, SensorEntry};
use crate::state::series::TimeSeries;

/// Files produced by a successful run.
#[derive(Debug)]
pub struct RunOutput {
    pub workbook: PathBuf,
    pub json: Option<PathBuf>,
    pub sensors: usize,
    pub configured: usize,
}

/// Fetch and normalize one sensor.
fn collect_sensor(source: &dyn SensorSource, sensor: &SensorEntry) -> Result<TimeSeries, SourceError> {
    let data = source.fetch(sensor.id)?;
    Ok(parser::normalize(&data)?)
}

/// Gather inputs for every configured sensor, dropping sensors whose
/// retrieval or parsing fails. Empty series are kept; the builder skips them.
pub fn collect_inputs(source: &dyn SensorSource, config: &Config) -> Vec<SensorInput> {
    config
        .sensors
        .iter()
        .filter_map(|sensor| match collect_sensor(source, sensor) {
            Ok(series) => {
                if series.is_empty() {
                    tracing::warn!(sensor_id = sensor.id, name = %sensor.name, "No valid data");
                } else {
                    tracing::info!(sensor_id = sensor.id, readings = series.len(), "Valid readings");
                }
                Some(SensorInput {
                    id: sensor.id,
                    name: sensor.name.clone(),
                    series,
                })
            }
            Err(e) => {
                tracing::warn!(sensor_id = sensor.id, name = %sensor.name, error = %e, "Sensor unavailable");
                None
            }
        })
        .collect()
}

/// Build the model for the configured sensors.
pub fn build(source: &dyn SensorSource, config: &Config, now: NaiveDateTime) -> Result<ReportModel, ReportError> {
    let inputs = collect_inputs(source, config);
    let ctx = ReportContext {
        title: config.report.title.clone(),
        prepared_by: config.report.prepared_by.clone(),
        generated_at: now,
        configured_sensors: config.sensors.len(),
        policy: config.thresholds.clone(),
    };
    let model = build_report(inputs, &ctx)?;

    for row in &model.summary {
        tracing::info!(
            sensor = %row.label,
            "Current: {:.1}\u{00B0}C  |  Avg: {:.1}\u{00B0}C  |  Range: {:.1}-{:.1}\u{00B0}C  |  {}",
            row.current, row.mean, row.min, row.max, row.stability.label(),
        );
    }
    Ok(model)
}

/// Full run: build the model and write `sensor_report_<stamp>.xlsx` (plus
/// the JSON dump when enabled) into the output directory.
pub fn run(source: &dyn SensorSource, config: &Config) -> Result<RunOutput, ReportError> {
    run_at(source, config, Local::now().naive_local())
}

pub fn run_at(source: &dyn SensorSource, config: &Config, now: NaiveDateTime) -> Result<RunOutput, ReportError> {
    let model = build(source, config, now)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| ReportError::Io {
        path: config.output_dir.clone(),
        source,
    })?;

    let stem = format!("sensor_report_{}", now.format("%Y%m%d_%H%M"));
    let workbook = config.output_dir.join(format!("{stem}.xlsx"));
    render_workbook(&model, &config.palette, &workbook)?;

    let json = if config.export_json {
        let path = config.output_dir.join(format!("{stem}.json"));
        export_json(&model, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(RunOutput {
        workbook,
        json,
        sensors: model.sensor_count(),
        configured: model.configured_sensors,
    })
}
