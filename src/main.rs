//! `prtg-report` -- PRTG temperature sensor report generator.
//!
//! Fetches historical temperature data for the configured sensors,
//! computes statistics and alert thresholds, and writes a styled Excel
//! workbook.
//!
//! Usage: `prtg-report [CONFIG]`
//!
//! | Variable             | Default         | Description                      |
//! |----------------------|-----------------|----------------------------------|
//! | `PRTG_REPORT_CONFIG` | `config.json`   | Config path when no argument     |
//! | `RUST_LOG`           | `prtg_report=info` | Log filter                    |

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prtg_report::pipeline;
use prtg_report::source::{DirectorySource, PrtgSource, SensorSource};
use prtg_report::state::config::{Config, DEFAULT_CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prtg_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("PRTG_REPORT_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config = Config::load(&config_path)?;

    tracing::info!(
        config = %config_path.display(),
        sensors = config.sensors.len(),
        days = config.days_to_analyze,
        "Starting PRTG sensor report",
    );

    let source: Box<dyn SensorSource> = match &config.input_dir {
        Some(dir) => Box::new(DirectorySource::new(dir)),
        None => Box::new(
            PrtgSource::new(&config.prtg, config.days_to_analyze)
                .context("failed to create PRTG client")?,
        ),
    };

    let output = pipeline::run(source.as_ref(), &config).context("report generation failed")?;

    tracing::info!(
        path = %output.workbook.display(),
        sensors = output.sensors,
        configured = output.configured,
        "Report saved",
    );
    if let Some(json) = &output.json {
        tracing::info!(path = %json.display(), "Model exported");
    }
    Ok(())
}
