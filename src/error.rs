use std::path::PathBuf;

/// Per-sensor failures raised by the statistics engine.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("time series contains no readings")]
    EmptySeries,
}

/// Failures turning a raw table into a time series.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no data found in input")]
    NoData,

    #[error("no 'Date Time' header found in the first {0} rows")]
    NoHeader(usize),

    #[error("no temperature column found (columns: {0})")]
    NoTemperatureColumn(String),

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),
}

/// Failures retrieving raw history for a sensor.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no export found for sensor {0}")]
    NotFound(u32),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures of a whole report run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no sensor produced any data")]
    NoData,

    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
