use std::path::PathBuf;

use crate::data::loader::{self, LoadedData};
use crate::error::SourceError;
use crate::source::SensorSource;

/// Reads PRTG exports saved as `<dir>/<sensor_id>.csv` (or `.xlsx` / `.xls`).
pub struct DirectorySource {
    dir: PathBuf,
}

const EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn export_path(&self, sensor_id: u32) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{sensor_id}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl SensorSource for DirectorySource {
    fn fetch(&self, sensor_id: u32) -> Result<LoadedData, SourceError> {
        let path = self.export_path(sensor_id).ok_or(SourceError::NotFound(sensor_id))?;
        tracing::info!(sensor_id, path = %path.display(), "Reading export");
        Ok(loader::load_file(&path)?)
    }
}
