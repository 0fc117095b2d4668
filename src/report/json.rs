use std::path::Path;

use crate::error::ReportError;
use crate::report::model::ReportModel;

/// Write the report model as pretty-printed JSON.
pub fn export_json(model: &ReportModel, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(model)?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Report model exported");
    Ok(())
}
