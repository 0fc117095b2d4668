//! Where raw sensor history comes from.

pub mod directory;
pub mod prtg;

use crate::data::loader::LoadedData;
use crate::error::SourceError;

pub use directory::DirectorySource;
pub use prtg::PrtgSource;

/// Supplies the raw export table for one sensor.
pub trait SensorSource {
    fn fetch(&self, sensor_id: u32) -> Result<LoadedData, SourceError>;
}
