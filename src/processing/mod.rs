pub mod hourly;
pub mod statistics;
pub mod thresholds;
