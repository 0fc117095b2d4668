pub mod config;
pub mod series;
pub mod theme;
