//! `prtg-report` library crate.
//!
//! Pulls temperature history for a set of PRTG sensors, derives per-sensor
//! statistics and alert bands, and renders a multi-sheet Excel report. The
//! binary entrypoint lives in `main.rs`.

pub mod data;
pub mod error;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod source;
pub mod state;
