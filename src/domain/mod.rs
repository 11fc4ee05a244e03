//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model identifiers and fit configuration (`ModelKind`, `FitSettings`, `SamplingPlan`)
//! - pipeline outputs (`ExportCurve`)
//! - the saved report schema (`ReportFile`)

pub mod types;

pub use types::*;
