//! Reporting utilities: terminal summaries of curves, fits and saved reports.

pub mod format;

pub use format::*;
