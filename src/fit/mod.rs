//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit one hardening law with Levenberg–Marquardt (`fitter`)
//! - fit all laws on a selected strain window, in parallel (`selection`)
//! - sample fitted laws on a detail-weighted strain grid (`grid`)

pub mod fitter;
pub mod grid;
pub mod selection;

pub use fitter::*;
pub use grid::*;
pub use selection::*;
