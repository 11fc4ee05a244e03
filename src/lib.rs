//! `hardening-fit` library crate.
//!
//! Fits Ludwik, Swift and Voce hardening laws to tensile-test stress-strain
//! curves. The binary (`hf`) is a thin wrapper around this library so that:
//!
//! - the numerical core is testable without spawning processes
//! - the transform, models and fitter are reusable from other front ends

pub mod app;
pub mod cli;
pub mod curve;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
