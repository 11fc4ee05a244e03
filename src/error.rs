//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`]: typed failures of the numerical core (transform, models,
//!   fitter, sampling). Callers can match on the kind and render a message per
//!   model.
//! - [`AppError`]: what the `hf` binary reports, i.e. a message plus a process
//!   exit code.

use thiserror::Error;

use crate::domain::ModelKind;

/// Failures of the numerical core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Malformed or mismatched input arrays, bad moduli, missing columns.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An inverse was requested outside the function's valid domain, or a
    /// sampled stress came out non-finite.
    #[error("{model}: stress {stress} is outside the valid domain ({reason})")]
    Domain {
        model: ModelKind,
        stress: f64,
        reason: String,
    },

    /// The solver stopped without a usable solution.
    #[error("{model}: fit did not converge after {iterations} iterations ({reason})")]
    FitConvergence {
        model: ModelKind,
        iterations: usize,
        reason: String,
    },

    /// `R²` is undefined because the target data has zero variance.
    #[error("R² is undefined: {0}")]
    UndefinedMetric(String),

    /// Degenerate sampling range or detail range outside the overall range.
    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

impl FitError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        FitError::InvalidInput(message.into())
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        FitError::InvalidRange(message.into())
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidInput(_) | FitError::InvalidRange(_) => 2,
            FitError::Domain { .. } | FitError::FitConvergence { .. } | FitError::UndefinedMetric(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
