//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages in memory
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Hardening law family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `σ = σ0 + k·εp^n`
    Ludwik,
    /// `σ = σ0·(1 + εp/α)^n`
    Swift,
    /// `σ = σ∞ - (σ∞ - σ0)·exp(-h·εp)`
    Voce,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Ludwik, ModelKind::Swift, ModelKind::Voce];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Ludwik => "Ludwik",
            ModelKind::Swift => "Swift",
            ModelKind::Voce => "Voce",
        }
    }

    /// Names of the two free parameters, in solver order.
    pub fn param_names(self) -> [&'static str; 2] {
        match self {
            ModelKind::Ludwik => ["k", "n"],
            ModelKind::Swift => ["alpha", "n"],
            ModelKind::Voce => ["stress_infinite", "h"],
        }
    }

    /// Number of fitted parameters (the yield stress is held fixed).
    pub fn param_count(self) -> usize {
        2
    }

    /// Seed used when the caller does not supply an initial guess.
    pub fn default_initial_guess(self) -> [f64; 2] {
        match self {
            ModelKind::Ludwik => [1.0, 0.3],
            ModelKind::Swift => [0.01, 0.3],
            ModelKind::Voce => [0.01, 0.3],
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which strain array the fit range and the fitted abscissa refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrainBasis {
    /// Logarithmic (true) strain.
    #[default]
    True,
    /// True strain minus the elastic part; zero below yield.
    Plastic,
}

/// Column-pair views of a stress-strain curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Nominal,
    True,
    Plastic,
}

/// Strain window used to pick fit samples.
///
/// Membership is `low < x <= high`: exclusive at the bottom, inclusive at the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    pub low: f64,
    pub high: f64,
}

impl FitRange {
    pub fn new(low: f64, high: f64) -> Result<Self, FitError> {
        let range = Self { low, high };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), FitError> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(FitError::invalid_input(format!(
                "Fit range must be finite, got ({}, {}).",
                self.low, self.high
            )));
        }
        if self.low < 0.0 || self.low >= self.high {
            return Err(FitError::invalid_input(format!(
                "Fit range must satisfy 0 <= low < high, got ({}, {}).",
                self.low, self.high
            )));
        }
        Ok(())
    }

    pub fn contains(&self, x: f64) -> bool {
        x > self.low && x <= self.high
    }
}

/// Caller-supplied seeds, one optional pair per model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialGuesses {
    pub ludwik: Option<[f64; 2]>,
    pub swift: Option<[f64; 2]>,
    pub voce: Option<[f64; 2]>,
}

impl InitialGuesses {
    pub fn get(&self, kind: ModelKind) -> Option<[f64; 2]> {
        match kind {
            ModelKind::Ludwik => self.ludwik,
            ModelKind::Swift => self.swift,
            ModelKind::Voce => self.voce,
        }
    }

    pub fn set(&mut self, kind: ModelKind, guess: [f64; 2]) {
        match kind {
            ModelKind::Ludwik => self.ludwik = Some(guess),
            ModelKind::Swift => self.swift = Some(guess),
            ModelKind::Voce => self.voce = Some(guess),
        }
    }
}

/// Settings for one fitting invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSettings {
    pub fit_range: FitRange,
    pub initial_guesses: InitialGuesses,
    pub max_iterations: usize,
    pub basis: StrainBasis,
}

impl FitSettings {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    pub fn new(fit_range: FitRange) -> Self {
        Self {
            fit_range,
            initial_guesses: InitialGuesses::default(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            basis: StrainBasis::True,
        }
    }

    pub fn with_initial_guess(mut self, kind: ModelKind, guess: [f64; 2]) -> Self {
        self.initial_guesses.set(kind, guess);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_basis(mut self, basis: StrainBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Seed for `kind`: the caller's override, else the model default.
    pub fn initial_guess_for(&self, kind: ModelKind) -> [f64; 2] {
        self.initial_guesses
            .get(kind)
            .unwrap_or_else(|| kind.default_initial_guess())
    }

    pub fn validate(&self) -> Result<(), FitError> {
        self.fit_range.validate()?;
        if self.max_iterations == 0 {
            return Err(FitError::invalid_input("max_iterations must be > 0."));
        }
        for kind in ModelKind::ALL {
            let guess = self.initial_guess_for(kind);
            if guess.iter().any(|v| !v.is_finite()) {
                return Err(FitError::invalid_input(format!(
                    "Initial guess for {kind} must be finite, got {guess:?}."
                )));
            }
        }
        Ok(())
    }
}

/// Parameters of the non-uniform export sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingPlan {
    pub range: (f64, f64),
    pub num_points: usize,
    pub detail_range: (f64, f64),
    pub detail_points: usize,
}

impl Default for SamplingPlan {
    fn default() -> Self {
        Self {
            range: (0.0, 0.5),
            num_points: 20,
            detail_range: (0.0, 0.05),
            detail_points: 50,
        }
    }
}

/// Ordered `(strain, stress)` samples of a fitted law.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportCurve {
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
}

impl ExportCurve {
    pub fn len(&self) -> usize {
        self.strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    /// Iterate samples in sequence order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.strain.iter().copied().zip(self.stress.iter().copied())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and environment).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub strain_column: String,
    pub stress_column: String,
    pub is_percent_strain: bool,
    pub young_modulus: f64,
    pub yield_stress: f64,

    /// `None` means `(0, max basis strain]`.
    pub fit_range: Option<(f64, f64)>,
    pub basis: StrainBasis,
    pub max_iterations: usize,
    pub initial_guesses: InitialGuesses,

    pub sampling: SamplingPlan,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

/// Per-model entry of a saved report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model: ModelKind,
    /// Free parameters by name, in solver order.
    pub params: Vec<(String, f64)>,
    pub yield_stress: f64,
    pub r_squared: Option<f64>,
    /// Why `r_squared` is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared_error: Option<String>,
    pub r_squared_plastic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared_plastic_error: Option<String>,
    pub iterations: usize,
    pub sse: f64,
    /// Empty when the law could not be sampled; see `curve_error`.
    pub curve: ExportCurve,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_error: Option<String>,
}

/// Failure entry of a saved report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFailure {
    pub model: ModelKind,
    pub error: String,
}

/// A saved fit report (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub young_modulus: f64,
    pub yield_stress: f64,
    pub settings: FitSettings,
    pub sampling: SamplingPlan,
    pub best: Option<ModelKind>,
    pub fits: Vec<ModelEntry>,
    pub failures: Vec<ModelFailure>,
    /// Plastic table `(plastic_strain, true_stress)` for overlay plots.
    pub plastic: ExportCurve,
}
