//! The hardening-law capability shared by Ludwik, Swift and Voce.
//!
//! A law is a closed form `σ(εp)` with the yield stress `σ0` held fixed and
//! two free parameters. Fitting, scoring and curve sampling are written once
//! against [`HardeningLaw`] (see `crate::fit`); each law only supplies its
//! formula, its inverse and how to rebuild itself from a parameter pair.
//!
//! Fitted models are immutable values: a fit produces a new model rather than
//! updating fields of an existing one.

use serde::{Deserialize, Serialize};

use crate::domain::{ExportCurve, ModelKind, SamplingPlan};
use crate::error::FitError;
use crate::models::{Ludwik, Swift, Voce};

pub trait HardeningLaw: Clone + Send + Sync {
    const KIND: ModelKind;

    /// Build a model from `σ0` and the free parameters in solver order.
    fn from_params(yield_stress: f64, params: [f64; 2]) -> Self;

    /// Free parameters in solver order.
    fn params(&self) -> [f64; 2];

    fn yield_stress(&self) -> f64;

    /// Stress at plastic strain `strain`.
    fn evaluate(&self, strain: f64) -> f64;

    /// Plastic strain at which the law reaches `stress`.
    fn invert(&self, stress: f64) -> Result<f64, FitError>;

    fn kind(&self) -> ModelKind {
        Self::KIND
    }

    fn parameter_count(&self) -> usize {
        Self::KIND.param_count()
    }

    fn evaluate_all(&self, strain: &[f64]) -> Vec<f64> {
        strain.iter().map(|&e| self.evaluate(e)).collect()
    }

    /// Least-squares fit of the free parameters with `σ0` fixed.
    ///
    /// `initial_guess = None` uses the law's default seed.
    fn fit(
        &self,
        strain: &[f64],
        stress: &[f64],
        initial_guess: Option<[f64; 2]>,
        max_iterations: usize,
    ) -> Result<Self, FitError> {
        let guess = initial_guess.unwrap_or_else(|| Self::KIND.default_initial_guess());
        crate::fit::fit_law::<Self>(self.yield_stress(), strain, stress, guess, max_iterations)
            .map(|fit| fit.model)
    }

    fn r_squared(&self, strain: &[f64], stress: &[f64]) -> Result<f64, FitError> {
        crate::fit::r_squared(self, strain, stress)
    }

    fn sample_curve(&self, plan: &SamplingPlan) -> Result<ExportCurve, FitError> {
        crate::fit::sample_law(self, plan)
    }

    fn domain_error(&self, stress: f64, reason: impl Into<String>) -> FitError {
        FitError::Domain {
            model: Self::KIND,
            stress,
            reason: reason.into(),
        }
    }
}

/// Inverse results must be finite, non-negative plastic strains.
pub(crate) fn check_inverse<M: HardeningLaw>(model: &M, stress: f64, strain: f64) -> Result<f64, FitError> {
    if !strain.is_finite() {
        return Err(model.domain_error(stress, "inverse is not finite"));
    }
    if strain < 0.0 {
        return Err(model.domain_error(stress, "stress lies below the yield point of the law"));
    }
    Ok(strain)
}

/// One of the three fitted laws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum FittedLaw {
    Ludwik(Ludwik),
    Swift(Swift),
    Voce(Voce),
}

impl FittedLaw {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedLaw::Ludwik(_) => ModelKind::Ludwik,
            FittedLaw::Swift(_) => ModelKind::Swift,
            FittedLaw::Voce(_) => ModelKind::Voce,
        }
    }

    pub fn from_params(kind: ModelKind, yield_stress: f64, params: [f64; 2]) -> Self {
        match kind {
            ModelKind::Ludwik => FittedLaw::Ludwik(Ludwik::from_params(yield_stress, params)),
            ModelKind::Swift => FittedLaw::Swift(Swift::from_params(yield_stress, params)),
            ModelKind::Voce => FittedLaw::Voce(Voce::from_params(yield_stress, params)),
        }
    }

    pub fn params(&self) -> [f64; 2] {
        match self {
            FittedLaw::Ludwik(m) => m.params(),
            FittedLaw::Swift(m) => m.params(),
            FittedLaw::Voce(m) => m.params(),
        }
    }

    /// `(name, value)` pairs for display and export.
    pub fn named_params(&self) -> Vec<(String, f64)> {
        self.kind()
            .param_names()
            .iter()
            .zip(self.params())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    pub fn yield_stress(&self) -> f64 {
        match self {
            FittedLaw::Ludwik(m) => m.yield_stress(),
            FittedLaw::Swift(m) => m.yield_stress(),
            FittedLaw::Voce(m) => m.yield_stress(),
        }
    }

    pub fn evaluate(&self, strain: f64) -> f64 {
        match self {
            FittedLaw::Ludwik(m) => m.evaluate(strain),
            FittedLaw::Swift(m) => m.evaluate(strain),
            FittedLaw::Voce(m) => m.evaluate(strain),
        }
    }

    pub fn evaluate_all(&self, strain: &[f64]) -> Vec<f64> {
        strain.iter().map(|&e| self.evaluate(e)).collect()
    }

    pub fn invert(&self, stress: f64) -> Result<f64, FitError> {
        match self {
            FittedLaw::Ludwik(m) => m.invert(stress),
            FittedLaw::Swift(m) => m.invert(stress),
            FittedLaw::Voce(m) => m.invert(stress),
        }
    }

    pub fn r_squared(&self, strain: &[f64], stress: &[f64]) -> Result<f64, FitError> {
        match self {
            FittedLaw::Ludwik(m) => m.r_squared(strain, stress),
            FittedLaw::Swift(m) => m.r_squared(strain, stress),
            FittedLaw::Voce(m) => m.r_squared(strain, stress),
        }
    }

    pub fn sample_curve(&self, plan: &SamplingPlan) -> Result<ExportCurve, FitError> {
        match self {
            FittedLaw::Ludwik(m) => m.sample_curve(plan),
            FittedLaw::Swift(m) => m.sample_curve(plan),
            FittedLaw::Voce(m) => m.sample_curve(plan),
        }
    }

    /// The law written out with its fitted constants.
    pub fn formula(&self) -> String {
        match self {
            FittedLaw::Ludwik(m) => format!("σ = {:.3} + {:.3}·εp^{:.4}", m.yield_stress, m.k, m.n),
            FittedLaw::Swift(m) => format!("σ = {:.3}·(1 + εp/{:.5})^{:.4}", m.yield_stress, m.alpha, m.n),
            FittedLaw::Voce(m) => format!(
                "σ = {:.3} - ({:.3} - {:.3})·exp(-{:.4}·εp)",
                m.stress_infinite, m.stress_infinite, m.yield_stress, m.h
            ),
        }
    }
}

impl From<Ludwik> for FittedLaw {
    fn from(value: Ludwik) -> Self {
        FittedLaw::Ludwik(value)
    }
}

impl From<Swift> for FittedLaw {
    fn from(value: Swift) -> Self {
        FittedLaw::Swift(value)
    }
}

impl From<Voce> for FittedLaw {
    fn from(value: Voce) -> Self {
        FittedLaw::Voce(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_law_round_trips_params() {
        for kind in ModelKind::ALL {
            let law = FittedLaw::from_params(kind, 250.0, [3.0, 0.4]);
            assert_eq!(law.kind(), kind);
            assert_eq!(law.params(), [3.0, 0.4]);
            assert_eq!(law.yield_stress(), 250.0);
            assert_eq!(law.named_params()[0].0, kind.param_names()[0]);
        }
    }

    #[test]
    fn every_law_starts_at_yield() {
        for kind in ModelKind::ALL {
            let law = FittedLaw::from_params(kind, 250.0, [400.0, 0.3]);
            assert!((law.evaluate(0.0) - 250.0).abs() < 1e-9, "{kind}");
        }
    }

    #[test]
    fn formula_mentions_constants() {
        let law = FittedLaw::from_params(ModelKind::Ludwik, 250.0, [500.0, 0.2]);
        assert_eq!(law.formula(), "σ = 250.000 + 500.000·εp^0.2000");
    }
}
