//! Low-level fitting routines for a single hardening law.
//!
//! Given:
//! - strains `ε_i`
//! - observed stresses `σ_i`
//! - the law's fixed yield stress `σ0`
//! - a seed for the two free parameters
//!
//! we minimize `Σ (σ(ε_i; σ0, a, b) - σ_i)²` over `(a, b)` with
//! Levenberg–Marquardt and return a new model value carrying the solution.

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::math::{LmFailure, LmOptions, minimize};
use crate::models::HardeningLaw;

/// Best fit for a single law.
#[derive(Debug, Clone)]
pub struct LawFit<M> {
    pub model: M,
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
}

/// Fit law `M` to `(strain, stress)` with `σ0 = yield_stress` held fixed.
pub fn fit_law<M: HardeningLaw>(
    yield_stress: f64,
    strain: &[f64],
    stress: &[f64],
    initial_guess: [f64; 2],
    max_iterations: usize,
) -> Result<LawFit<M>, FitError> {
    let kind = M::KIND;
    check_samples(strain, stress)?;
    if strain.len() < kind.param_count() {
        return Err(FitError::invalid_input(format!(
            "{kind}: need at least {} samples to fit {} parameters, got {}.",
            kind.param_count(),
            kind.param_count(),
            strain.len()
        )));
    }
    if !yield_stress.is_finite() {
        return Err(FitError::invalid_input(format!("{kind}: yield stress must be finite.")));
    }
    if initial_guess.iter().any(|v| !v.is_finite()) {
        return Err(FitError::invalid_input(format!(
            "{kind}: initial guess must be finite, got {initial_guess:?}."
        )));
    }
    if max_iterations == 0 {
        return Err(FitError::invalid_input(format!("{kind}: max_iterations must be > 0.")));
    }

    let residuals = |p: &[f64]| -> Vec<f64> {
        let model = M::from_params(yield_stress, [p[0], p[1]]);
        strain
            .iter()
            .zip(stress.iter())
            .map(|(&e, &s)| model.evaluate(e) - s)
            .collect()
    };

    let solution = minimize(residuals, &initial_guess, &LmOptions::with_max_iterations(max_iterations))
        .map_err(|failure| convergence_error(kind, failure))?;

    let params = [solution.params[0], solution.params[1]];
    if params.iter().any(|v| !v.is_finite()) || !solution.sse.is_finite() {
        return Err(FitError::FitConvergence {
            model: kind,
            iterations: solution.iterations,
            reason: format!("solver returned non-finite parameters {params:?}"),
        });
    }

    log::debug!(
        "{kind}: converged in {} iterations, params={params:?}, sse={:.6e}",
        solution.iterations,
        solution.sse
    );

    Ok(LawFit {
        model: M::from_params(yield_stress, params),
        sse: solution.sse,
        rmse: (solution.sse / strain.len() as f64).sqrt(),
        iterations: solution.iterations,
    })
}

/// Coefficient of determination `1 - SS_res / SS_tot` of `model` on the data.
pub fn r_squared<M: HardeningLaw>(model: &M, strain: &[f64], stress: &[f64]) -> Result<f64, FitError> {
    check_samples(strain, stress)?;

    let n = stress.len() as f64;
    let mean = stress.iter().sum::<f64>() / n;
    let ss_tot: f64 = stress.iter().map(|s| (s - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(FitError::UndefinedMetric(format!(
            "all {} target stresses are identical ({mean})",
            stress.len()
        )));
    }

    let ss_res: f64 = strain
        .iter()
        .zip(stress.iter())
        .map(|(&e, &s)| (s - model.evaluate(e)).powi(2))
        .sum();

    Ok(1.0 - ss_res / ss_tot)
}

fn check_samples(strain: &[f64], stress: &[f64]) -> Result<(), FitError> {
    if strain.is_empty() {
        return Err(FitError::invalid_input("No samples to fit."));
    }
    if strain.len() != stress.len() {
        return Err(FitError::invalid_input(format!(
            "Strain has {} samples but stress has {}.",
            strain.len(),
            stress.len()
        )));
    }
    if strain.iter().chain(stress.iter()).any(|v| !v.is_finite()) {
        return Err(FitError::invalid_input("Samples contain non-finite values."));
    }
    Ok(())
}

fn convergence_error(model: ModelKind, failure: LmFailure) -> FitError {
    FitError::FitConvergence {
        model,
        iterations: failure.iterations(),
        reason: failure.to_string(),
    }
}
