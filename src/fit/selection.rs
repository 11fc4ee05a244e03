//! Fit all three hardening laws to a stress-strain curve.
//!
//! Steps:
//! 1. pick the samples whose basis strain lies in `(low, high]`
//! 2. fit Ludwik, Swift and Voce independently (in parallel)
//! 3. score each success with R² and pick the best
//!
//! A failing law never stops the others: each outcome is kept per model.

use rayon::prelude::*;

use crate::curve::{CurveTable, StressStrainCurve};
use crate::domain::{FitSettings, ModelKind, TableKind};
use crate::error::FitError;
use crate::fit::fitter::{LawFit, fit_law};
use crate::models::{FittedLaw, HardeningLaw, Ludwik, Swift, Voce};

/// Strain/stress pairs selected for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSamples {
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
}

/// Successful fit of one law with its diagnostics.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub law: FittedLaw,
    pub iterations: usize,
    pub sse: f64,
    pub rmse: f64,
    /// R² over the fitted samples.
    pub r_squared: Result<f64, FitError>,
    /// R² over the plastic table `(plastic_strain, true_stress)`.
    pub r_squared_plastic: Result<f64, FitError>,
}

/// Output of fitting every law.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub samples: FitSamples,
    /// One entry per law, in `ModelKind::ALL` order.
    pub results: Vec<(ModelKind, Result<FitReport, FitError>)>,
    /// Success with the highest R² over the fitted samples.
    pub best: Option<ModelKind>,
}

impl FitReport {
    /// R² below zero: the law fits worse than the mean stress, which usually
    /// means the solver stalled far from the data.
    pub fn is_worse_than_mean(&self) -> bool {
        matches!(self.r_squared, Ok(r2) if r2 < 0.0)
    }
}

impl FitOutcome {
    pub fn get(&self, kind: ModelKind) -> Option<&Result<FitReport, FitError>> {
        self.results.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }

    pub fn successes(&self) -> impl Iterator<Item = &FitReport> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (ModelKind, &FitError)> {
        self.results
            .iter()
            .filter_map(|(k, r)| r.as_ref().err().map(|e| (*k, e)))
    }
}

/// Select the pairs whose basis strain satisfies `low < x <= high`.
pub fn select_samples(curve: &StressStrainCurve, settings: &FitSettings) -> FitSamples {
    let range = settings.fit_range;
    let (strain, stress) = curve
        .basis_strain(settings.basis)
        .iter()
        .zip(curve.true_stress().iter())
        .filter(|(x, _)| range.contains(**x))
        .map(|(&x, &s)| (x, s))
        .unzip();
    FitSamples { strain, stress }
}

/// Fit every law to `curve` under `settings`.
///
/// Only invalid settings fail the whole call; per-law failures are reported
/// inside the outcome.
pub fn fit_curve(curve: &StressStrainCurve, settings: &FitSettings) -> Result<FitOutcome, FitError> {
    settings.validate()?;

    let samples = select_samples(curve, settings);
    log::info!(
        "fitting {} samples with {:?} strain in ({}, {}]",
        samples.strain.len(),
        settings.basis,
        settings.fit_range.low,
        settings.fit_range.high
    );

    let plastic = curve.table(TableKind::Plastic);

    let results: Vec<(ModelKind, Result<FitReport, FitError>)> = ModelKind::ALL
        .par_iter()
        .map(|&kind| {
            let result = fit_one(kind, curve.yield_stress, &samples, &plastic, settings);
            match &result {
                Ok(report) => {
                    log::info!(
                        "{kind}: params={:?} iterations={} rmse={:.4}",
                        report.law.params(),
                        report.iterations,
                        report.rmse
                    );
                    if report.is_worse_than_mean() {
                        log::warn!("{kind}: fit is worse than the mean stress, try another initial guess");
                    }
                }
                Err(err) => log::warn!("{kind}: {err}"),
            }
            (kind, result)
        })
        .collect();

    let best = select_best(&results);
    Ok(FitOutcome { samples, results, best })
}

fn fit_one(
    kind: ModelKind,
    yield_stress: f64,
    samples: &FitSamples,
    plastic: &CurveTable,
    settings: &FitSettings,
) -> Result<FitReport, FitError> {
    match kind {
        ModelKind::Ludwik => fit_typed::<Ludwik>(yield_stress, samples, plastic, settings),
        ModelKind::Swift => fit_typed::<Swift>(yield_stress, samples, plastic, settings),
        ModelKind::Voce => fit_typed::<Voce>(yield_stress, samples, plastic, settings),
    }
}

/// Fit one law and score it on the fitted samples and the plastic table.
fn fit_typed<M>(
    yield_stress: f64,
    samples: &FitSamples,
    plastic: &CurveTable,
    settings: &FitSettings,
) -> Result<FitReport, FitError>
where
    M: HardeningLaw + Into<FittedLaw>,
{
    let LawFit {
        model,
        sse,
        rmse,
        iterations,
    } = fit_law::<M>(
        yield_stress,
        &samples.strain,
        &samples.stress,
        settings.initial_guess_for(M::KIND),
        settings.max_iterations,
    )?;

    let r_squared = model.r_squared(&samples.strain, &samples.stress);
    let r_squared_plastic = model.r_squared(&plastic.strain, &plastic.stress);

    Ok(FitReport {
        law: model.into(),
        iterations,
        sse,
        rmse,
        r_squared,
        r_squared_plastic,
    })
}

/// Highest R² wins; ties keep the earlier law in `ModelKind::ALL` order.
fn select_best(results: &[(ModelKind, Result<FitReport, FitError>)]) -> Option<ModelKind> {
    let mut best: Option<(ModelKind, f64)> = None;
    for (kind, result) in results {
        let Ok(report) = result else { continue };
        let Ok(r2) = report.r_squared else { continue };
        if !r2.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, b)| r2 > b) {
            best = Some((*kind, r2));
        }
    }
    best.map(|(kind, _)| kind)
}
