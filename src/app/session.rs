//! In-memory session state for one stress-strain curve.
//!
//! The stages are typed and filled in order:
//!
//! `RawSample → StressStrainCurve → FitOutcome → ExportSet`
//!
//! Changing an upstream stage (e.g. new moduli) drops every downstream stage,
//! so a fit can never be paired with the curve it was not computed from.

use crate::curve::{RawSample, StressStrainCurve};
use crate::domain::{ExportCurve, FitRange, FitSettings, ModelKind, SamplingPlan, StrainBasis};
use crate::error::FitError;
use crate::fit::{FitOutcome, detail_grid, fit_curve};

/// Sampled curves of every successfully fitted law.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSet {
    pub plan: SamplingPlan,
    /// In `ModelKind::ALL` order, failed laws omitted.
    pub curves: Vec<(ModelKind, ExportCurve)>,
    /// Fitted laws whose curve could not be sampled on `plan`.
    pub failures: Vec<(ModelKind, FitError)>,
}

impl ExportSet {
    pub fn get(&self, kind: ModelKind) -> Option<&ExportCurve> {
        self.curves.iter().find(|(k, _)| *k == kind).map(|(_, c)| c)
    }

    pub fn failure(&self, kind: ModelKind) -> Option<&FitError> {
        self.failures.iter().find(|(k, _)| *k == kind).map(|(_, e)| e)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    sample: RawSample,
    curve: StressStrainCurve,
    settings: Option<FitSettings>,
    outcome: Option<FitOutcome>,
    exports: Option<ExportSet>,
}

impl Session {
    pub fn new(sample: RawSample) -> Result<Self, FitError> {
        let curve = StressStrainCurve::from_sample(&sample)?;
        Ok(Self {
            sample,
            curve,
            settings: None,
            outcome: None,
            exports: None,
        })
    }

    /// Change units and moduli; recomputes the curve and clears fits.
    pub fn reconfigure(
        &mut self,
        is_percent_strain: bool,
        young_modulus: f64,
        yield_stress: f64,
    ) -> Result<(), FitError> {
        let mut sample = self.sample.clone();
        sample.reconfigure(is_percent_strain, young_modulus, yield_stress)?;
        self.curve = StressStrainCurve::from_sample(&sample)?;
        self.sample = sample;
        self.settings = None;
        self.outcome = None;
        self.exports = None;
        Ok(())
    }

    pub fn sample(&self) -> &RawSample {
        &self.sample
    }

    pub fn curve(&self) -> &StressStrainCurve {
        &self.curve
    }

    pub fn settings(&self) -> Option<&FitSettings> {
        self.settings.as_ref()
    }

    pub fn outcome(&self) -> Option<&FitOutcome> {
        self.outcome.as_ref()
    }

    pub fn exports(&self) -> Option<&ExportSet> {
        self.exports.as_ref()
    }

    /// `(0, max basis strain]`, the range used when the caller gives none.
    pub fn default_fit_range(&self, basis: StrainBasis) -> Result<FitRange, FitError> {
        let high = self
            .curve
            .max_strain(basis)
            .filter(|&m| m > 0.0)
            .ok_or_else(|| FitError::invalid_input(format!("Curve has no positive {basis:?} strain to fit.")))?;
        FitRange::new(0.0, high)
    }

    /// Fit every law; replaces any previous fit and export.
    pub fn fit(&mut self, settings: FitSettings) -> Result<&FitOutcome, FitError> {
        let outcome = fit_curve(&self.curve, &settings)?;
        self.settings = Some(settings);
        self.exports = None;
        Ok(self.outcome.insert(outcome))
    }

    /// Sample every fitted law on `plan`.
    ///
    /// An invalid plan fails the call; a law that cannot be sampled is listed
    /// in [`ExportSet::failures`] and the others are still exported.
    pub fn export(&mut self, plan: SamplingPlan) -> Result<&ExportSet, FitError> {
        detail_grid(plan.range, plan.num_points, plan.detail_range, plan.detail_points)?;
        let outcome = self
            .outcome
            .as_ref()
            .ok_or_else(|| FitError::invalid_input("Nothing to export: run a fit first."))?;

        let mut curves = Vec::new();
        let mut failures = Vec::new();
        for report in outcome.successes() {
            let kind = report.law.kind();
            match report.law.sample_curve(&plan) {
                Ok(curve) => curves.push((kind, curve)),
                Err(err) => {
                    log::warn!("{kind}: curve not exported: {err}");
                    failures.push((kind, err));
                }
            }
        }

        Ok(self.exports.insert(ExportSet { plan, curves, failures }))
    }
}
