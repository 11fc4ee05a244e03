//! Nominal → true stress-strain conversion and elastic/plastic split.
//!
//! For each sample `i`:
//!
//! ```text
//! true_strain[i]    = ln(1 + nominal_strain[i])
//! true_stress[i]    = nominal_stress[i] * (1 + nominal_strain[i])
//! elastic_strain[i] = true_stress[i] / E
//! plastic_strain[i] = true_strain[i] - elastic_strain[i]   if true_stress[i] >= σ0
//!                   = 0                                     otherwise
//! ```
//!
//! The plastic split assumes linear-elastic unloading with slope `E`. Nothing
//! here checks that `E` matches the measured unloading stiffness, and
//! `plastic_strain` may come out slightly negative just above yield.

use serde::{Deserialize, Serialize};

use crate::curve::raw::{RawSample, check_moduli};
use crate::domain::{StrainBasis, TableKind};
use crate::error::FitError;

pub const LABEL_STRAIN: &str = "strain[-]";
pub const LABEL_STRESS: &str = "stress[MPa]";

/// Derived stress-strain arrays, all index-aligned with `nominal_strain`.
#[derive(Debug, Clone, PartialEq)]
pub struct StressStrainCurve {
    pub young_modulus: f64,
    pub yield_stress: f64,
    nominal_strain: Vec<f64>,
    nominal_stress: Vec<f64>,
    true_strain: Vec<f64>,
    true_stress: Vec<f64>,
    elastic_strain: Vec<f64>,
    plastic_strain: Vec<f64>,
}

/// A two-column view of the curve for presentation or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTable {
    pub kind: TableKind,
    pub strain_label: String,
    pub stress_label: String,
    pub strain: Vec<f64>,
    pub stress: Vec<f64>,
}

impl CurveTable {
    pub fn len(&self) -> usize {
        self.strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.strain.iter().copied().zip(self.stress.iter().copied())
    }
}

impl StressStrainCurve {
    /// Run the transform on dimensionless nominal strain.
    pub fn from_nominal(
        nominal_strain: Vec<f64>,
        nominal_stress: Vec<f64>,
        young_modulus: f64,
        yield_stress: f64,
    ) -> Result<Self, FitError> {
        if nominal_strain.len() != nominal_stress.len() {
            return Err(FitError::invalid_input(format!(
                "Nominal strain has {} samples but nominal stress has {}.",
                nominal_strain.len(),
                nominal_stress.len()
            )));
        }
        check_moduli(young_modulus, yield_stress)?;

        let n = nominal_strain.len();
        let mut true_strain = Vec::with_capacity(n);
        let mut true_stress = Vec::with_capacity(n);
        let mut elastic_strain = Vec::with_capacity(n);
        let mut plastic_strain = Vec::with_capacity(n);

        for (&e, &s) in nominal_strain.iter().zip(nominal_stress.iter()) {
            let eps_t = e.ln_1p();
            let sig_t = s * (1.0 + e);
            let eps_e = sig_t / young_modulus;
            let eps_p = if sig_t >= yield_stress { eps_t - eps_e } else { 0.0 };

            true_strain.push(eps_t);
            true_stress.push(sig_t);
            elastic_strain.push(eps_e);
            plastic_strain.push(eps_p);
        }

        Ok(Self {
            young_modulus,
            yield_stress,
            nominal_strain,
            nominal_stress,
            true_strain,
            true_stress,
            elastic_strain,
            plastic_strain,
        })
    }

    /// Normalize units and run the transform.
    pub fn from_sample(sample: &RawSample) -> Result<Self, FitError> {
        Self::from_nominal(
            sample.nominal_strain(),
            sample.nominal_stress().to_vec(),
            sample.young_modulus,
            sample.yield_stress,
        )
    }

    pub fn len(&self) -> usize {
        self.nominal_strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominal_strain.is_empty()
    }

    pub fn nominal_strain(&self) -> &[f64] {
        &self.nominal_strain
    }

    pub fn nominal_stress(&self) -> &[f64] {
        &self.nominal_stress
    }

    pub fn true_strain(&self) -> &[f64] {
        &self.true_strain
    }

    pub fn true_stress(&self) -> &[f64] {
        &self.true_stress
    }

    pub fn elastic_strain(&self) -> &[f64] {
        &self.elastic_strain
    }

    pub fn plastic_strain(&self) -> &[f64] {
        &self.plastic_strain
    }

    /// Strain array a fit range refers to.
    pub fn basis_strain(&self, basis: StrainBasis) -> &[f64] {
        match basis {
            StrainBasis::True => &self.true_strain,
            StrainBasis::Plastic => &self.plastic_strain,
        }
    }

    /// Largest finite strain on `basis`, if any.
    pub fn max_strain(&self, basis: StrainBasis) -> Option<f64> {
        self.basis_strain(basis)
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    pub fn table(&self, kind: TableKind) -> CurveTable {
        match kind {
            TableKind::Nominal => self.nominal_table(),
            TableKind::True => self.true_table(),
            TableKind::Plastic => self.plastic_table(),
        }
    }

    pub fn nominal_table(&self) -> CurveTable {
        CurveTable {
            kind: TableKind::Nominal,
            strain_label: format!("nominal_{LABEL_STRAIN}"),
            stress_label: format!("nominal_{LABEL_STRESS}"),
            strain: self.nominal_strain.clone(),
            stress: self.nominal_stress.clone(),
        }
    }

    pub fn true_table(&self) -> CurveTable {
        CurveTable {
            kind: TableKind::True,
            strain_label: format!("true_{LABEL_STRAIN}"),
            stress_label: format!("true_{LABEL_STRESS}"),
            strain: self.true_strain.clone(),
            stress: self.true_stress.clone(),
        }
    }

    /// Rows with `plastic_strain > 0`, preceded by the yield point `(0, σ0)`.
    pub fn plastic_table(&self) -> CurveTable {
        let mut strain = vec![0.0];
        let mut stress = vec![self.yield_stress];
        for (&ep, &s) in self.plastic_strain.iter().zip(self.true_stress.iter()) {
            if ep > 0.0 {
                strain.push(ep);
                stress.push(s);
            }
        }

        CurveTable {
            kind: TableKind::Plastic,
            strain_label: format!("plastic_{LABEL_STRAIN}"),
            stress_label: format!("true_{LABEL_STRESS}"),
            strain,
            stress,
        }
    }
}
