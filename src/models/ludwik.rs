//! Ludwik power law: `σ = σ0 + k·εp^n`.

use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::models::model::{HardeningLaw, check_inverse};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ludwik {
    pub yield_stress: f64,
    pub k: f64,
    pub n: f64,
}

impl Ludwik {
    pub fn new(yield_stress: f64, k: f64, n: f64) -> Self {
        Self { yield_stress, k, n }
    }
}

impl HardeningLaw for Ludwik {
    const KIND: ModelKind = ModelKind::Ludwik;

    fn from_params(yield_stress: f64, [k, n]: [f64; 2]) -> Self {
        Self { yield_stress, k, n }
    }

    fn params(&self) -> [f64; 2] {
        [self.k, self.n]
    }

    fn yield_stress(&self) -> f64 {
        self.yield_stress
    }

    fn evaluate(&self, strain: f64) -> f64 {
        self.yield_stress + self.k * strain.powf(self.n)
    }

    fn invert(&self, stress: f64) -> Result<f64, FitError> {
        if self.k == 0.0 {
            return Err(self.domain_error(stress, "k is zero"));
        }
        if self.n == 0.0 {
            return Err(self.domain_error(stress, "n is zero"));
        }
        let base = (stress - self.yield_stress) / self.k;
        if base < 0.0 {
            return Err(self.domain_error(stress, "negative base under a fractional power"));
        }
        check_inverse(self, stress, base.powf(1.0 / self.n))
    }
}
