//! Swift law: `σ = σ0·(1 + εp/α)^n`.

use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::models::model::{HardeningLaw, check_inverse};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swift {
    pub yield_stress: f64,
    pub alpha: f64,
    pub n: f64,
}

impl Swift {
    pub fn new(yield_stress: f64, alpha: f64, n: f64) -> Self {
        Self { yield_stress, alpha, n }
    }
}

impl HardeningLaw for Swift {
    const KIND: ModelKind = ModelKind::Swift;

    fn from_params(yield_stress: f64, [alpha, n]: [f64; 2]) -> Self {
        Self { yield_stress, alpha, n }
    }

    fn params(&self) -> [f64; 2] {
        [self.alpha, self.n]
    }

    fn yield_stress(&self) -> f64 {
        self.yield_stress
    }

    fn evaluate(&self, strain: f64) -> f64 {
        self.yield_stress * (1.0 + strain / self.alpha).powf(self.n)
    }

    fn invert(&self, stress: f64) -> Result<f64, FitError> {
        if self.yield_stress == 0.0 {
            return Err(self.domain_error(stress, "yield stress is zero"));
        }
        if self.n == 0.0 {
            return Err(self.domain_error(stress, "n is zero"));
        }
        if self.alpha == 0.0 {
            return Err(self.domain_error(stress, "alpha is zero"));
        }
        let ratio = stress / self.yield_stress;
        if ratio < 0.0 {
            return Err(self.domain_error(stress, "negative base under a fractional power"));
        }
        check_inverse(self, stress, self.alpha * (ratio.powf(1.0 / self.n) - 1.0))
    }
}
