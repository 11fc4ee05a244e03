//! Voce saturation law: `σ = σ∞ - (σ∞ - σ0)·exp(-h·εp)`.

use serde::{Deserialize, Serialize};

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::models::model::{HardeningLaw, check_inverse};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voce {
    pub yield_stress: f64,
    pub stress_infinite: f64,
    pub h: f64,
}

impl Voce {
    pub fn new(yield_stress: f64, stress_infinite: f64, h: f64) -> Self {
        Self {
            yield_stress,
            stress_infinite,
            h,
        }
    }
}

impl HardeningLaw for Voce {
    const KIND: ModelKind = ModelKind::Voce;

    fn from_params(yield_stress: f64, [stress_infinite, h]: [f64; 2]) -> Self {
        Self {
            yield_stress,
            stress_infinite,
            h,
        }
    }

    fn params(&self) -> [f64; 2] {
        [self.stress_infinite, self.h]
    }

    fn yield_stress(&self) -> f64 {
        self.yield_stress
    }

    fn evaluate(&self, strain: f64) -> f64 {
        self.stress_infinite - (self.stress_infinite - self.yield_stress) * (-self.h * strain).exp()
    }

    fn invert(&self, stress: f64) -> Result<f64, FitError> {
        let span = self.stress_infinite - self.yield_stress;
        if span == 0.0 {
            return Err(self.domain_error(stress, "saturation stress equals yield stress"));
        }
        if self.h == 0.0 {
            return Err(self.domain_error(stress, "h is zero"));
        }
        let arg = 1.0 - (stress - self.yield_stress) / span;
        if arg <= 0.0 {
            return Err(self.domain_error(stress, "stress at or beyond the saturation stress"));
        }
        check_inverse(self, stress, -arg.ln() / self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_saturates() {
        let m = Voce::new(250.0, 450.0, 8.0);
        assert_eq!(m.evaluate(0.0), 250.0);
        assert!((m.evaluate(10.0) - 450.0).abs() < 1e-9);
    }

    #[test]
    fn invert_round_trips() {
        let m = Voce::new(250.0, 450.0, 8.0);
        for &e in &[0.0, 0.001, 0.05, 0.2, 0.5] {
            let s = m.evaluate(e);
            let back = m.invert(s).unwrap();
            assert!((m.evaluate(back) - s).abs() < 1e-9, "e={e}");
        }
    }

    #[test]
    fn invert_rejects_stress_below_yield() {
        let m = Voce::new(250.0, 450.0, 8.0);
        assert!(matches!(m.invert(200.0), Err(FitError::Domain { model: ModelKind::Voce, .. })));
    }

    #[test]
    fn invert_rejects_saturation_and_degenerate_params() {
        let m = Voce::new(250.0, 450.0, 8.0);
        assert!(m.invert(450.0).is_err());
        assert!(m.invert(500.0).is_err());
        assert!(Voce::new(250.0, 250.0, 8.0).invert(260.0).is_err());
        assert!(Voce::new(250.0, 450.0, 0.0).invert(260.0).is_err());
    }
}
