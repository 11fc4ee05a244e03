//! Synthetic tensile-test tables from a known hardening law.
//!
//! The generator works backwards from the law:
//!
//! 1. elastic branch: true stress `0 .. σ0` (exclusive) at `ε = σ/E`
//! 2. plastic branch: `εp` evenly spaced on `(0, max_plastic_strain]`,
//!    true stress `σ(εp)` plus Gaussian noise, `ε = εp + σ/E`
//! 3. true → nominal: `e = exp(ε) - 1`, `s = σ / (1 + e)`
//!
//! Feeding the result through the curve transform recovers the law's points
//! up to the injected noise.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::curve::RawTable;
use crate::error::FitError;
use crate::models::FittedLaw;

pub const STRAIN_COLUMN: &str = "strain";
pub const STRESS_COLUMN: &str = "stress";

/// Parameters for one synthetic curve.
#[derive(Debug, Clone)]
pub struct SynthSpec {
    pub law: FittedLaw,
    pub young_modulus: f64,
    pub max_plastic_strain: f64,
    pub elastic_points: usize,
    pub plastic_points: usize,
    /// Standard deviation of the stress noise, in MPa.
    pub noise_std: f64,
    pub seed: u64,
    /// Write strain in percent instead of dimensionless.
    pub percent_strain: bool,
}

impl SynthSpec {
    pub fn new(law: FittedLaw, young_modulus: f64) -> Self {
        Self {
            law,
            young_modulus,
            max_plastic_strain: 0.3,
            elastic_points: 5,
            plastic_points: 60,
            noise_std: 0.0,
            seed: 42,
            percent_strain: false,
        }
    }

    fn validate(&self) -> Result<(), FitError> {
        if !(self.young_modulus.is_finite() && self.young_modulus > 0.0) {
            return Err(FitError::invalid_input(format!(
                "Young's modulus must be > 0, got {}.",
                self.young_modulus
            )));
        }
        if !(self.max_plastic_strain.is_finite() && self.max_plastic_strain > 0.0) {
            return Err(FitError::invalid_input(format!(
                "Max plastic strain must be > 0, got {}.",
                self.max_plastic_strain
            )));
        }
        if self.plastic_points == 0 {
            return Err(FitError::invalid_input("Plastic point count must be > 0."));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(FitError::invalid_input(format!(
                "Noise std must be >= 0, got {}.",
                self.noise_std
            )));
        }
        let yield_stress = self.law.yield_stress();
        if !(yield_stress.is_finite() && yield_stress >= 0.0) {
            return Err(FitError::invalid_input(format!(
                "Yield stress must be >= 0, got {yield_stress}."
            )));
        }
        Ok(())
    }
}

/// Generate a nominal stress-strain table with `strain` and `stress` columns.
pub fn generate(spec: &SynthSpec) -> Result<RawTable, FitError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, spec.noise_std)
        .map_err(|e| FitError::invalid_input(format!("Noise distribution error: {e}")))?;

    let e_mod = spec.young_modulus;
    let sigma_0 = spec.law.yield_stress();
    let n_total = spec.elastic_points + spec.plastic_points;

    let mut true_strain = Vec::with_capacity(n_total);
    let mut true_stress = Vec::with_capacity(n_total);

    for i in 0..spec.elastic_points {
        let sigma = sigma_0 * i as f64 / spec.elastic_points as f64;
        true_strain.push(sigma / e_mod);
        true_stress.push(sigma);
    }

    for i in 1..=spec.plastic_points {
        let eps_p = spec.max_plastic_strain * i as f64 / spec.plastic_points as f64;
        let sigma = spec.law.evaluate(eps_p) + noise.sample(&mut rng);
        if !sigma.is_finite() {
            return Err(FitError::invalid_input(format!(
                "{} is not finite at plastic strain {eps_p}.",
                spec.law.kind()
            )));
        }
        true_strain.push(eps_p + sigma / e_mod);
        true_stress.push(sigma);
    }

    let scale = if spec.percent_strain { 100.0 } else { 1.0 };
    let (strain, stress): (Vec<f64>, Vec<f64>) = true_strain
        .iter()
        .zip(true_stress.iter())
        .map(|(&eps, &sigma)| {
            let e = eps.exp_m1();
            (e * scale, sigma / (1.0 + e))
        })
        .unzip();

    log::debug!(
        "generated {} synthetic rows for {} (seed {})",
        strain.len(),
        spec.law.kind(),
        spec.seed
    );

    RawTable::new(
        vec![STRAIN_COLUMN.to_string(), STRESS_COLUMN.to_string()],
        vec![strain, stress],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::StressStrainCurve;
    use crate::domain::ModelKind;

    fn ludwik() -> FittedLaw {
        FittedLaw::from_params(ModelKind::Ludwik, 250.0, [500.0, 0.2])
    }

    #[test]
    fn noiseless_table_transforms_back_onto_the_law() {
        let spec = SynthSpec::new(ludwik(), 200_000.0);
        let table = generate(&spec).unwrap();
        assert_eq!(table.n_rows(), 65);

        let sample = table.select(STRAIN_COLUMN, STRESS_COLUMN, false, 200_000.0, 250.0).unwrap();
        let curve = StressStrainCurve::from_sample(&sample).unwrap();
        let plastic = curve.plastic_table();
        assert_eq!(plastic.len(), 61);
        for (ep, s) in plastic.rows().skip(1) {
            assert!((spec.law.evaluate(ep) - s).abs() < 1e-6, "ep={ep}");
        }
    }

    #[test]
    fn same_seed_same_table() {
        let mut spec = SynthSpec::new(ludwik(), 200_000.0);
        spec.noise_std = 3.0;
        let a = generate(&spec).unwrap();
        let b = generate(&spec).unwrap();
        assert_eq!(a, b);

        spec.seed += 1;
        let c = generate(&spec).unwrap();
        assert_ne!(a.column(STRESS_COLUMN), c.column(STRESS_COLUMN));
    }

    #[test]
    fn percent_strain_is_scaled() {
        let mut spec = SynthSpec::new(ludwik(), 200_000.0);
        let plain = generate(&spec).unwrap();
        spec.percent_strain = true;
        let pct = generate(&spec).unwrap();
        let last = plain.n_rows() - 1;
        let a = plain.column(STRAIN_COLUMN).unwrap()[last];
        let b = pct.column(STRAIN_COLUMN).unwrap()[last];
        assert!((b - 100.0 * a).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut spec = SynthSpec::new(ludwik(), 0.0);
        assert!(matches!(generate(&spec), Err(FitError::InvalidInput(_))));
        spec.young_modulus = 200_000.0;
        spec.noise_std = -1.0;
        assert!(matches!(generate(&spec), Err(FitError::InvalidInput(_))));
    }
}
