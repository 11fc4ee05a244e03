//! Levenberg–Marquardt nonlinear least squares.
//!
//! We minimize `‖r(p)‖²` where `r` is the residual vector of a model against
//! observations. Each iteration solves the damped Gauss–Newton step
//!
//! ```text
//! minimize ‖J δ + r‖² + λ ‖D δ‖²
//! ```
//!
//! as the stacked linear problem `[J; √λ·D] δ = [-r; 0]` (see
//! [`solve_least_squares`]). `D` is Marquardt's scaling, the column norms of
//! `J`, so the damping is invariant to parameter units (a Ludwik `k` of 500
//! and an exponent `n` of 0.2 get comparable treatment).
//!
//! The Jacobian is a forward difference with a relative step of `√ε`, which
//! is what MINPACK's `lmdif` does when no analytic derivative is supplied.
//!
//! Trial points whose residuals are non-finite (e.g. a negative base raised
//! to a fractional power) are treated as rejected steps: λ grows and the
//! solver retreats towards a short gradient step.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::math::solve_least_squares;

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 10.0;

/// Floor for Marquardt scaling so a dead Jacobian column still gets damped.
const SCALE_FLOOR: f64 = 1e-12;

/// Solver stopping rules.
#[derive(Debug, Clone, Copy)]
pub struct LmOptions {
    /// Cap on damped-step attempts (accepted or rejected).
    pub max_iterations: usize,
    /// Relative reduction in the sum of squares below which we stop.
    pub ftol: f64,
    /// Relative step size below which we stop.
    pub xtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
        }
    }
}

impl LmOptions {
    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..Self::default()
        }
    }
}

/// Converged solution.
#[derive(Debug, Clone)]
pub struct LmSolution {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
}

/// Why the solver stopped without a solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LmFailure {
    #[error("residuals are not finite at the initial guess")]
    NonFiniteStart,
    #[error("Jacobian is not finite after {iterations} iterations")]
    NonFiniteJacobian { iterations: usize },
    #[error("damped step system is singular after {iterations} iterations")]
    Singular { iterations: usize },
    #[error("iteration cap of {iterations} reached (sse={sse:.6e})")]
    IterationCap { iterations: usize, sse: f64 },
}

impl LmFailure {
    pub fn iterations(&self) -> usize {
        match self {
            LmFailure::NonFiniteStart => 0,
            LmFailure::NonFiniteJacobian { iterations }
            | LmFailure::Singular { iterations }
            | LmFailure::IterationCap { iterations, .. } => *iterations,
        }
    }
}

/// Minimize the squared norm of `residuals(p)` starting from `x0`.
///
/// `residuals` may return non-finite entries for parameters outside the
/// model's domain; such trial points are rejected.
pub fn minimize<F>(residuals: F, x0: &[f64], opts: &LmOptions) -> Result<LmSolution, LmFailure>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = x0.len();
    let mut x = DVector::from_column_slice(x0);
    let mut r = DVector::from_vec(residuals(x.as_slice()));
    if x.iter().any(|v| !v.is_finite()) || r.iter().any(|v| !v.is_finite()) {
        return Err(LmFailure::NonFiniteStart);
    }
    let m = r.len();

    let mut sse = r.norm_squared();
    if sse == 0.0 {
        return Ok(LmSolution {
            params: x.iter().copied().collect(),
            sse,
            iterations: 0,
        });
    }

    let mut jac = jacobian(&residuals, &x, &r).ok_or(LmFailure::NonFiniteJacobian { iterations: 0 })?;
    let mut lambda = LAMBDA_INIT;

    for iteration in 1..=opts.max_iterations {
        // Stack [J; √λ·D] and [-r; 0].
        let mut a = DMatrix::<f64>::zeros(m + n, n);
        let mut b = DVector::<f64>::zeros(m + n);
        a.view_mut((0, 0), (m, n)).copy_from(&jac);
        for i in 0..m {
            b[i] = -r[i];
        }
        let sqrt_lambda = lambda.sqrt();
        for j in 0..n {
            let d = jac.column(j).norm().max(SCALE_FLOOR);
            a[(m + j, j)] = sqrt_lambda * d;
        }

        let delta = solve_least_squares(&a, &b).ok_or(LmFailure::Singular { iterations: iteration })?;
        let step_small = delta.norm() <= opts.xtol * (x.norm() + opts.xtol);

        let x_trial = &x + &delta;
        let r_trial = DVector::from_vec(residuals(x_trial.as_slice()));
        let sse_trial = if r_trial.iter().all(|v| v.is_finite()) && x_trial.iter().all(|v| v.is_finite()) {
            r_trial.norm_squared()
        } else {
            f64::INFINITY
        };

        if sse_trial < sse {
            let reduction = (sse - sse_trial) / sse;
            x = x_trial;
            r = r_trial;
            sse = sse_trial;
            lambda = (lambda / LAMBDA_DOWN).max(LAMBDA_MIN);

            if sse == 0.0 || reduction <= opts.ftol || step_small {
                log::debug!("lm converged after {iteration} iterations (sse={sse:.6e})");
                return Ok(LmSolution {
                    params: x.iter().copied().collect(),
                    sse,
                    iterations: iteration,
                });
            }

            jac = jacobian(&residuals, &x, &r)
                .ok_or(LmFailure::NonFiniteJacobian { iterations: iteration })?;
        } else {
            // No descent: either we are sitting on the minimum to working
            // precision or the damping needs to grow.
            if step_small || lambda >= LAMBDA_MAX {
                log::debug!("lm stalled at a stationary point after {iteration} iterations (sse={sse:.6e})");
                return Ok(LmSolution {
                    params: x.iter().copied().collect(),
                    sse,
                    iterations: iteration,
                });
            }
            lambda = (lambda * LAMBDA_UP).min(LAMBDA_MAX);
        }
    }

    Err(LmFailure::IterationCap {
        iterations: opts.max_iterations,
        sse,
    })
}

/// Forward-difference Jacobian `∂r_i/∂p_j`.
fn jacobian<F>(residuals: &F, x: &DVector<f64>, r: &DVector<f64>) -> Option<DMatrix<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let eps = f64::EPSILON.sqrt();
    let m = r.len();
    let n = x.len();
    let mut jac = DMatrix::<f64>::zeros(m, n);
    let mut xp = x.clone();

    for j in 0..n {
        let mut h = eps * x[j].abs();
        if h == 0.0 {
            h = eps;
        }
        xp[j] = x[j] + h;
        let rp = residuals(xp.as_slice());
        xp[j] = x[j];
        if rp.len() != m {
            return None;
        }
        for i in 0..m {
            let d = (rp[i] - r[i]) / h;
            if !d.is_finite() {
                return None;
            }
            jac[(i, j)] = d;
        }
    }

    Some(jac)
}
