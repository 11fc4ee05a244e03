//! Strain grids for plotting and export.
//!
//! Hardening curves are steepest right after yield, so an evenly spaced grid
//! either wastes points at large strain or under-resolves the knee. We build
//! a piecewise-uniform grid instead:
//!
//! - `floor(N·(dlo-lo)/(hi-lo))` points on `[lo, dlo]`
//! - `D` points on the detail window `[dlo, dhi]`
//! - `floor(N·(hi-dhi)/(hi-lo))` points on `[dhi, hi]`
//!
//! The segments share their boundary points; the result is sorted and
//! de-duplicated so it is strictly increasing.

use crate::domain::{ExportCurve, SamplingPlan};
use crate::error::FitError;
use crate::models::HardeningLaw;

/// Generate `num` evenly spaced points between `start` and `end` (inclusive).
///
/// `num = 1` yields `[start]`; `num = 0` yields nothing.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num as f64 - 1.0);
            let mut out: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            // Pin the endpoint so neighbouring segments meet exactly.
            out[num - 1] = end;
            out
        }
    }
}

/// Piecewise-uniform strain grid with extra density on `detail_range`.
pub fn detail_grid(
    range: (f64, f64),
    num_points: usize,
    detail_range: (f64, f64),
    detail_points: usize,
) -> Result<Vec<f64>, FitError> {
    let (lo, hi) = range;
    let (dlo, dhi) = detail_range;

    if ![lo, hi, dlo, dhi].iter().all(|v| v.is_finite()) {
        return Err(FitError::invalid_range(format!(
            "Bounds must be finite: range=({lo}, {hi}), detail=({dlo}, {dhi})."
        )));
    }
    if hi <= lo {
        return Err(FitError::invalid_range(format!(
            "Sampling range must satisfy lo < hi, got ({lo}, {hi})."
        )));
    }
    if dlo < lo || dhi > hi || dhi < dlo {
        return Err(FitError::invalid_range(format!(
            "Detail range ({dlo}, {dhi}) must lie inside ({lo}, {hi})."
        )));
    }

    let span = hi - lo;
    let n_before = (num_points as f64 * (dlo - lo) / span).floor() as usize;
    let n_after = (num_points as f64 * (hi - dhi) / span).floor() as usize;

    let mut grid = Vec::with_capacity(n_before + detail_points + n_after);
    grid.extend(linspace(lo, dlo, n_before));
    grid.extend(linspace(dlo, dhi, detail_points));
    grid.extend(linspace(dhi, hi, n_after));

    grid.sort_by(f64::total_cmp);
    grid.dedup();
    Ok(grid)
}

/// Evaluate `model` on the grid described by `plan`.
///
/// Fails with a `Domain` error at the first strain whose stress is not finite
/// (e.g. Ludwik with `n < 0` at zero strain).
pub fn sample_law<M: HardeningLaw>(model: &M, plan: &SamplingPlan) -> Result<ExportCurve, FitError> {
    let strain = detail_grid(plan.range, plan.num_points, plan.detail_range, plan.detail_points)?;
    let stress = model.evaluate_all(&strain);
    if let Some((e, s)) = strain.iter().zip(&stress).find(|(_, s)| !s.is_finite()) {
        return Err(model.domain_error(*s, format!("sampled at strain {e}")));
    }
    Ok(ExportCurve { strain, stress })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;
    use crate::models::{Ludwik, Swift};

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(0.0, 0.05, 6);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[5], 0.05);
        assert!((v[1] - 0.01).abs() < 1e-15);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn default_plan_shape() {
        // range (0, 0.5), N = 20, detail (0, 0.05), D = 50:
        // before = 0, detail = 50, after = floor(20 * 0.45 / 0.5) = 18, sharing 0.05.
        let grid = detail_grid((0.0, 0.5), 20, (0.0, 0.05), 50).unwrap();
        assert_eq!(grid.len(), 50 + 18 - 1);
        assert_eq!(grid[0], 0.0);
        assert_eq!(*grid.last().unwrap(), 0.5);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn interior_detail_window_merges_both_boundaries() {
        let grid = detail_grid((0.0, 1.0), 10, (0.2, 0.4), 5).unwrap();
        // before: 2 points [0, 0.2]; detail: 5 on [0.2, 0.4]; after: 6 on [0.4, 1.0].
        assert_eq!(grid.len(), 2 + 5 + 6 - 2);
        assert_eq!(grid.iter().filter(|&&x| x == 0.2).count(), 1);
        assert_eq!(grid.iter().filter(|&&x| x == 0.4).count(), 1);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        assert!(matches!(
            detail_grid((0.5, 0.5), 10, (0.5, 0.5), 5),
            Err(FitError::InvalidRange(_))
        ));
        assert!(matches!(
            detail_grid((0.0, 0.5), 10, (0.0, 0.6), 5),
            Err(FitError::InvalidRange(_))
        ));
        assert!(matches!(
            detail_grid((0.0, 0.5), 10, (0.3, 0.2), 5),
            Err(FitError::InvalidRange(_))
        ));
    }

    #[test]
    fn sample_law_pairs_strain_with_stress() {
        let m = Ludwik::new(250.0, 500.0, 0.2);
        let curve = sample_law(&m, &SamplingPlan::default()).unwrap();
        assert_eq!(curve.strain.len(), curve.stress.len());
        for (e, s) in curve.points() {
            assert_eq!(s, m.evaluate(e));
        }
        assert_eq!(curve.stress[0], 250.0);
    }

    #[test]
    fn non_finite_samples_are_domain_errors() {
        let plan = SamplingPlan::default();

        // n < 0 puts a pole at zero strain.
        let err = sample_law(&Ludwik::new(250.0, 500.0, -0.2), &plan).unwrap_err();
        assert!(matches!(
            err,
            FitError::Domain { model: ModelKind::Ludwik, stress, ref reason }
                if stress.is_infinite() && reason.contains("strain 0")
        ));

        // alpha < 0 takes a fractional power of a negative base.
        let err = sample_law(&Swift::new(250.0, -0.02, 0.25), &plan).unwrap_err();
        assert!(matches!(err, FitError::Domain { model: ModelKind::Swift, stress, .. } if stress.is_nan()));
    }
}
