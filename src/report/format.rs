//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::session::Session;
use crate::domain::{ModelKind, ReportFile};
use crate::fit::{FitOutcome, FitReport};
use crate::io::ingest::IngestedTable;

/// Format the run summary: input, moduli, curve extents and fit window.
pub fn format_run_summary(ingest: &IngestedTable, session: &Session) -> String {
    let mut out = String::new();
    let curve = session.curve();
    let plastic = curve.plastic_table();

    out.push_str("=== hf - Hardening-law fit ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.rows_skipped()
    ));
    out.push_str(&format!(
        "E={:.1} MPa | σ0={:.2} MPa | strain input: {}\n",
        curve.young_modulus,
        curve.yield_stress,
        if session.sample().is_percent_strain { "percent" } else { "dimensionless" }
    ));
    out.push_str(&format!(
        "True strain: max={} | plastic points: {}\n",
        fmt_opt(curve.max_strain(crate::domain::StrainBasis::True)),
        plastic.len() - 1
    ));

    if let Some(settings) = session.settings() {
        out.push_str(&format!(
            "Fit window: {:?} strain in ({:.5}, {:.5}] | max iterations: {}\n",
            settings.basis, settings.fit_range.low, settings.fit_range.high, settings.max_iterations
        ));
    }
    if let Some(outcome) = session.outcome() {
        out.push_str(&format!("Samples fitted: {}\n", outcome.samples.strain.len()));
    }
    out.push('\n');
    out
}

/// Format per-law results: parameters and R², or the failure message.
pub fn format_fit_results(outcome: &FitOutcome) -> String {
    let mut out = String::new();

    out.push_str("Model results:\n");
    out.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>10} {:>10} {:>6}\n",
        "model", "p1", "p2", "R²(fit)", "R²(plast)", "iters"
    ));
    out.push_str(&format!(
        "  {:-<8} {:-<12} {:-<12} {:-<10} {:-<10} {:-<6}\n",
        "", "", "", "", "", ""
    ));

    for (kind, result) in &outcome.results {
        let chosen = if outcome.best == Some(*kind) { "*" } else { " " };
        match result {
            Ok(r) => out.push_str(&format_row(chosen, *kind, r)),
            Err(e) => out.push_str(&format!("{chosen} {:<8} failed: {e}\n", kind.display_name())),
        }
    }

    out.push('\n');
    for r in outcome.successes() {
        out.push_str(&format!("{:<8} {}\n", r.law.kind().display_name(), r.law.formula()));
    }
    match outcome.best {
        Some(kind) => out.push_str(&format!("\nBest by R²: {kind}\n")),
        None => out.push_str("\nNo law produced a usable fit.\n"),
    }
    out
}

fn format_row(chosen: &str, kind: ModelKind, r: &FitReport) -> String {
    let [p1, p2] = r.law.params();
    let mut out = format!(
        "{chosen} {:<8} {:>12} {:>12} {:>10} {:>10} {:>6}\n",
        kind.display_name(),
        fmt_param(p1),
        fmt_param(p2),
        fmt_r2(r.r_squared.as_ref().ok().copied()),
        fmt_r2(r.r_squared_plastic.as_ref().ok().copied()),
        r.iterations
    );
    for (label, metric) in [("R²(fit)", &r.r_squared), ("R²(plast)", &r.r_squared_plastic)] {
        if let Err(e) = metric {
            out.push_str(&format!("  {:<8} {label}: {e}\n", ""));
        }
    }
    if r.is_worse_than_mean() {
        out.push_str(&format!("  {:<8} worse than the mean stress; try another initial guess\n", ""));
    }
    out
}

/// Short summary of a saved report, printed above the plot.
pub fn format_report_summary(report: &ReportFile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} report for '{}' ({})\n",
        report.tool,
        report.source,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "E={:.1} MPa | σ0={:.2} MPa\n",
        report.young_modulus, report.yield_stress
    ));
    for fit in &report.fits {
        let chosen = if report.best == Some(fit.model) { "*" } else { " " };
        let params = fit
            .params
            .iter()
            .map(|(name, v)| format!("{name}={}", fmt_param(*v)))
            .collect::<Vec<_>>()
            .join(" ");
        let r2 = match (&fit.r_squared, &fit.r_squared_error) {
            (None, Some(reason)) => format!("n/a ({reason})"),
            (r2, _) => fmt_r2(*r2),
        };
        out.push_str(&format!("{chosen} {:<8} {params} R²={r2}\n", fit.model.display_name()));
        if let Some(reason) = &fit.curve_error {
            out.push_str(&format!("  {:<8} no curve: {reason}\n", ""));
        }
    }
    for failure in &report.failures {
        out.push_str(&format!("  {:<8} failed: {}\n", failure.model.display_name(), failure.error));
    }
    out
}

fn fmt_param(v: f64) -> String {
    if v != 0.0 && (v.abs() < 1e-3 || v.abs() >= 1e6) {
        format!("{v:.4e}")
    } else {
        format!("{v:.5}")
    }
}

fn fmt_r2(v: Option<f64>) -> String {
    v.map(|r| format!("{r:.6}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.5}")).unwrap_or_else(|| "n/a".to_string())
}
