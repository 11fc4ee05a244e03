//! Shared "fit pipeline" logic behind `hf fit`.
//!
//! Keeping this in one place avoids mixing the workflow with presentation:
//! CSV ingest -> sample selection -> curve transform -> fits -> sampled exports -> report
//!
//! `app` then only decides what to print and which files to write.

use std::path::Path;

use chrono::Utc;

use crate::app::session::{ExportSet, Session};
use crate::curve::RawTable;
use crate::domain::{ExportCurve, FitConfig, FitRange, FitSettings, ModelEntry, ModelFailure, ReportFile};
use crate::error::AppError;
use crate::fit::FitOutcome;
use crate::io::ingest::{IngestedTable, read_table};

pub const TOOL_NAME: &str = "hf";

/// All computed outputs of a single `hf fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedTable,
    pub session: Session,
    pub report: ReportFile,
}

impl RunOutput {
    pub fn outcome(&self) -> Option<&FitOutcome> {
        self.session.outcome()
    }

    pub fn exports(&self) -> Option<&ExportSet> {
        self.session.exports()
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = read_table(&config.csv_path)?;
    run_fit_with_table(config, ingest)
}

/// Execute the pipeline on an already-ingested table.
pub fn run_fit_with_table(config: &FitConfig, mut ingest: IngestedTable) -> Result<RunOutput, AppError> {
    let mut session = open_session(&ingest.table, config)?;
    ingest.record_missing(&[config.strain_column.as_str(), config.stress_column.as_str()]);

    let fit_range = match config.fit_range {
        Some((low, high)) => FitRange::new(low, high)?,
        None => session.default_fit_range(config.basis)?,
    };
    let settings = FitSettings {
        fit_range,
        initial_guesses: config.initial_guesses,
        max_iterations: config.max_iterations,
        basis: config.basis,
    };

    session.fit(settings)?;
    session.export(config.sampling)?;

    let report = build_report(&session, &config.csv_path)?;

    Ok(RunOutput {
        ingest,
        session,
        report,
    })
}

/// Select the configured columns and transform them into a session.
pub fn open_session(table: &RawTable, config: &FitConfig) -> Result<Session, AppError> {
    let sample = table.select(
        &config.strain_column,
        &config.stress_column,
        config.is_percent_strain,
        config.young_modulus,
        config.yield_stress,
    )?;
    Ok(Session::new(sample)?)
}

/// Flatten a fitted, exported session into the portable report schema.
pub fn build_report(session: &Session, source: &Path) -> Result<ReportFile, AppError> {
    let (Some(settings), Some(outcome), Some(exports)) =
        (session.settings(), session.outcome(), session.exports())
    else {
        return Err(AppError::new(4, "Session has no fit/export to report."));
    };

    let mut fits = Vec::new();
    let mut failures = Vec::new();
    for (kind, result) in &outcome.results {
        match result {
            Ok(r) => fits.push(ModelEntry {
                model: *kind,
                params: r.law.named_params(),
                yield_stress: r.law.yield_stress(),
                r_squared: r.r_squared.as_ref().ok().copied(),
                r_squared_error: r.r_squared.as_ref().err().map(ToString::to_string),
                r_squared_plastic: r.r_squared_plastic.as_ref().ok().copied(),
                r_squared_plastic_error: r.r_squared_plastic.as_ref().err().map(ToString::to_string),
                iterations: r.iterations,
                sse: r.sse,
                curve: exports.get(*kind).cloned().unwrap_or_default(),
                curve_error: exports.failure(*kind).map(ToString::to_string),
            }),
            Err(e) => failures.push(ModelFailure {
                model: *kind,
                error: e.to_string(),
            }),
        }
    }

    let curve = session.curve();
    let plastic = curve.plastic_table();

    Ok(ReportFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        source: source.display().to_string(),
        young_modulus: curve.young_modulus,
        yield_stress: curve.yield_stress,
        settings: settings.clone(),
        sampling: exports.plan,
        best: outcome.best,
        fits,
        failures,
        plastic: ExportCurve {
            strain: plastic.strain,
            stress: plastic.stress,
        },
    })
}
