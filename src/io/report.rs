//! Read/write fit report JSON files.
//!
//! A report is the portable record of one `hf fit` run:
//! - moduli, fit settings and sampling plan
//! - per-model parameters, R² and sampled curves (or the failure message)
//! - the plastic table, so the `plot` command can overlay data and fits
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::ReportFile;
use crate::error::AppError;

/// Write a report JSON file.
pub fn write_fit_report(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Read a report JSON file.
pub fn read_fit_report(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExportCurve, FitRange, FitSettings, ModelEntry, ModelKind, SamplingPlan};

    fn entry(curve: ExportCurve, curve_error: Option<String>) -> ModelEntry {
        ModelEntry {
            model: ModelKind::Ludwik,
            params: vec![("k".to_string(), 500.0), ("n".to_string(), -0.2)],
            yield_stress: 250.0,
            r_squared: Some(0.91),
            r_squared_error: None,
            r_squared_plastic: None,
            r_squared_plastic_error: Some("R² is undefined: constant stress".to_string()),
            iterations: 7,
            sse: 12.5,
            curve,
            curve_error,
        }
    }

    #[test]
    fn missing_curve_and_metric_reasons_survive_reload() {
        let report = ReportFile {
            tool: "hf".to_string(),
            generated_at: chrono::Utc::now(),
            source: "soft.csv".to_string(),
            young_modulus: 200_000.0,
            yield_stress: 250.0,
            settings: FitSettings::new(FitRange::new(0.0, 0.3).unwrap()),
            sampling: SamplingPlan::default(),
            best: Some(ModelKind::Ludwik),
            fits: vec![entry(
                ExportCurve::default(),
                Some("Ludwik: stress inf is outside the valid domain (sampled at strain 0)".to_string()),
            )],
            failures: Vec::new(),
            plastic: ExportCurve {
                strain: vec![0.0, 0.1],
                stress: vec![250.0, 300.0],
            },
        };

        let path = std::env::temp_dir().join(format!("hf-report-unit-{}.json", std::process::id()));
        write_fit_report(&path, &report).unwrap();
        let back = read_fit_report(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let fit = &back.fits[0];
        assert!(fit.curve.is_empty());
        assert!(fit.curve_error.as_deref().unwrap().contains("strain 0"));
        assert_eq!(fit.r_squared_error, None);
        assert_eq!(fit.r_squared_plastic_error, report.fits[0].r_squared_plastic_error);
    }

    #[test]
    fn optional_reasons_default_when_absent() {
        let json = serde_json::to_value(entry(
            ExportCurve {
                strain: vec![0.1],
                stress: vec![300.0],
            },
            None,
        ))
        .unwrap();
        assert!(json.get("curve_error").is_none());
        assert!(json.get("r_squared_error").is_none());

        let back: ModelEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.curve_error, None);
        assert_eq!(back.curve.len(), 1);
    }
}
