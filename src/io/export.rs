//! Export sampled curves and tables to CSV.
//!
//! Two columns, `strain,stress`, one row per sample in sequence order. The
//! files are meant for FE material cards and spreadsheets.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::curve::CurveTable;
use crate::domain::{ExportCurve, ModelKind};
use crate::error::AppError;

pub const CURVE_HEADER: [&str; 2] = ["strain", "stress"];

/// Write an [`ExportCurve`] to a CSV file.
pub fn write_curve_csv(path: &Path, curve: &ExportCurve) -> Result<(), AppError> {
    let file = fs::File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_points(file, CURVE_HEADER, curve.points())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write a labelled [`CurveTable`] (e.g. `plastic_strain[-],true_stress[MPa]`).
pub fn write_table_csv<W: Write>(writer: W, table: &CurveTable) -> Result<(), AppError> {
    write_points(
        writer,
        [table.strain_label.as_str(), table.stress_label.as_str()],
        table.rows(),
    )
    .map_err(|e| AppError::new(2, format!("Failed to write table CSV: {e}")))
}

/// Write one CSV per model into `dir`, named `<model>.csv`.
///
/// Returns the written paths in input order.
pub fn write_curve_set(dir: &Path, curves: &[(ModelKind, ExportCurve)]) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::with_capacity(curves.len());
    for (kind, curve) in curves {
        let path = dir.join(format!("{}.csv", kind.display_name().to_lowercase()));
        write_curve_csv(&path, curve)?;
        log::info!("wrote {} samples to '{}'", curve.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

fn write_points<W, I>(writer: W, header: [&str; 2], points: I) -> Result<(), csv::Error>
where
    W: Write,
    I: Iterator<Item = (f64, f64)>,
{
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(header)?;
    for (strain, stress) in points {
        w.write_record([strain.to_string(), stress.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::StressStrainCurve;

    #[test]
    fn table_csv_has_labelled_header() {
        let curve = StressStrainCurve::from_nominal(
            vec![0.0, 0.05, 0.10],
            vec![0.0, 250.0, 300.0],
            200_000.0,
            240.0,
        )
        .unwrap();
        let mut buf = Vec::new();
        write_table_csv(&mut buf, &curve.plastic_table()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("plastic_strain[-],true_stress[MPa]"));
        assert_eq!(lines.next(), Some("0,240"));
    }

    #[test]
    fn curve_set_writes_one_file_per_model() {
        let dir = std::env::temp_dir().join(format!("hf-export-{}", std::process::id()));
        let curves = vec![
            (
                ModelKind::Ludwik,
                ExportCurve {
                    strain: vec![0.0, 0.1],
                    stress: vec![250.0, 400.0],
                },
            ),
            (ModelKind::Voce, ExportCurve::default()),
        ];
        let paths = write_curve_set(&dir, &curves).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("ludwik.csv"));

        let text = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(text, "strain,stress\n0,250\n0.1,400\n");
        let empty = fs::read_to_string(&paths[1]).unwrap();
        assert_eq!(empty, "strain,stress\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
