//! Raw tabular input and the user's column/unit/modulus selection.

use crate::error::FitError;

/// Columns as read from a source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// One vector per column, all of the same length. Blank or non-numeric
    /// cells are NaN.
    pub data: Vec<Vec<f64>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, data: Vec<Vec<f64>>) -> Result<Self, FitError> {
        if columns.len() != data.len() {
            return Err(FitError::invalid_input(format!(
                "Table has {} column names but {} data columns.",
                columns.len(),
                data.len()
            )));
        }
        if let Some(first) = data.first() {
            if let Some((i, col)) = data.iter().enumerate().find(|(_, c)| c.len() != first.len()) {
                return Err(FitError::invalid_input(format!(
                    "Column '{}' has {} rows, expected {}.",
                    columns[i],
                    col.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { columns, data })
    }

    pub fn n_rows(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.data[i].as_slice())
    }

    /// Indices of rows where any of `columns` holds a non-finite value.
    pub fn incomplete_rows(&self, columns: &[&str]) -> Vec<usize> {
        let cols: Vec<&[f64]> = columns.iter().filter_map(|c| self.column(c)).collect();
        (0..self.n_rows())
            .filter(|&i| cols.iter().any(|c| !c[i].is_finite()))
            .collect()
    }

    /// Build a [`RawSample`] from two named columns.
    ///
    /// Rows without a numeric value in both columns are dropped.
    pub fn select(
        &self,
        strain_column: &str,
        stress_column: &str,
        is_percent_strain: bool,
        young_modulus: f64,
        yield_stress: f64,
    ) -> Result<RawSample, FitError> {
        let strain = self.column(strain_column).ok_or_else(|| {
            FitError::invalid_input(format!(
                "Missing strain column '{strain_column}'. Available: {}.",
                self.columns.join(", ")
            ))
        })?;
        let stress = self.column(stress_column).ok_or_else(|| {
            FitError::invalid_input(format!(
                "Missing stress column '{stress_column}'. Available: {}.",
                self.columns.join(", ")
            ))
        })?;

        let (strain, stress): (Vec<f64>, Vec<f64>) = strain
            .iter()
            .zip(stress)
            .filter(|(e, s)| e.is_finite() && s.is_finite())
            .map(|(&e, &s)| (e, s))
            .unzip();
        let dropped = self.n_rows() - strain.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} rows without numeric '{strain_column}' and '{stress_column}'");
        }
        if strain.is_empty() && self.n_rows() > 0 {
            return Err(FitError::invalid_input(format!(
                "No row has numeric values in both '{strain_column}' and '{stress_column}'."
            )));
        }

        RawSample::new(
            strain,
            stress,
            is_percent_strain,
            young_modulus,
            yield_stress,
        )
    }
}

/// Selected strain/stress samples plus the scalars the transform needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    strain: Vec<f64>,
    stress: Vec<f64>,
    pub is_percent_strain: bool,
    pub young_modulus: f64,
    pub yield_stress: f64,
}

impl RawSample {
    pub fn new(
        strain: Vec<f64>,
        stress: Vec<f64>,
        is_percent_strain: bool,
        young_modulus: f64,
        yield_stress: f64,
    ) -> Result<Self, FitError> {
        if strain.len() != stress.len() {
            return Err(FitError::invalid_input(format!(
                "Strain has {} samples but stress has {}.",
                strain.len(),
                stress.len()
            )));
        }
        check_moduli(young_modulus, yield_stress)?;
        Ok(Self {
            strain,
            stress,
            is_percent_strain,
            young_modulus,
            yield_stress,
        })
    }

    /// Replace the unit flag and moduli, keeping the samples.
    pub fn reconfigure(
        &mut self,
        is_percent_strain: bool,
        young_modulus: f64,
        yield_stress: f64,
    ) -> Result<(), FitError> {
        check_moduli(young_modulus, yield_stress)?;
        self.is_percent_strain = is_percent_strain;
        self.young_modulus = young_modulus;
        self.yield_stress = yield_stress;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.strain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strain.is_empty()
    }

    /// Strain as entered (percent or dimensionless).
    pub fn raw_strain(&self) -> &[f64] {
        &self.strain
    }

    /// Dimensionless nominal strain (percent values scaled by 0.01).
    pub fn nominal_strain(&self) -> Vec<f64> {
        if self.is_percent_strain {
            self.strain.iter().map(|e| e * 0.01).collect()
        } else {
            self.strain.clone()
        }
    }

    pub fn nominal_stress(&self) -> &[f64] {
        &self.stress
    }
}

/// Validate the scalars shared by [`RawSample`] and the curve transform.
pub(crate) fn check_moduli(young_modulus: f64, yield_stress: f64) -> Result<(), FitError> {
    if !(young_modulus.is_finite() && young_modulus > 0.0) {
        return Err(FitError::invalid_input(format!(
            "Young's modulus must be > 0, got {young_modulus}."
        )));
    }
    if !(yield_stress.is_finite() && yield_stress >= 0.0) {
        return Err(FitError::invalid_input(format!(
            "Yield stress must be >= 0, got {yield_stress}."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            vec!["e".to_string(), "s".to_string()],
            vec![vec![0.0, 5.0, 10.0], vec![0.0, 250.0, 300.0]],
        )
        .unwrap()
    }

    #[test]
    fn select_scales_percent_strain() {
        let sample = table().select("e", "s", true, 200_000.0, 240.0).unwrap();
        let strain = sample.nominal_strain();
        assert!((strain[1] - 0.05).abs() < 1e-15);
        assert!((strain[2] - 0.10).abs() < 1e-15);
        assert_eq!(sample.raw_strain()[1], 5.0);
    }

    #[test]
    fn select_reports_missing_column() {
        let err = table().select("strain", "s", false, 200_000.0, 240.0).unwrap_err();
        assert!(matches!(err, FitError::InvalidInput(ref m) if m.contains("strain")));
    }

    #[test]
    fn rejects_bad_modulus_and_yield() {
        assert!(RawSample::new(vec![0.0], vec![0.0], false, 0.0, 10.0).is_err());
        assert!(RawSample::new(vec![0.0], vec![0.0], false, 1.0, -1.0).is_err());
        assert!(RawSample::new(vec![0.0, 1.0], vec![0.0], false, 1.0, 1.0).is_err());
    }

    #[test]
    fn reconfigure_keeps_samples_and_rejects_bad_values() {
        let mut sample = table().select("e", "s", false, 200_000.0, 240.0).unwrap();
        sample.reconfigure(true, 70_000.0, 100.0).unwrap();
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.young_modulus, 70_000.0);
        assert!(sample.reconfigure(true, -1.0, 100.0).is_err());
        assert_eq!(sample.young_modulus, 70_000.0);
    }

    #[test]
    fn select_drops_rows_missing_either_value() {
        let t = RawTable::new(
            vec!["id".to_string(), "e".to_string(), "s".to_string()],
            vec![
                vec![f64::NAN; 4],
                vec![0.0, f64::NAN, 0.1, 0.15],
                vec![0.0, 250.0, f64::NAN, 320.0],
            ],
        )
        .unwrap();
        assert_eq!(t.incomplete_rows(&["e", "s"]), vec![1, 2]);
        assert_eq!(t.incomplete_rows(&["id"]), vec![0, 1, 2, 3]);

        let sample = t.select("e", "s", false, 200_000.0, 240.0).unwrap();
        assert_eq!(sample.raw_strain(), &[0.0, 0.15]);
        assert_eq!(sample.nominal_stress(), &[0.0, 320.0]);

        let err = t.select("id", "s", false, 200_000.0, 240.0).unwrap_err();
        assert!(matches!(err, FitError::InvalidInput(ref m) if m.contains("'id'")));
    }

    #[test]
    fn ragged_table_is_rejected() {
        let err = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, FitError::InvalidInput(_)));
    }
}
