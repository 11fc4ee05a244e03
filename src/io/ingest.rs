//! CSV ingest.
//!
//! Turns a tensile-test export (header row + data rows) into a [`RawTable`].
//! Column selection, units and moduli are applied later by
//! [`RawTable::select`].
//!
//! Design goals:
//! - **Strict header** (missing/duplicate names are errors with exit code 2)
//! - **Row-level validation** (skip malformed rows, but report what happened)
//! - **Text columns tolerated**: a non-numeric cell is stored as NaN, and only
//!   the columns a fit selects must be numeric (see [`IngestedTable::record_missing`])
//! - **No interpretation**: no unit conversion or filtering here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::curve::RawTable;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: RawTable,
    /// Source line of each table row.
    pub lines: Vec<usize>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedTable {
    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.rows_used
    }

    /// Count rows whose value in any of `columns` is missing as skipped.
    ///
    /// The table itself is left as is; [`RawTable::select`] drops the same rows.
    /// Unknown column names are ignored here and reported by `select`.
    pub fn record_missing(&mut self, columns: &[&str]) {
        let missing = self.table.incomplete_rows(columns);
        for &row in &missing {
            let line = self.lines.get(row).copied().unwrap_or(row + 2);
            let empty: Vec<&str> = columns
                .iter()
                .copied()
                .filter(|c| self.table.column(c).is_some_and(|v| !v[row].is_finite()))
                .collect();
            let message = format!("no numeric value in {}", empty.join(", "));
            log::warn!("skipping line {line}: {message}");
            self.row_errors.push(RowError { line, message });
        }
        self.row_errors.sort_by_key(|e| e.line);
        self.rows_used -= missing.len();
    }
}

/// Read a CSV file with a header row into a [`RawTable`].
pub fn read_table(path: &Path) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = parse_table(file)?;
    log::info!(
        "read {} rows from '{}' ({} skipped)",
        ingested.rows_used,
        path.display(),
        ingested.rows_skipped()
    );
    Ok(ingested)
}

/// Parse CSV from any reader; see [`read_table`].
pub fn parse_table<R: Read>(reader: R) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = header_names(&headers)?;

    let mut data: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    let mut lines = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(values) => {
                for (col, v) in data.iter_mut().zip(values) {
                    col.push(v);
                }
                lines.push(line);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for err in &row_errors {
        log::warn!("skipping line {}: {}", err.line, err.message);
    }

    let rows_used = data.first().map_or(0, Vec::len);
    if rows_used == 0 {
        return Err(AppError::new(2, "No valid numeric rows found in CSV."));
    }

    let table = RawTable::new(columns, data)?;
    Ok(IngestedTable {
        table,
        lines,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn header_names(headers: &StringRecord) -> Result<Vec<String>, AppError> {
    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(AppError::new(2, "CSV has no header row."));
    }
    for (i, name) in columns.iter().enumerate() {
        if name.is_empty() {
            return Err(AppError::new(2, format!("CSV header column {} is empty.", i + 1)));
        }
        if columns[..i].contains(name) {
            return Err(AppError::new(2, format!("Duplicate CSV column: `{name}`")));
        }
    }
    Ok(columns)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Parse one record; cells that are not finite numbers become NaN.
fn parse_row(record: &StringRecord, columns: &[String]) -> Result<Vec<f64>, String> {
    if record.len() != columns.len() {
        return Err(format!(
            "expected {} fields, found {}",
            columns.len(),
            record.len()
        ));
    }
    let values: Vec<f64> = record.iter().map(|f| parse_f64(f).unwrap_or(f64::NAN)).collect();
    if values.iter().all(|v| v.is_nan()) {
        return Err("no numeric values".to_string());
    }
    Ok(values)
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
