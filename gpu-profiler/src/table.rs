//! CSV tables exported by the profilers, addressed by column name

use crate::error::{AnalyzerError, Result};
use std::path::{Path, PathBuf};

/// A CSV file loaded into memory with its header row
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
}

impl CsvTable {
    /// Read a CSV file; a missing file is `MissingExport`
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AnalyzerError::MissingExport(path.to_path_buf()));
        }
        let reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_path(path)?;
        Self::from_reader(reader, path)
    }

    /// Parse CSV text; `path` is only used in diagnostics
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_reader(text.as_bytes());
        Self::from_reader(reader, path)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[csv::StringRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by header name; absence is an error
    pub fn column(&self, name: &'static str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| AnalyzerError::MissingColumn {
                path: self.path.clone(),
                column: name,
            })
    }

    /// Require exactly `expected` data rows
    pub fn expect_rows(&self, expected: usize) -> Result<()> {
        if self.rows.len() != expected {
            return Err(AnalyzerError::UnexpectedRowCount {
                path: self.path.clone(),
                expected,
                found: self.rows.len(),
            });
        }
        Ok(())
    }
}

/// Parse one reported number; empty cells and "n/a" are absent values.
///
/// Thousands separators are tolerated.
pub fn parse_number(field: &str, raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("n/a") {
        return Ok(None);
    }
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AnalyzerError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

/// Parse a number that must be present
pub fn require_number(field: &str, raw: &str) -> Result<f64> {
    parse_number(field, raw)?.ok_or_else(|| AnalyzerError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
    })
}
