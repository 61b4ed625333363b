//! In-memory Nsight Compute report
//!
//! A report holds profiling ranges; each range holds kernel actions, and each
//! action exposes counter values by Nsight Compute counter name. Reports are
//! read from the raw page that `ncu --import ... --page raw --csv` prints: a
//! header row of column names, a row of units, then one row per kernel.

use super::counters::counter_name;
use crate::error::{AnalyzerError, Result};
use crate::table::parse_number;
use kernelscope_shared::utils::units::to_base_units;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Column holding the kernel's name
pub const KERNEL_NAME_COLUMN: &str = "Kernel Name";

/// One kernel execution recorded in a report
#[derive(Debug, Clone, Default)]
pub struct KernelAction {
    pub name: String,
    values: HashMap<String, f64>,
}

impl KernelAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Set a value by short counter name (builder style)
    pub fn with_counter(mut self, short: &str, value: f64) -> Self {
        if let Some(full) = counter_name(short) {
            self.values.insert(full.to_string(), value);
        }
        self
    }

    /// Set a value by full Nsight Compute counter name
    pub fn insert(&mut self, counter: impl Into<String>, value: f64) {
        self.values.insert(counter.into(), value);
    }

    /// Value by full Nsight Compute counter name
    pub fn metric_by_name(&self, counter: &str) -> Option<f64> {
        self.values.get(counter).copied()
    }

    /// Value by short counter name; absence is an error
    pub fn counter(&self, short: &str) -> Result<f64> {
        let missing = || AnalyzerError::MissingCounter {
            kernel: self.name.clone(),
            counter: short.to_string(),
        };
        let full = counter_name(short).ok_or_else(missing)?;
        self.metric_by_name(full).ok_or_else(missing)
    }
}

/// A profiling range: the kernel actions recorded within it
#[derive(Debug, Clone, Default)]
pub struct NcuRange {
    pub actions: Vec<KernelAction>,
}

impl NcuRange {
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NcuReport {
    pub ranges: Vec<NcuRange>,
}

impl NcuReport {
    pub fn num_ranges(&self) -> usize {
        self.ranges.len()
    }

    /// The first range; the only one the analysis looks at
    pub fn default_range(&self) -> Option<&NcuRange> {
        self.ranges.first()
    }

    /// Parse the raw page CSV, keeping the given counters.
    ///
    /// Output with no CSV at all yields a report with no ranges. Every
    /// counter in `counters` must have a column.
    pub fn from_raw_csv(text: &str, counters: &[&'static str], source: &Path) -> Result<Self> {
        // ncu prefixes its own diagnostics with "==PROF==", "==WARNING==", ...
        let body: String = text
            .lines()
            .skip_while(|line| line.trim().is_empty() || line.starts_with("=="))
            .collect::<Vec<_>>()
            .join("\n");
        if body.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(false)
            .from_reader(body.as_bytes());
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let name_idx = column(KERNEL_NAME_COLUMN);
        let mut counter_columns = Vec::with_capacity(counters.len());
        for &counter in counters {
            let idx = column(counter).ok_or_else(|| AnalyzerError::MissingColumn {
                path: source.to_path_buf(),
                column: counter,
            })?;
            counter_columns.push((counter, idx));
        }

        let mut records = reader.records();
        let units = match records.next().transpose()? {
            Some(units) => units,
            None => {
                return Ok(Self {
                    ranges: vec![NcuRange::default()],
                })
            }
        };

        let mut actions = Vec::new();
        for (i, record) in records.enumerate() {
            let record = record?;
            let name = name_idx
                .and_then(|idx| record.get(idx))
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("kernel_{}", i));

            let mut action = KernelAction::new(name);
            for &(counter, idx) in &counter_columns {
                let raw = record.get(idx).unwrap_or("").trim();
                if let Some(value) = parse_number(counter, raw)? {
                    let unit = units.get(idx).unwrap_or("");
                    action.insert(counter, to_base_units(value, unit));
                }
            }
            actions.push(action);
        }

        debug!(
            "Parsed {} kernel action(s) from {}",
            actions.len(),
            source.display()
        );

        Ok(Self {
            ranges: vec![NcuRange { actions }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTERS: &[&str] = &["dram__bytes_read.sum", "gpu__time_duration.sum"];

    #[test]
    fn test_parse_raw_page() {
        let csv = "\
==PROF== Connected to process
\"ID\",\"Kernel Name\",\"gpu__time_duration.sum\",\"dram__bytes_read.sum\"
\"\",\"\",\"usecond\",\"Kbyte\"
\"0\",\"gemm\",\"2.5\",\"1,024\"
\"1\",\"relu\",\"1\",\"4\"
";
        let report = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r.ncu-rep")).unwrap();
        assert_eq!(report.num_ranges(), 1);

        let range = report.default_range().unwrap();
        assert_eq!(range.num_actions(), 2);
        assert_eq!(range.actions[0].name, "gemm");
        assert_eq!(range.actions[0].counter("duration").unwrap(), 2_500.0);
        assert_eq!(range.actions[0].counter("dram_bytes_read").unwrap(), 1_024_000.0);
        assert_eq!(range.actions[1].counter("dram_bytes_read").unwrap(), 4_000.0);
    }

    #[test]
    fn test_reordered_columns() {
        let csv = "\
\"dram__bytes_read.sum\",\"Kernel Name\",\"gpu__time_duration.sum\"
\"byte\",\"\",\"nsecond\"
\"64\",\"copy\",\"10\"
";
        let report = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r.ncu-rep")).unwrap();
        let kernel = &report.default_range().unwrap().actions[0];
        assert_eq!(kernel.name, "copy");
        assert_eq!(kernel.counter("dram_bytes_read").unwrap(), 64.0);
        assert_eq!(kernel.counter("duration").unwrap(), 10.0);
    }

    #[test]
    fn test_no_output_means_no_ranges() {
        let report =
            NcuReport::from_raw_csv("==PROF== nothing\n", COUNTERS, Path::new("r")).unwrap();
        assert_eq!(report.num_ranges(), 0);
        assert!(report.default_range().is_none());
    }

    #[test]
    fn test_header_only_means_empty_range() {
        let csv = "\"Kernel Name\",\"gpu__time_duration.sum\",\"dram__bytes_read.sum\"\n\"\",\"nsecond\",\"byte\"\n";
        let report = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r")).unwrap();
        assert_eq!(report.num_ranges(), 1);
        assert_eq!(report.default_range().unwrap().num_actions(), 0);
    }

    #[test]
    fn test_missing_counter_column() {
        let csv = "\"Kernel Name\",\"gpu__time_duration.sum\"\n\"\",\"nsecond\"\n\"k\",\"1\"\n";
        let err = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r")).unwrap_err();
        match err {
            AnalyzerError::MissingColumn { column, .. } => {
                assert_eq!(column, "dram__bytes_read.sum")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_value() {
        let csv = "\"Kernel Name\",\"gpu__time_duration.sum\",\"dram__bytes_read.sum\"\n\"\",\"nsecond\",\"byte\"\n\"k\",\"fast\",\"1\"\n";
        let err = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r")).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidValue { .. }));
    }

    #[test]
    fn test_not_available_value_is_absent() {
        let csv = "\"Kernel Name\",\"gpu__time_duration.sum\",\"dram__bytes_read.sum\"\n\"\",\"nsecond\",\"byte\"\n\"k\",\"n/a\",\"1\"\n";
        let report = NcuReport::from_raw_csv(csv, COUNTERS, Path::new("r")).unwrap();
        let kernel = &report.default_range().unwrap().actions[0];
        assert!(matches!(
            kernel.counter("duration"),
            Err(AnalyzerError::MissingCounter { .. })
        ));
    }

    #[test]
    fn test_builder_uses_short_names() {
        let kernel = KernelAction::new("k").with_counter("sm_freq", 1.5e9);
        assert_eq!(
            kernel.metric_by_name("smsp__cycles_elapsed.avg.per_second"),
            Some(1.5e9)
        );
    }
}
