//! Kernel and NVTX range timings from exported `nsys stats` tables

use super::reports::{NsysMetric, NsysReport};
use crate::analyzer::MetricSummary;
use crate::error::{AnalyzerError, Result};
use crate::table::{require_number, CsvTable};
use kernelscope_shared::utils::ns_to_ms;
use kernelscope_shared::MetricValue;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

pub const TOTAL_TIME_COLUMN: &str = "Total Time (ns)";
pub const KERNEL_NAME_COLUMN: &str = "Kernel Name";

/// Time one kernel spent executing inside the NVTX range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelTime {
    pub name: String,
    pub duration_ms: f64,
}

/// Kernel timings from an `nvtx_kern_sum` export, in row order
pub fn parse_kernel_times(table: &CsvTable) -> Result<Vec<KernelTime>> {
    let name_col = table.column(KERNEL_NAME_COLUMN)?;
    let time_col = table.column(TOTAL_TIME_COLUMN)?;

    table
        .rows()
        .iter()
        .map(|row| {
            let name = row.get(name_col).unwrap_or_default().to_string();
            let total_ns = require_number(TOTAL_TIME_COLUMN, row.get(time_col).unwrap_or_default())?;
            Ok(KernelTime {
                name,
                duration_ms: ns_to_ms(total_ns),
            })
        })
        .collect()
}

/// Range duration (ms) from an `nvtx_sum` export holding exactly one range
pub fn parse_range_duration(table: &CsvTable) -> Result<f64> {
    table.expect_rows(1)?;
    let time_col = table.column(TOTAL_TIME_COLUMN)?;
    let raw = table.rows()[0].get(time_col).unwrap_or_default();
    Ok(ns_to_ms(require_number(TOTAL_TIME_COLUMN, raw)?))
}

/// Timings read from a report's exports
#[derive(Debug, Clone, Default, Serialize)]
pub struct NsysAnalysis {
    /// Kernels in the NVTX range, when `nvtx_kern_sum` was exported
    pub kernels: Option<Vec<KernelTime>>,

    /// Duration of the NVTX range (ms), when `nvtx_sum` was exported
    pub nvtx_range_duration_ms: Option<f64>,
}

impl NsysAnalysis {
    /// Build from exported tables, parsing only the reports present
    pub fn from_tables(tables: &BTreeMap<NsysReport, CsvTable>) -> Result<Self> {
        let kernels = tables
            .get(&NsysReport::NvtxKernSum)
            .map(parse_kernel_times)
            .transpose()?;
        let nvtx_range_duration_ms = tables
            .get(&NsysReport::NvtxSum)
            .map(parse_range_duration)
            .transpose()?;

        if let Some(kernels) = &kernels {
            debug!("Parsed {} kernel timing(s)", kernels.len());
        }

        Ok(Self {
            kernels,
            nvtx_range_duration_ms,
        })
    }

    pub fn num_kernels(&self) -> Option<usize> {
        self.kernels.as_ref().map(Vec::len)
    }

    pub fn kernel_names(&self) -> Option<Vec<String>> {
        self.kernels
            .as_ref()
            .map(|k| k.iter().map(|t| t.name.clone()).collect())
    }

    pub fn kernel_durations_ms(&self) -> Option<Vec<f64>> {
        self.kernels
            .as_ref()
            .map(|k| k.iter().map(|t| t.duration_ms).collect())
    }

    /// Sum of kernel durations (ms)
    pub fn kernel_sum_ms(&self) -> Option<f64> {
        self.kernels
            .as_ref()
            .map(|k| k.iter().map(|t| t.duration_ms).sum())
    }

    /// Range time not spent in kernels (ms); may be negative
    pub fn launch_overhead_ms(&self) -> Option<f64> {
        Some(self.nvtx_range_duration_ms? - self.kernel_sum_ms()?)
    }

    /// Kernels add up to more than the enclosing range
    pub fn overhead_anomaly(&self) -> bool {
        self.launch_overhead_ms().is_some_and(|o| o < 0.0)
    }
}

impl MetricSummary<NsysMetric> for NsysAnalysis {
    fn value(&self, metric: NsysMetric) -> Option<MetricValue> {
        match metric {
            NsysMetric::GpuKernelSum => self.kernel_sum_ms().map(MetricValue::Scalar),
            NsysMetric::LaunchOverhead => self.launch_overhead_ms().map(MetricValue::Scalar),
            NsysMetric::KernelNames => self.kernel_names().map(MetricValue::Labels),
            NsysMetric::KernelDurations => self.kernel_durations_ms().map(MetricValue::Series),
            NsysMetric::NvtxRangeDuration => self.nvtx_range_duration_ms.map(MetricValue::Scalar),
            NsysMetric::NumOfKernels => self.num_kernels().map(|n| MetricValue::Count(n as u64)),
        }
    }
}

/// Check every needed export was loaded, then build the analysis
pub fn aggregate_tables(
    tables: &BTreeMap<NsysReport, CsvTable>,
    path: &Path,
    metrics: &BTreeSet<NsysMetric>,
) -> Result<NsysAnalysis> {
    for metric in metrics {
        for report in metric.reports() {
            if !tables.contains_key(report) {
                return Err(AnalyzerError::MissingExport(super::export::csv_path(
                    path, *report,
                )));
            }
        }
    }

    let analysis = NsysAnalysis::from_tables(tables)?;
    if analysis.overhead_anomaly() {
        warn!(
            "Kernel time exceeds the NVTX range in {}: launch overhead is {:.3} ms",
            path.display(),
            analysis.launch_overhead_ms().unwrap_or_default()
        );
    }
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::BenchMetric;

    const KERN_SUM: &str = "\
Range,Style,PID,TID,NumCalls,Range Instances,Total Time (ns),Kernel Name
:bench,PushPop,1,1,1,1,20000000,gemm_kernel
:bench,PushPop,1,1,1,1,30000000,reduce_kernel
";

    const NVTX_SUM: &str = "\
Time (%),Total Time (ns),Instances,Avg (ns),Range
100.0,100000000,1,100000000,:bench
";

    fn tables(kern_sum: &str, nvtx_sum: &str) -> BTreeMap<NsysReport, CsvTable> {
        let mut tables = BTreeMap::new();
        tables.insert(
            NsysReport::NvtxKernSum,
            CsvTable::parse(kern_sum, Path::new("r_nvtx_kern_sum.csv")).unwrap(),
        );
        tables.insert(
            NsysReport::NvtxSum,
            CsvTable::parse(nvtx_sum, Path::new("r_nvtx_sum.csv")).unwrap(),
        );
        tables
    }

    fn all_metrics() -> BTreeSet<NsysMetric> {
        NsysMetric::all().iter().copied().collect()
    }

    #[test]
    fn test_launch_overhead() {
        let analysis =
            aggregate_tables(&tables(KERN_SUM, NVTX_SUM), Path::new("r.nsys-rep"), &all_metrics())
                .unwrap();

        assert_eq!(analysis.kernel_sum_ms(), Some(50.0));
        assert_eq!(analysis.nvtx_range_duration_ms, Some(100.0));
        assert_eq!(analysis.launch_overhead_ms(), Some(50.0));
        assert!(!analysis.overhead_anomaly());
        assert_eq!(analysis.num_kernels(), Some(2));
        assert_eq!(
            analysis.value(NsysMetric::KernelDurations),
            Some(MetricValue::Series(vec![20.0, 30.0]))
        );
        assert_eq!(
            analysis.value(NsysMetric::KernelNames),
            Some(MetricValue::Labels(vec![
                "gemm_kernel".to_string(),
                "reduce_kernel".to_string()
            ]))
        );
    }

    #[test]
    fn test_reordered_columns() {
        let kern_sum = "Kernel Name,Total Time (ns)\nk0,1500000\n";
        let times = parse_kernel_times(&CsvTable::parse(kern_sum, Path::new("k.csv")).unwrap())
            .unwrap();
        assert_eq!(
            times,
            vec![KernelTime {
                name: "k0".to_string(),
                duration_ms: 1.5
            }]
        );
    }

    #[test]
    fn test_negative_overhead_is_flagged() {
        let nvtx_sum = "Total Time (ns),Range\n40000000,:bench\n";
        let analysis =
            aggregate_tables(&tables(KERN_SUM, nvtx_sum), Path::new("r.nsys-rep"), &all_metrics())
                .unwrap();
        assert_eq!(analysis.launch_overhead_ms(), Some(-10.0));
        assert!(analysis.overhead_anomaly());
    }

    #[test]
    fn test_nvtx_sum_needs_exactly_one_row() {
        let two_rows = "Total Time (ns),Range\n1,:a\n2,:b\n";
        let err =
            aggregate_tables(&tables(KERN_SUM, two_rows), Path::new("r.nsys-rep"), &all_metrics())
                .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::UnexpectedRowCount {
                expected: 1,
                found: 2,
                ..
            }
        ));

        let no_rows = "Total Time (ns),Range\n";
        assert!(aggregate_tables(
            &tables(KERN_SUM, no_rows),
            Path::new("r.nsys-rep"),
            &all_metrics()
        )
        .is_err());
    }

    #[test]
    fn test_missing_column() {
        let kern_sum = "Range,Kernel Name\n:bench,k0\n";
        let err =
            aggregate_tables(&tables(kern_sum, NVTX_SUM), Path::new("r.nsys-rep"), &all_metrics())
                .unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::MissingColumn {
                column: TOTAL_TIME_COLUMN,
                ..
            }
        ));
    }

    #[test]
    fn test_non_numeric_duration() {
        let kern_sum = "Total Time (ns),Kernel Name\nslow,k0\n";
        let err = parse_kernel_times(&CsvTable::parse(kern_sum, Path::new("k.csv")).unwrap())
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_export_for_requested_metric() {
        let mut only_kernels = tables(KERN_SUM, NVTX_SUM);
        only_kernels.remove(&NsysReport::NvtxSum);

        let metrics: BTreeSet<_> = [NsysMetric::NumOfKernels].into_iter().collect();
        let analysis =
            aggregate_tables(&only_kernels, Path::new("/runs/r.nsys-rep"), &metrics).unwrap();
        assert_eq!(analysis.value(NsysMetric::NumOfKernels), Some(MetricValue::Count(2)));
        assert_eq!(analysis.value(NsysMetric::LaunchOverhead), None);

        let metrics: BTreeSet<_> = [NsysMetric::LaunchOverhead].into_iter().collect();
        let err =
            aggregate_tables(&only_kernels, Path::new("/runs/r.nsys-rep"), &metrics).unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingExport(p) if p.ends_with("r_nvtx_sum.csv")));
    }
}
