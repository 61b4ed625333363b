//! Nsight Systems report analysis
//!
//! Exports the NVTX summaries of a report through `nsys stats` and derives
//! kernel timings, the enclosing range duration and launch overhead.

pub mod aggregate;
pub mod export;
pub mod reports;

pub use aggregate::{KernelTime, NsysAnalysis};
pub use export::csv_path;
pub use reports::{required_reports, NsysMetric, NsysReport};

use crate::analyzer::{self, ReportAnalyzer};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::table::CsvTable;
use crate::tool;
use async_trait::async_trait;
use kernelscope_shared::MetricMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Nsight Systems analyzer
#[derive(Debug, Clone)]
pub struct NsysAnalyzer {
    config: AnalyzerConfig,
}

impl NsysAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }
}

impl Default for NsysAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[async_trait]
impl ReportAnalyzer for NsysAnalyzer {
    type Metric = NsysMetric;
    type Plan = BTreeSet<NsysReport>;
    type Raw = BTreeMap<NsysReport, CsvTable>;
    type Summary = NsysAnalysis;
    const TOOL: &'static str = "nsys";

    fn resolve_dependencies(&self, metrics: &BTreeSet<NsysMetric>) -> BTreeSet<NsysReport> {
        required_reports(metrics.iter().copied())
    }

    async fn invoke(
        &self,
        report: &Path,
        plan: &BTreeSet<NsysReport>,
    ) -> Result<BTreeMap<NsysReport, CsvTable>> {
        let nsys = tool::locate(Self::TOOL, self.config.nsys_path.as_deref())?;
        export::export_reports(&nsys, report, plan, self.config.export_timeout).await
    }

    fn aggregate(
        &self,
        report: &Path,
        raw: BTreeMap<NsysReport, CsvTable>,
        metrics: &BTreeSet<NsysMetric>,
    ) -> Result<NsysAnalysis> {
        aggregate::aggregate_tables(&raw, report, metrics)
    }
}

/// Compute the requested Nsight Systems metrics for `report`
pub async fn read_nsys_report<S: AsRef<str>>(
    report: &Path,
    metrics: &[S],
    config: AnalyzerConfig,
) -> Result<MetricMap> {
    analyzer::run_analysis(&NsysAnalyzer::new(config), report, metrics).await
}

/// The recognized Nsight Systems metrics in `names`
pub fn nsys_metrics_for<S: AsRef<str>>(names: &[S]) -> Vec<NsysMetric> {
    analyzer::select_metrics(names)
}
