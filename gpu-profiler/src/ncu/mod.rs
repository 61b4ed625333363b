//! Nsight Compute report analysis
//!
//! Resolves benchmark metrics to Nsight Compute counters, reads the counters
//! of every kernel in the report's default range through the installed
//! `ncu`, and aggregates them into memory traffic, arithmetic intensity and
//! achieved TFLOPS.

pub mod aggregate;
pub mod counters;
pub mod install;
pub mod report;

pub use aggregate::{KernelSample, NcuSummary};
pub use counters::{counter_name, required_counters, NcuMetric, SHORT_COUNTER_NAMES};
pub use install::NcuInstallation;
pub use report::{KernelAction, NcuRange, NcuReport};

use crate::analyzer::{self, ReportAnalyzer};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::tool;
use async_trait::async_trait;
use kernelscope_shared::MetricMap;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Nsight Compute analyzer
#[derive(Debug, Clone)]
pub struct NcuAnalyzer {
    config: AnalyzerConfig,
}

impl NcuAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Load a report through the installed `ncu`, keeping `counters`
    pub async fn load_report(&self, report: &Path, counters: &[&'static str]) -> Result<NcuReport> {
        let install = NcuInstallation::locate(self.config.ncu_path.as_deref())?;
        info!(
            "Reading {} counter(s) from {} with {}",
            counters.len(),
            report.display(),
            install.executable().display()
        );

        let args = install.import_args(report, counters);
        let output = tool::run(
            Self::TOOL,
            install.executable(),
            &args,
            self.config.export_timeout,
        )
        .await?;

        NcuReport::from_raw_csv(&output.stdout, counters, report)
    }
}

impl Default for NcuAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[async_trait]
impl ReportAnalyzer for NcuAnalyzer {
    type Metric = NcuMetric;
    type Plan = Vec<&'static str>;
    type Raw = NcuReport;
    type Summary = NcuSummary;
    const TOOL: &'static str = "ncu";

    fn resolve_dependencies(&self, metrics: &BTreeSet<NcuMetric>) -> Vec<&'static str> {
        required_counters(metrics.iter().copied())
    }

    async fn invoke(&self, report: &Path, plan: &Vec<&'static str>) -> Result<NcuReport> {
        self.load_report(report, plan).await
    }

    fn aggregate(
        &self,
        report: &Path,
        raw: NcuReport,
        metrics: &BTreeSet<NcuMetric>,
    ) -> Result<NcuSummary> {
        aggregate::aggregate_report(&raw, report, metrics)
    }
}

/// Compute the requested Nsight Compute metrics for `report`
pub async fn read_ncu_report<S: AsRef<str>>(
    report: &Path,
    metrics: &[S],
    config: AnalyzerConfig,
) -> Result<MetricMap> {
    analyzer::run_analysis(&NcuAnalyzer::new(config), report, metrics).await
}

/// Nsight Compute counters to collect for `names`; unknown names are an error
pub fn ncu_counters_for<S: AsRef<str>>(names: &[S]) -> Result<Vec<&'static str>> {
    let metrics = analyzer::parse_metrics::<NcuMetric, S>(NcuAnalyzer::TOOL, names)?;
    Ok(required_counters(metrics))
}

/// Like `ncu_counters_for`, skipping names that are not Nsight Compute metrics
pub fn ncu_counters_for_known<S: AsRef<str>>(names: &[S]) -> Vec<&'static str> {
    required_counters(analyzer::select_metrics::<NcuMetric, S>(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;

    #[test]
    fn test_counters_for_names() {
        let counters = ncu_counters_for(&["memory_traffic"]).unwrap();
        assert_eq!(counters, vec!["dram__bytes_read.sum", "dram__bytes_write.sum"]);

        let err = ncu_counters_for(&["memory_traffic", "nsys_num_of_kernels"]).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnknownMetric { .. }));
    }

    #[test]
    fn test_counters_for_mixed_list() {
        let counters = ncu_counters_for_known(&["nsys_num_of_kernels", "memory_traffic"]);
        assert_eq!(counters.len(), 2);
        assert!(ncu_counters_for_known(&["nsys_num_of_kernels"]).is_empty());
    }
}
