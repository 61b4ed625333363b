//! Common shape of a report analyzer
//!
//! Both profilers are handled the same way: resolve the requested benchmark
//! metrics to what the tool must produce, invoke the tool against the report,
//! then aggregate its per-kernel output into summary values.

use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use kernelscope_shared::{MetricMap, MetricValue};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// A benchmark-level metric computed by one analyzer
pub trait BenchMetric: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Every metric, in table order
    fn all() -> &'static [Self];

    /// Name used in requests and in the returned metric map
    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.name() == name)
    }
}

/// Aggregated analysis result that can answer for individual metrics
pub trait MetricSummary<M> {
    /// Value of `metric`, or None when it was not computed
    fn value(&self, metric: M) -> Option<MetricValue>;
}

#[async_trait]
pub trait ReportAnalyzer: Send + Sync {
    /// Metrics this analyzer understands
    type Metric: BenchMetric;

    /// What the tool must be asked for (counters, report types)
    type Plan: Send + Sync;

    /// Raw per-kernel data produced by the tool
    type Raw: Send;

    /// Aggregated result
    type Summary: MetricSummary<Self::Metric> + Send;

    /// Tool name used in diagnostics
    const TOOL: &'static str;

    /// Map requested metrics to the data the tool must produce
    fn resolve_dependencies(&self, metrics: &BTreeSet<Self::Metric>) -> Self::Plan;

    /// Run the external tool against `report`
    async fn invoke(&self, report: &Path, plan: &Self::Plan) -> Result<Self::Raw>;

    /// Reduce raw per-kernel data to the requested metrics
    fn aggregate(
        &self,
        report: &Path,
        raw: Self::Raw,
        metrics: &BTreeSet<Self::Metric>,
    ) -> Result<Self::Summary>;
}

/// Parse requested metric names, rejecting names the analyzer does not know
pub fn parse_metrics<M, S>(tool: &'static str, names: &[S]) -> Result<BTreeSet<M>>
where
    M: BenchMetric,
    S: AsRef<str>,
{
    names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            M::from_name(name).ok_or_else(|| AnalyzerError::UnknownMetric {
                tool,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Keep only the names this analyzer understands, in table order.
///
/// For callers holding one metric list shared between several analyzers.
pub fn select_metrics<M, S>(names: &[S]) -> Vec<M>
where
    M: BenchMetric,
    S: AsRef<str>,
{
    M::all()
        .iter()
        .copied()
        .filter(|m| names.iter().any(|n| n.as_ref().trim() == m.name()))
        .collect()
}

/// Run all stages and return the full summary.
///
/// Returns `Ok(None)` without touching the report or the tool when no
/// metrics are requested.
pub async fn summarize<A, S>(analyzer: &A, report: &Path, names: &[S]) -> Result<Option<A::Summary>>
where
    A: ReportAnalyzer,
    S: AsRef<str>,
{
    let metrics: BTreeSet<A::Metric> = parse_metrics(A::TOOL, names)?;
    if metrics.is_empty() {
        debug!("No {} metrics requested; skipping report analysis", A::TOOL);
        return Ok(None);
    }

    if !report.exists() {
        return Err(AnalyzerError::ReportNotFound {
            tool: A::TOOL,
            path: report.to_path_buf(),
        });
    }

    info!("Analyzing {} report: {}", A::TOOL, report.display());

    let plan = analyzer.resolve_dependencies(&metrics);
    let raw = analyzer.invoke(report, &plan).await?;
    let summary = analyzer.aggregate(report, raw, &metrics)?;

    Ok(Some(summary))
}

/// Run all stages and return exactly the requested metrics
pub async fn run_analysis<A, S>(analyzer: &A, report: &Path, names: &[S]) -> Result<MetricMap>
where
    A: ReportAnalyzer,
    S: AsRef<str>,
{
    let metrics: BTreeSet<A::Metric> = parse_metrics(A::TOOL, names)?;
    match summarize(analyzer, report, names).await? {
        Some(summary) => Ok(metric_map(&summary, &metrics)),
        None => Ok(MetricMap::new()),
    }
}

/// Build the metric map for `metrics` from a summary
pub fn metric_map<M, T>(summary: &T, metrics: &BTreeSet<M>) -> MetricMap
where
    M: BenchMetric,
    T: MetricSummary<M>,
{
    metrics
        .iter()
        .filter_map(|&m| summary.value(m).map(|v| (m.name().to_string(), v)))
        .collect()
}
