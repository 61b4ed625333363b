//! GPU profiler report analysis
//!
//! Reads NVIDIA Nsight Compute (`ncu`) and Nsight Systems (`nsys`) reports
//! through their command-line tools and reduces per-kernel data to
//! benchmark metrics: DRAM traffic, arithmetic intensity, achieved TFLOPS,
//! kernel timings and launch overhead.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ncu;
pub mod nsys;
pub mod table;
pub mod tool;

pub use analyzer::{run_analysis, select_metrics, summarize, BenchMetric, MetricSummary, ReportAnalyzer};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use ncu::{ncu_counters_for, ncu_counters_for_known, read_ncu_report, NcuAnalyzer, NcuMetric, NcuSummary};
pub use nsys::{nsys_metrics_for, read_nsys_report, NsysAnalysis, NsysAnalyzer, NsysMetric};
