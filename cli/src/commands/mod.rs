//! Subcommand implementations

pub mod counters;
pub mod list;
pub mod ncu;
pub mod nsys;

use anyhow::{Context, Result};
use clap::Args;
use kernelscope_gpu::AnalyzerConfig;
use std::path::PathBuf;
use tracing::{debug, info};

/// Flags shared by the report-analysis subcommands
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Profiler report to analyze
    pub report: PathBuf,

    /// Metrics to compute, comma-separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub metrics: Vec<String>,

    /// Bound on the external export (e.g., "30s", "5m")
    #[arg(short, long)]
    pub timeout: Option<String>,

    /// Also write the metrics to a JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Print per-kernel values
    #[arg(short, long)]
    pub kernels: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ReportArgs {
    /// Requested metric names with blanks dropped
    pub fn metric_names(&self) -> Vec<String> {
        clean_metric_names(&self.metrics)
    }

    /// Environment configuration with the command-line timeout applied
    pub fn config(&self) -> Result<AnalyzerConfig> {
        let mut config = AnalyzerConfig::default();
        if let Some(timeout) = &self.timeout {
            let timeout = kernelscope_shared::utils::parse_duration(timeout)
                .context("Failed to parse timeout")?;
            info!("Export timeout: {:?}", timeout);
            config = config.with_export_timeout(timeout);
        }
        debug!("Analyzer configuration: {:?}", config);
        Ok(config)
    }
}

pub fn clean_metric_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
