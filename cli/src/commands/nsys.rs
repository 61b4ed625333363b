//! Nsight Systems command implementation

use super::ReportArgs;
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use kernelscope_gpu::analyzer::{metric_map, parse_metrics, summarize};
use kernelscope_gpu::nsys::{KernelTime, NsysAnalyzer, NsysMetric};
use kernelscope_gpu::ReportAnalyzer;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NsysArgs {
    #[command(flatten)]
    pub common: ReportArgs,

    /// `nsys` executable or the directory holding it
    #[arg(long)]
    pub nsys: Option<PathBuf>,
}

pub async fn run(args: NsysArgs) -> Result<()> {
    let names = args.common.metric_names();
    let mut config = args.common.config()?;
    if let Some(nsys) = &args.nsys {
        config = config.with_nsys_path(nsys);
    }
    config.validate().context("Invalid analyzer configuration")?;

    let metrics = parse_metrics::<NsysMetric, _>(NsysAnalyzer::TOOL, &names)?;
    let analyzer = NsysAnalyzer::new(config);

    let spinner = output::spinner(&format!("Exporting {}", args.common.report.display()));
    let analysis = summarize(&analyzer, &args.common.report, &names).await;
    spinner.finish_and_clear();

    let analysis = analysis.with_context(|| {
        format!(
            "Failed to analyze Nsight Systems report {}",
            args.common.report.display()
        )
    })?;
    let Some(analysis) = analysis else {
        output::warning("No metrics requested");
        return Ok(());
    };

    output::success(&format!("Analyzed {}", args.common.report.display()));

    let map = metric_map(&analysis, &metrics);
    output::print_metrics(&map);

    if analysis.overhead_anomaly() {
        output::warning("Kernel time exceeds the NVTX range; launch overhead is negative");
    }

    if args.common.kernels {
        if let Some(kernels) = &analysis.kernels {
            print_kernels(kernels);
        }
    }

    if let Some(path) = &args.common.json {
        output::write_json(&map, path)?;
        output::info(&format!("Metrics written to {}", path.display()));
    }

    Ok(())
}

fn print_kernels(kernels: &[KernelTime]) {
    println!("\n  {:>4} {:>12}  KERNEL", "#", "TIME(ms)");

    for (i, k) in kernels.iter().enumerate() {
        println!("  {:>4} {:>12.3}  {}", i, k.duration_ms, k.name);
    }
}
