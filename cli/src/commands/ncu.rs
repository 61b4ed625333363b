//! Nsight Compute command implementation

use super::ReportArgs;
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use kernelscope_gpu::analyzer::{metric_map, parse_metrics, summarize};
use kernelscope_gpu::ncu::{KernelSample, NcuAnalyzer, NcuMetric};
use kernelscope_gpu::ReportAnalyzer;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct NcuArgs {
    #[command(flatten)]
    pub common: ReportArgs,

    /// `ncu` executable or the directory holding it
    #[arg(long)]
    pub ncu: Option<PathBuf>,
}

pub async fn run(args: NcuArgs) -> Result<()> {
    let names = args.common.metric_names();
    let mut config = args.common.config()?;
    if let Some(ncu) = &args.ncu {
        config = config.with_ncu_path(ncu);
    }
    config.validate().context("Invalid analyzer configuration")?;

    let metrics = parse_metrics::<NcuMetric, _>(NcuAnalyzer::TOOL, &names)?;
    let analyzer = NcuAnalyzer::new(config);

    let spinner = output::spinner(&format!("Reading {}", args.common.report.display()));
    let summary = summarize(&analyzer, &args.common.report, &names).await;
    spinner.finish_and_clear();

    let summary = summary.with_context(|| {
        format!(
            "Failed to analyze Nsight Compute report {}",
            args.common.report.display()
        )
    })?;
    let Some(summary) = summary else {
        output::warning("No metrics requested");
        return Ok(());
    };

    output::success(&format!(
        "Analyzed {} kernel(s) from {}",
        summary.kernels.len(),
        args.common.report.display()
    ));

    let map = metric_map(&summary, &metrics);
    output::print_metrics(&map);

    if args.common.kernels {
        print_kernels(&summary.kernels);
    }

    if let Some(path) = &args.common.json {
        output::write_json(&map, path)?;
        output::info(&format!("Metrics written to {}", path.display()));
    }

    Ok(())
}

fn print_kernels(kernels: &[KernelSample]) {
    println!(
        "\n  {:>4} {:>12} {:>14} {:>14} {:>14} {:>10} {:>10}  KERNEL",
        "#", "TIME(us)", "DRAM READ(B)", "DRAM WRITE(B)", "DRAM TOTAL(B)", "AI FP32", "AI FP64"
    );

    for (i, k) in kernels.iter().enumerate() {
        let time = k
            .duration_ns
            .map(|ns| format!("{:.2}", ns / 1000.0))
            .unwrap_or_else(|| "-".to_string());
        let (read, write, total) = k
            .traffic
            .map(|t| {
                (
                    format!("{:.0}", t.read),
                    format!("{:.0}", t.write),
                    format!("{:.0}", t.total()),
                )
            })
            .unwrap_or_else(|| ("-".to_string(), "-".to_string(), "-".to_string()));
        let (ai32, ai64) = k
            .arithmetic_intensity
            .map(|ai| (format!("{:.3}", ai.fp32), format!("{:.3}", ai.fp64)))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

        println!(
            "  {:>4} {:>12} {:>14} {:>14} {:>14} {:>10} {:>10}  {}",
            i, time, read, write, total, ai32, ai64, k.name
        );
    }
}
