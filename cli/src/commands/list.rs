//! List command implementation

use anyhow::Result;
use colored::Colorize;
use kernelscope_gpu::ncu::counter_name;
use kernelscope_gpu::{BenchMetric, NcuMetric, NsysMetric};

pub fn run() -> Result<()> {
    println!("{}", "=== Nsight Compute metrics ===".bold());
    for metric in NcuMetric::all() {
        println!("  {}", metric.name().green());
        for short in metric.short_counters() {
            println!("    {:<24} {}", short, counter_name(short).unwrap_or("?"));
        }
    }

    println!("\n{}", "=== Nsight Systems metrics ===".bold());
    for metric in NsysMetric::all() {
        let reports: Vec<&str> = metric.reports().iter().map(|r| r.name()).collect();
        println!("  {} {}", format!("{:<26}", metric.name()).green(), reports.join(", "));
    }

    Ok(())
}
