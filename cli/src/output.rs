//! Output formatting utilities for CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use kernelscope_shared::MetricMap;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Spinner shown on stderr while an external tool runs
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print computed metrics, one per line
pub fn print_metrics(metrics: &MetricMap) {
    let width = metrics.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in metrics {
        let name = format!("{:<width$}", name, width = width);
        match value.entry_count() {
            Some(n) => println!("  {}  {} {}", name.bold(), value, format!("({} kernels)", n).dimmed()),
            None => println!("  {}  {}", name.bold(), value),
        }
    }
}

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value).context("Failed to serialize metrics to JSON")?;

    Ok(())
}
