//! Counters command implementation

use super::clean_metric_names;
use crate::output;
use anyhow::Result;
use clap::Args;
use kernelscope_gpu::{ncu_counters_for, ncu_counters_for_known};

#[derive(Args, Debug)]
pub struct CountersArgs {
    /// Metrics that will be requested, comma-separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub metrics: Vec<String>,

    /// Skip names that are not Nsight Compute metrics instead of failing
    #[arg(long)]
    pub ignore_unknown: bool,
}

/// Print the counter list in the form `ncu --metrics` accepts
pub fn run(args: CountersArgs) -> Result<()> {
    let names = clean_metric_names(&args.metrics);
    let counters = if args.ignore_unknown {
        ncu_counters_for_known(&names)
    } else {
        ncu_counters_for(&names)?
    };

    if counters.is_empty() {
        output::warning("None of the requested metrics read Nsight Compute counters");
        return Ok(());
    }

    println!("{}", counters.join(","));
    Ok(())
}
