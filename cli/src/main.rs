//! CLI for Kernelscope
//!
//! Reads Nsight profiler reports and prints benchmark metrics:
//! - ncu: memory traffic, arithmetic intensity and TFLOPS from Nsight Compute
//! - nsys: kernel timings and launch overhead from Nsight Systems
//! - counters / list: what each metric needs at collection time

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "kernelscope")]
#[command(about = "Kernelscope - Nsight report metric analyzer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an Nsight Compute report (.ncu-rep)
    Ncu(commands::ncu::NcuArgs),

    /// Analyze an Nsight Systems report (.nsys-rep)
    Nsys(commands::nsys::NsysArgs),

    /// Print the Nsight Compute counters to collect for some metrics
    Counters(commands::counters::CountersArgs),

    /// List every known metric and what it is computed from
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ncu(args) => {
            init_tracing(args.common.verbose);
            commands::ncu::run(args).await
        }
        Commands::Nsys(args) => {
            init_tracing(args.common.verbose);
            commands::nsys::run(args).await
        }
        Commands::Counters(args) => commands::counters::run(args),
        Commands::List => commands::list::run(),
    };

    if let Err(err) = result {
        output::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
