//! Command-line front end for outer shell extraction.
//!
//! Owns everything the pipeline deliberately does not: file access, the
//! input size limit, output naming, job bookkeeping and worker threads.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;
mod ledger;
mod policy;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::ledger::JobLedger;

/// Replace meshes by their outer shell and write them as GLB.
#[derive(Parser)]
#[command(name = "outer-shell")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract, repair and simplify the outer shell of a mesh", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Print the job ledger as JSON when done
    #[arg(long, global = true)]
    status: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one mesh
    Process(commands::process::ProcessArgs),
    /// Process several meshes in parallel
    Batch(commands::batch::BatchArgs),
    /// Report on a mesh without changing it
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("cannot install log subscriber")?;

    let mut ledger = JobLedger::new();
    let result = match cli.command {
        Commands::Process(args) => commands::process::execute(args, &mut ledger),
        Commands::Batch(args) => commands::batch::execute(args, &mut ledger),
        Commands::Inspect(args) => commands::inspect::execute(&args),
    };

    if cli.status {
        println!("{}", ledger.to_json()?);
    }
    result
}
