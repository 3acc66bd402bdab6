//! `process`: one input, one GLB.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{run_job, PipelineArgs};
use crate::ledger::JobLedger;
use crate::policy::output_path;

/// Arguments of `process`.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input mesh (.obj, .stl, .ply or .glb)
    pub input: PathBuf,

    /// Output file [default: <stem>_outer_shell.glb next to the input]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Run the pipeline on a single file.
pub fn execute(args: ProcessArgs, ledger: &mut JobLedger) -> Result<()> {
    let config = args.pipeline.load()?;
    let output = args
        .output
        .unwrap_or_else(|| output_path(&args.input, None));

    info!(input = %args.input.display(), output = %output.display(), "Processing");
    let report = run_job(ledger, &args.input, &output, &args.pipeline, &config)?;

    println!("{}: {report}", output.display());
    for warning in report.warnings() {
        println!("  warning: {warning}");
    }
    Ok(())
}
