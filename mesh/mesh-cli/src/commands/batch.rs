//! `batch`: many inputs, one rayon worker per run.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use rayon::prelude::*;
use tracing::{error, info, warn};

use super::{finish, register, run_pipeline, PipelineArgs};
use crate::ledger::JobLedger;
use crate::policy::{job_output_name, output_name};

/// Arguments of `batch`.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input meshes
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the outputs
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Worker threads [default: one per core]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Run the pipeline on every input. Runs are independent; one failing
/// does not stop the others. Each run writes its own file: an input whose
/// `{stem}_outer_shell.glb` is already taken gets its job id in the name.
pub fn execute(args: BatchArgs, ledger: &mut JobLedger) -> Result<()> {
    let config = args.pipeline.load()?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;

    // Names are compared case-folded: `Part.obj` and `part.stl` would
    // overwrite each other on a case-insensitive file system.
    let mut claimed = HashSet::new();
    let jobs: Vec<_> = args
        .inputs
        .iter()
        .map(|input| {
            let id = register(ledger, input);
            ledger.start(id);
            let mut name = output_name(input);
            if !claimed.insert(name.to_lowercase()) {
                name = job_output_name(input, id);
                warn!(input = %input.display(), output = %name, "Output name taken, adding job id");
                claimed.insert(name.to_lowercase());
            }
            (id, input.as_path(), args.out_dir.join(name))
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .context("cannot start worker pool")?;
    info!(jobs = jobs.len(), threads = pool.current_num_threads(), "Starting batch");

    let max_bytes = args.pipeline.max_bytes;
    let results: Vec<Result<_>> = pool.install(|| {
        jobs.par_iter()
            .map(|(_, input, output)| run_pipeline(input, output, max_bytes, &config))
            .collect()
    });

    let mut failed = 0;
    for ((id, input, output), result) in jobs.iter().zip(results) {
        match finish(ledger, *id, output, result) {
            Ok(report) => println!("{}: {report}", output.display()),
            Err(e) => {
                failed += 1;
                error!(input = %input.display(), error = %format!("{e:#}"), "Job failed");
                println!("{}: failed: {e:#}", input.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} jobs failed", jobs.len());
    }
    Ok(())
}
