//! Subcommands.

pub mod batch;
pub mod inspect;
pub mod process;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use outer_shell::{PipelineConfig, PipelineReport};

use crate::ledger::{JobId, JobLedger};
use crate::policy::{read_input, MAX_INPUT_BYTES};

/// Options shared by every command that runs the pipeline.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// JSON file with a pipeline configuration; missing fields keep their
    /// defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use voxel resolution 100 instead of 64 (ignored with --config)
    #[arg(long)]
    pub detailed: bool,

    /// Largest accepted input in bytes
    #[arg(long, default_value_t = MAX_INPUT_BYTES)]
    pub max_bytes: u64,
}

impl PipelineArgs {
    /// The configuration to run with.
    pub fn load(&self) -> Result<PipelineConfig> {
        match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("invalid config {}", path.display()))
            }
            None if self.detailed => Ok(PipelineConfig::detailed()),
            None => Ok(PipelineConfig::default()),
        }
    }
}

/// Register `input`, run the pipeline on it and record the outcome.
pub fn run_job(
    ledger: &mut JobLedger,
    input: &Path,
    output: &Path,
    args: &PipelineArgs,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    let id = register(ledger, input);
    ledger.start(id);
    let result = run_pipeline(input, output, args.max_bytes, config);
    finish(ledger, id, output, result)
}

/// Read `input` under the size policy and run the pipeline on it.
fn run_pipeline(
    input: &Path,
    output: &Path,
    max_bytes: u64,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    let data = read_input(input, max_bytes)?;
    Ok(outer_shell::process(&data.bytes, &data.ext, output, config)?)
}

fn register(ledger: &mut JobLedger, input: &Path) -> JobId {
    let size = std::fs::metadata(input).map_or(0, |m| m.len());
    ledger.register(input, size)
}

fn finish(
    ledger: &mut JobLedger,
    id: JobId,
    output: &Path,
    result: Result<PipelineReport>,
) -> Result<PipelineReport> {
    match &result {
        Ok(_) => ledger.complete(id, output.to_path_buf()),
        Err(e) => ledger.fail(id, format!("{e:#}")),
    }
    result
}
