//! `inspect`: load a mesh and report on its condition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use outer_shell::io::load_mesh;
use outer_shell::repair::validate_mesh;

use crate::policy::{read_input, MAX_INPUT_BYTES};

/// Arguments of `inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input mesh
    pub input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Print counts, bounds and watertightness of a mesh.
pub fn execute(args: &InspectArgs) -> Result<()> {
    let data = read_input(&args.input, MAX_INPUT_BYTES)?;
    let mesh = load_mesh(&data.bytes, &data.ext)
        .with_context(|| format!("cannot load {}", args.input.display()))?;
    let report = validate_mesh(&mesh);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", args.input.display());
        print!("{report}");
    }
    Ok(())
}
