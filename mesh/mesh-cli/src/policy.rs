//! Input and output rules of the calling layer.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::ledger::JobId;

/// Largest accepted input: 50 MiB.
pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// Suffix appended to the input's stem.
const OUTPUT_SUFFIX: &str = "_outer_shell.glb";

/// An input file that passed the size check.
#[derive(Debug)]
pub struct Input {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Extension as written, empty if there is none. Whitelisting is the
    /// loader's job.
    pub ext: String,
}

/// Read `path` if it is no larger than `limit` bytes.
pub fn read_input(path: &Path, limit: u64) -> Result<Input> {
    let size = fs::metadata(path)
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len();
    if size > limit {
        bail!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            limit
        );
    }

    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Input { bytes, ext })
}

/// `{stem}_outer_shell.glb`.
pub fn output_name(input: &Path) -> String {
    format!("{}{OUTPUT_SUFFIX}", stem(input))
}

/// `{stem}_{id}_outer_shell.glb`, for inputs whose plain name is taken.
pub fn job_output_name(input: &Path, id: JobId) -> String {
    format!("{}_{id}{OUTPUT_SUFFIX}", stem(input))
}

fn stem(input: &Path) -> Cow<'_, str> {
    input
        .file_stem()
        .map_or_else(|| "mesh".into(), |s| s.to_string_lossy())
}

/// Output path for `input`: next to it, or in `out_dir` if given.
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let dir = out_dir
        .or_else(|| input.parent())
        .unwrap_or_else(|| Path::new(""));
    dir.join(output_name(input))
}
