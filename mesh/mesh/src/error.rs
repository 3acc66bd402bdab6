//! Pipeline errors.

use mesh_io::{ExportError, LoadError};
use thiserror::Error;

/// Result type for [`crate::process`].
pub type PipelineResult<T> = Result<T, PipelineError>;

/// The only two ways a pipeline run can fail.
///
/// Repair and extraction setbacks never show up here; they end up as
/// warnings and strategy attempts in the [`crate::PipelineReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input could not be read as a mesh.
    #[error("could not read the input as a mesh: {0}")]
    Load(#[from] LoadError),

    /// The output container could not be written.
    #[error("could not write the output file: {0}")]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// True for input-side failures.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }
}
