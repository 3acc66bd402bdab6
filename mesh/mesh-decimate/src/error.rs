//! Error types for mesh decimation.

use thiserror::Error;

/// Errors that can occur before decimation starts.
///
/// Once the input validates, decimation itself cannot fail: at worst it
/// stops above the target.
#[derive(Debug, Error)]
pub enum DecimateError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    InvalidIndex {
        /// Offending face.
        face: usize,
        /// Offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// Result type for decimation operations.
pub type DecimateResult<T> = std::result::Result<T, DecimateError>;
