//! Error types for shell extraction.
//!
//! A [`ShellError`] is the failure of one strategy. [`extract_shell`]
//! records it and moves on to the next strategy; it never returns one.
//!
//! [`extract_shell`]: crate::extract_shell

use thiserror::Error;

/// Result type alias for strategy functions.
pub type ShellResult<T> = Result<T, ShellError>;

/// Why a single strategy could not produce a shell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShellError {
    /// Input mesh has no vertices or no faces.
    #[error("input mesh is empty")]
    EmptyMesh,

    /// Parameters out of range for this strategy.
    #[error("invalid shell parameters: {0}")]
    InvalidParams(String),

    /// The voxel grid would exceed the cell budget.
    #[error("voxel grid of {cells} cells exceeds the limit of {limit}")]
    GridTooLarge {
        /// Cells the grid would need.
        cells: u128,
        /// Configured budget.
        limit: usize,
    },

    /// Point set or geometry is collinear, coplanar or otherwise flat.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    /// The strategy ran but produced no vertices.
    #[error("strategy produced an empty mesh")]
    EmptyResult,
}

impl ShellError {
    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }

    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(details: impl Into<String>) -> Self {
        Self::Degenerate(details.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(format!("{}", ShellError::EmptyMesh).contains("empty"));
        assert!(format!("{}", ShellError::invalid_params("bad R")).contains("bad R"));
        assert!(format!("{}", ShellError::degenerate("all points coplanar")).contains("coplanar"));

        let err = ShellError::GridTooLarge {
            cells: 2_000_000,
            limit: 1_000_000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("2000000"));
        assert!(msg.contains("1000000"));
    }
}
