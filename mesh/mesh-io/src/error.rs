//! Error types for loading and exporting meshes.
//!
//! Both are fatal: a load error aborts the pipeline before any geometric
//! work, an export error after all of it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for mesh export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while turning input bytes into a mesh.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The declared extension is not on the whitelist. Raised before any
    /// parsing.
    #[error("unsupported format: .{extension} (expected .obj, .stl, .ply or .glb)")]
    UnsupportedFormat {
        /// The rejected extension, lowercased and without a leading dot.
        extension: String,
    },

    /// The source held several objects and none of them is a usable
    /// polygonal mesh.
    #[error("scene contains no mesh geometry")]
    EmptyScene,

    /// Parsing failed, or the result has no faces, out-of-range indices or
    /// non-finite coordinates.
    #[error("corrupt or empty mesh: {reason}")]
    CorruptOrEmpty {
        /// What was wrong.
        reason: String,
    },

    /// Reading the input file failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Create an `UnsupportedFormat` error.
    #[must_use]
    pub fn unsupported(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a `CorruptOrEmpty` error with the given reason.
    #[must_use]
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptOrEmpty {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while writing the output container.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The mesh cannot be encoded (no faces, bad indices, oversized).
    #[error("cannot encode mesh: {reason}")]
    Encode {
        /// What was wrong with the mesh.
        reason: String,
    },

    /// The container could not be written, or the written file is missing
    /// or empty.
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Destination path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

impl ExportError {
    /// Create an `Encode` error.
    #[must_use]
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Create a `WriteFailed` error.
    #[must_use]
    pub fn write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::unsupported("fbx");
        assert!(format!("{err}").contains(".fbx"));

        let err = LoadError::corrupt("no faces");
        assert!(format!("{err}").contains("no faces"));

        assert!(format!("{}", LoadError::EmptyScene).contains("no mesh"));

        let err = ExportError::write_failed("/tmp/out.glb", "disk full");
        let msg = format!("{err}");
        assert!(msg.contains("out.glb"));
        assert!(msg.contains("disk full"));
    }
}
