//! Result types for decimation operations.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use mesh_types::IndexedMesh;

/// Result of mesh decimation.
#[derive(Debug, Clone)]
pub struct DecimationResult {
    /// The decimated mesh, compacted to referenced vertices.
    pub mesh: IndexedMesh,

    /// Number of faces in the input.
    pub original_faces: usize,

    /// Face count the run aimed for.
    pub target_faces: usize,

    /// Number of faces in the output.
    pub final_faces: usize,

    /// Edge collapses performed in the strict pass.
    pub strict_collapses: usize,

    /// Edge collapses performed in the relaxed pass.
    pub relaxed_collapses: usize,

    /// Candidate collapses rejected by a topology, flip, boundary or error
    /// check.
    pub collapses_rejected: usize,
}

impl DecimationResult {
    /// Get the reduction ratio (final / original).
    #[must_use]
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Get the percentage of faces removed.
    #[must_use]
    pub fn reduction_percent(&self) -> f64 {
        (1.0 - self.reduction_ratio()) * 100.0
    }

    /// Check if any decimation occurred.
    #[must_use]
    pub const fn was_decimated(&self) -> bool {
        self.strict_collapses + self.relaxed_collapses > 0
    }

    /// Whether the run reached its target.
    #[must_use]
    pub const fn reached_target(&self) -> bool {
        self.final_faces <= self.target_faces
    }
}

impl std::fmt::Display for DecimationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decimation: {} → {} faces (target {}, {:.1}% reduction, {} collapses",
            self.original_faces,
            self.final_faces,
            self.target_faces,
            self.reduction_percent(),
            self.strict_collapses + self.relaxed_collapses
        )?;
        if self.relaxed_collapses > 0 {
            write!(f, ", {} relaxed", self.relaxed_collapses)?;
        }
        write!(f, ")")
    }
}
