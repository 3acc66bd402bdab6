//! Non-fatal repair outcomes.
//!
//! Repair operations never fail the pipeline. Each one mutates the mesh in
//! place and reports how much it changed, plus a warning when it could only
//! do part of its job.

use thiserror::Error;

/// A repair operation that finished with a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairWarning {
    /// Some boundary loops were left open.
    #[error("{skipped} hole(s) left unfilled ({too_large} over {max_edges} edges, {non_manifold} through non-manifold vertices)")]
    HolesSkipped {
        /// Total loops left open.
        skipped: usize,
        /// Loops longer than the limit.
        too_large: usize,
        /// Loops that are open chains or pass through a vertex with several
        /// boundary edges.
        non_manifold: usize,
        /// The configured limit.
        max_edges: usize,
    },

    /// Winding could not be made fully consistent.
    #[error("winding left inconsistent ({conflicts} conflicting face pairs, {non_manifold_edges} non-manifold edges)")]
    OrientationIncomplete {
        /// Face pairs whose relative orientation contradicts the traversal
        /// (non-orientable surface).
        conflicts: usize,
        /// Edges with more than two faces, across which nothing propagates.
        non_manifold_edges: usize,
    },

    /// Decimation did not run.
    #[error("decimation skipped: {reason}")]
    DecimationSkipped {
        /// Why.
        reason: String,
    },

    /// Decimation ran but stopped above its target.
    #[error("decimation stopped at {reached} faces (target {target})")]
    TargetNotReached {
        /// Requested face count.
        target: usize,
        /// Face count reached.
        reached: usize,
    },
}

/// What a single repair operation did: the in-place form of a
/// `(mesh, warning?)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Number of elements changed (removed, added or flipped, depending on
    /// the operation).
    pub changed: usize,
    /// Set when the operation only partially succeeded.
    pub warning: Option<RepairWarning>,
}

impl RepairOutcome {
    /// Nothing to do.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            changed: 0,
            warning: None,
        }
    }

    /// Changed `n` elements without complaint.
    #[must_use]
    pub const fn changed(n: usize) -> Self {
        Self {
            changed: n,
            warning: None,
        }
    }

    /// Attach a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: RepairWarning) -> Self {
        self.warning = Some(warning);
        self
    }

    /// Whether the mesh was modified.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.changed > 0
    }
}
