//! Face-count reduction as a repair step.

use mesh_decimate::{decimate_mesh, DecimateParams, MIN_FACES};
use mesh_types::IndexedMesh;
use tracing::{info, warn};

use crate::warning::{RepairOutcome, RepairWarning};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When and how far to simplify.
///
/// Meshes above `decimate_above` faces are reduced to
/// `min(target_faces, faces / 2)`; smaller meshes are left alone.
///
/// # Example
///
/// ```
/// use mesh_repair::DecimationPolicy;
///
/// let policy = DecimationPolicy::default();
/// assert_eq!(policy.target_for(80_000), Some(20_000));
/// assert_eq!(policy.target_for(30_000), None);
///
/// // Just over the threshold, halving is the tighter bound.
/// let policy = DecimationPolicy::new(1_000, 20_000);
/// assert_eq!(policy.target_for(1_500), Some(750));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecimationPolicy {
    /// Face count above which decimation runs.
    ///
    /// Default: `50_000`
    pub decimate_above: usize,

    /// Upper bound on the face count after decimation.
    ///
    /// Default: `20_000`
    pub target_faces: usize,
}

impl Default for DecimationPolicy {
    fn default() -> Self {
        Self {
            decimate_above: 50_000,
            target_faces: 20_000,
        }
    }
}

impl DecimationPolicy {
    /// Create a policy from its two thresholds.
    #[must_use]
    pub const fn new(decimate_above: usize, target_faces: usize) -> Self {
        Self {
            decimate_above,
            target_faces,
        }
    }

    /// Target face count for a mesh with `faces` faces, or `None` if it is
    /// small enough already.
    #[must_use]
    pub fn target_for(&self, faces: usize) -> Option<usize> {
        (faces > self.decimate_above).then(|| self.target_faces.min(faces / 2))
    }
}

/// Decimate `mesh` toward `target_faces` faces.
///
/// The face count never increases and never drops below
/// [`MIN_FACES`]. `changed` is the number of faces removed. Invalid input
/// leaves the mesh untouched with a [`RepairWarning::DecimationSkipped`];
/// stopping above the target yields a
/// [`RepairWarning::TargetNotReached`].
///
/// Vertex normals are discarded; run [`crate::fix_normals`] afterwards.
///
/// # Example
///
/// ```
/// use mesh_types::torus;
/// use mesh_repair::decimate;
///
/// let mut mesh = torus(2.0, 0.5, 40, 20);
/// let outcome = decimate(&mut mesh, 400);
///
/// assert_eq!(outcome.changed, 1600 - mesh.faces.len());
/// assert!(mesh.faces.len() <= 400);
/// ```
pub fn decimate(mesh: &mut IndexedMesh, target_faces: usize) -> RepairOutcome {
    let original = mesh.faces.len();
    let target = target_faces.max(MIN_FACES);
    if original <= target {
        return RepairOutcome::unchanged();
    }

    let params = DecimateParams::with_target_faces(target);
    let result = match decimate_mesh(mesh, &params) {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Decimation skipped");
            return RepairOutcome::unchanged().with_warning(RepairWarning::DecimationSkipped {
                reason: e.to_string(),
            });
        }
    };

    let reached = result.final_faces;
    info!(
        original,
        target,
        reached,
        reduction_percent = result.reduction_percent(),
        "Decimated mesh"
    );
    *mesh = result.mesh;

    let outcome = RepairOutcome::changed(original.saturating_sub(reached));
    if reached <= target {
        return outcome;
    }
    warn!(target, reached, "Decimation stopped above target");
    outcome.with_warning(RepairWarning::TargetNotReached { target, reached })
}
