//! Parameters for mesh decimation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smallest face count decimation will ever produce.
pub const MIN_FACES: usize = 4;

/// Parameters for mesh decimation.
///
/// Decimation runs a strict pass first, honoring `preserve_boundary`,
/// `max_error` and the normal-flip check. If the target is still not met
/// and `guarantee_target` is set, a relaxed pass drops the boundary and
/// error constraints and keeps collapsing while any topologically valid
/// collapse remains.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecimateParams {
    /// Target number of faces. If None, uses `target_ratio` instead.
    pub target_faces: Option<usize>,

    /// Target ratio of faces to keep (0.0 to 1.0). Default: 0.5
    pub target_ratio: f64,

    /// Keep boundary vertices fixed during the strict pass. Default: true
    pub preserve_boundary: bool,

    /// Weight of the perpendicular planes added along boundary edges.
    /// Higher values keep open borders in place. Default: 10.0
    pub boundary_weight: f64,

    /// Maximum quadric error of a strict-pass collapse. If None, no limit.
    pub max_error: Option<f64>,

    /// Run the relaxed pass when the strict pass stalls above the target.
    /// Default: true
    pub guarantee_target: bool,
}

impl Default for DecimateParams {
    fn default() -> Self {
        Self {
            target_faces: None,
            target_ratio: 0.5,
            preserve_boundary: true,
            boundary_weight: 10.0,
            max_error: None,
            guarantee_target: true,
        }
    }
}

impl DecimateParams {
    /// Create params targeting a specific face count.
    #[must_use]
    pub fn with_target_faces(count: usize) -> Self {
        Self {
            target_faces: Some(count),
            ..Default::default()
        }
    }

    /// Create params targeting a ratio of the original faces.
    #[must_use]
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_ratio: if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) },
            ..Default::default()
        }
    }

    /// Strict-only decimation: stop where quality constraints stop it.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            guarantee_target: false,
            ..Default::default()
        }
    }

    /// Set preserve boundary option.
    #[must_use]
    pub const fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Set maximum strict-pass error.
    #[must_use]
    pub const fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = Some(max_error);
        self
    }

    /// Enable or disable the relaxed pass.
    #[must_use]
    pub const fn with_guarantee_target(mut self, guarantee: bool) -> Self {
        self.guarantee_target = guarantee;
        self
    }

    /// Face count to stop at for a mesh with `faces` faces.
    ///
    /// Never above `faces` and never below [`MIN_FACES`] (unless the mesh
    /// already has fewer).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    // Truncation: ratio is clamped to [0, 1], so the product fits in usize
    pub fn target_for(&self, faces: usize) -> usize {
        let target = self
            .target_faces
            .unwrap_or_else(|| (faces as f64 * self.target_ratio).ceil() as usize);
        target.max(MIN_FACES).min(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        let params = DecimateParams::default();
        assert!((params.target_ratio - 0.5).abs() < 0.001);
        assert!(params.preserve_boundary);
        assert!(params.guarantee_target);
        assert_eq!(params.max_error, None);
    }

    #[test]
    fn ratio_is_clamped() {
        assert!((DecimateParams::with_target_ratio(1.5).target_ratio - 1.0).abs() < 0.001);
        assert!(DecimateParams::with_target_ratio(-0.5).target_ratio.abs() < 0.001);
        assert!((DecimateParams::with_target_ratio(f64::NAN).target_ratio - 1.0).abs() < 0.001);
    }

    #[test]
    fn target_is_bounded() {
        let params = DecimateParams::with_target_faces(20_000);
        assert_eq!(params.target_for(80_000), 20_000);
        // Never a target above the current count.
        assert_eq!(params.target_for(500), 500);

        let params = DecimateParams::with_target_faces(0);
        assert_eq!(params.target_for(100), MIN_FACES);
        assert_eq!(params.target_for(2), 2);

        let params = DecimateParams::with_target_ratio(0.25);
        assert_eq!(params.target_for(101), 26);
    }

    #[test]
    fn builders() {
        let params = DecimateParams::strict()
            .with_preserve_boundary(false)
            .with_max_error(0.01);
        assert!(!params.guarantee_target);
        assert!(!params.preserve_boundary);
        assert_eq!(params.max_error, Some(0.01));
        assert!(params.with_guarantee_target(true).guarantee_target);
    }
}
