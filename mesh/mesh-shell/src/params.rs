//! Strategy selection and tuning parameters.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ShellError, ShellResult};

/// One way of producing an outer shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShellStrategy {
    /// Rasterize, flood the exterior, mesh the solid's boundary.
    ///
    /// Cavities and nested shells vanish. Highest fidelity.
    VoxelSurface,
    /// Delaunay tetrahedralization of surface samples, filtered by
    /// circumradius.
    AlphaShape,
    /// Convex hull of the vertex set.
    ConvexHull,
    /// Convex hull of a small downsampled surface sample.
    PointCloudHull,
    /// The input, unchanged. Cannot fail on a non-empty mesh.
    Identity,
}

impl ShellStrategy {
    /// Every strategy, most faithful first.
    pub const ALL: [Self; 5] = [
        Self::VoxelSurface,
        Self::AlphaShape,
        Self::ConvexHull,
        Self::PointCloudHull,
        Self::Identity,
    ];

    /// Stable snake-case name, used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VoxelSurface => "voxel_surface",
            Self::AlphaShape => "alpha_shape",
            Self::ConvexHull => "convex_hull",
            Self::PointCloudHull => "point_cloud_hull",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for ShellStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for [`extract_shell`](crate::extract_shell).
///
/// Strategy order, voxel resolution and sample counts are plain values so
/// callers can tune the trade-off between fidelity and cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShellParams {
    /// Strategies to try, in order. The first non-empty result wins.
    pub strategies: Vec<ShellStrategy>,
    /// Cells along the longest bounding-box edge (`R`). Voxel pitch is
    /// `max_extent / voxel_resolution`.
    pub voxel_resolution: u32,
    /// Upper bound on the voxel grid size, padding included.
    pub max_voxel_cells: usize,
    /// Surface samples fed to the alpha shape.
    pub alpha_sample_count: usize,
    /// Alpha radius as a fraction of the longest bounding-box edge.
    pub alpha_ratio: f64,
    /// Surface samples fed to the point-cloud hull.
    pub fallback_sample_count: usize,
    /// Seed for surface sampling. Equal seeds give equal shells.
    pub seed: u64,
}

impl Default for ShellParams {
    fn default() -> Self {
        Self {
            strategies: ShellStrategy::ALL.to_vec(),
            voxel_resolution: 64,
            max_voxel_cells: 1 << 24,
            alpha_sample_count: 1024,
            alpha_ratio: 0.25,
            fallback_sample_count: 256,
            seed: 0x5EED,
        }
    }
}

impl ShellParams {
    /// Coarse voxel grid, `R = 64`. Same as the default.
    #[must_use]
    pub fn fast() -> Self {
        Self::default()
    }

    /// Finer voxel grid, `R = 100`.
    #[must_use]
    pub fn detailed() -> Self {
        Self {
            voxel_resolution: 100,
            ..Self::default()
        }
    }

    /// Replace the strategy chain.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl Into<Vec<ShellStrategy>>) -> Self {
        self.strategies = strategies.into();
        self
    }

    /// Set the voxel resolution `R`.
    #[must_use]
    pub const fn with_voxel_resolution(mut self, resolution: u32) -> Self {
        self.voxel_resolution = resolution;
        self
    }

    /// Set the alpha radius as a fraction of the longest edge.
    #[must_use]
    pub const fn with_alpha_ratio(mut self, ratio: f64) -> Self {
        self.alpha_ratio = ratio;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the numeric parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::InvalidParams`] for a zero resolution, a zero
    /// cell budget or a non-positive alpha ratio.
    pub fn validate(&self) -> ShellResult<()> {
        if self.voxel_resolution == 0 {
            return Err(ShellError::invalid_params("voxel_resolution must be positive"));
        }
        if self.max_voxel_cells == 0 {
            return Err(ShellError::invalid_params("max_voxel_cells must be positive"));
        }
        if !(self.alpha_ratio.is_finite() && self.alpha_ratio > 0.0) {
            return Err(ShellError::invalid_params(format!(
                "alpha_ratio must be positive, got {}",
                self.alpha_ratio
            )));
        }
        Ok(())
    }
}
