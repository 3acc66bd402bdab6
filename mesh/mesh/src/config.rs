//! Pipeline configuration.

use mesh_repair::{DecimationPolicy, RepairOptions};
use mesh_shell::{ShellParams, ShellStrategy};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for every stage of a pipeline run.
///
/// Strategy order, voxel resolution and decimation thresholds are all
/// plain values here; nothing in the pipeline hard-codes them.
///
/// # Example
///
/// ```
/// use outer_shell::PipelineConfig;
/// use outer_shell::repair::DecimationPolicy;
///
/// let config = PipelineConfig::detailed()
///     .with_decimation(Some(DecimationPolicy::new(10_000, 5_000)));
/// assert_eq!(config.shell.voxel_resolution, 100);
/// assert_eq!(config.post_clean.decimation.unwrap().target_faces, 5_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Cleanup applied to the loaded mesh.
    ///
    /// Default: [`RepairOptions::pre_clean`]
    pub pre_clean: RepairOptions,

    /// Strategy chain and its parameters.
    ///
    /// Default: [`ShellParams::fast`]
    pub shell: ShellParams,

    /// Cleanup, hole filling, simplification and normal fixing applied to
    /// the shell. Hole filling only runs on shells that are not already
    /// watertight.
    ///
    /// Default: [`RepairOptions::post_clean`]
    pub post_clean: RepairOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pre_clean: RepairOptions::pre_clean(),
            shell: ShellParams::fast(),
            post_clean: RepairOptions::post_clean(),
        }
    }
}

impl PipelineConfig {
    /// Voxel resolution 64.
    #[must_use]
    pub fn fast() -> Self {
        Self::default()
    }

    /// Voxel resolution 100.
    #[must_use]
    pub fn detailed() -> Self {
        Self {
            shell: ShellParams::detailed(),
            ..Self::default()
        }
    }

    /// Replace the shell parameters.
    #[must_use]
    pub fn with_shell(mut self, shell: ShellParams) -> Self {
        self.shell = shell;
        self
    }

    /// Replace the strategy order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl Into<Vec<ShellStrategy>>) -> Self {
        self.shell = self.shell.with_strategies(strategies);
        self
    }

    /// Set or clear the post-extraction decimation policy.
    #[must_use]
    pub fn with_decimation(mut self, policy: Option<DecimationPolicy>) -> Self {
        self.post_clean.decimation = policy;
        self
    }

    /// Set the welding tolerance of the initial cleanup.
    #[must_use]
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.pre_clean = self.pre_clean.with_weld_tolerance(tolerance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stages() {
        let config = PipelineConfig::default();
        assert!(config.pre_clean.merge_vertices);
        assert!(!config.pre_clean.fill_holes);
        assert!(config.pre_clean.decimation.is_none());
        assert!(!config.post_clean.merge_vertices);
        assert!(config.post_clean.fix_normals);
        assert_eq!(
            config.post_clean.decimation,
            Some(DecimationPolicy::default())
        );
        assert_eq!(config.shell.voxel_resolution, 64);
        assert_eq!(config, PipelineConfig::fast());
    }

    #[test]
    fn builders() {
        let config = PipelineConfig::default()
            .with_strategies([ShellStrategy::ConvexHull])
            .with_decimation(None)
            .with_weld_tolerance(1e-3);
        assert_eq!(config.shell.strategies, vec![ShellStrategy::ConvexHull]);
        assert!(config.post_clean.decimation.is_none());
        assert!((config.pre_clean.weld_tolerance - 1e-3).abs() < f64::EPSILON);
    }
}
