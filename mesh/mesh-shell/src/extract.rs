//! The strategy chain.

use mesh_types::{IndexedMesh, MeshBounds, MeshTopology, Point3};
use tracing::{debug, info, warn};

use crate::alpha::alpha_shape;
use crate::error::{ShellError, ShellResult};
use crate::hull::convex_hull;
use crate::params::{ShellParams, ShellStrategy};
use crate::sampling::PointSample;
use crate::voxel::voxel_surface;

/// Downsampling cells along the longest edge for the point-cloud hull.
const CLOUD_CELLS: f64 = 32.0;

impl ShellStrategy {
    /// Run this strategy alone.
    ///
    /// # Errors
    ///
    /// Whatever the strategy reports; see the individual functions.
    pub fn run(self, mesh: &IndexedMesh, params: &ShellParams) -> ShellResult<IndexedMesh> {
        match self {
            Self::VoxelSurface => voxel_surface(mesh, params),
            Self::AlphaShape => alpha_shape(mesh, params),
            Self::ConvexHull => vertex_hull(mesh),
            Self::PointCloudHull => point_cloud_hull(mesh, params),
            Self::Identity => identity(mesh),
        }
    }
}

/// Convex hull of every vertex of the mesh.
///
/// # Errors
///
/// [`ShellError::EmptyMesh`] for an input without faces, otherwise as
/// [`convex_hull`].
pub fn vertex_hull(mesh: &IndexedMesh) -> ShellResult<IndexedMesh> {
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh);
    }
    let points: Vec<Point3<f64>> = mesh.positions().copied().collect();
    convex_hull(&points)
}

/// Convex hull of a small, downsampled surface sample plus the mesh's
/// axis-extreme vertices.
///
/// # Errors
///
/// [`ShellError::EmptyMesh`] for an input without faces, otherwise as
/// [`convex_hull`].
pub fn point_cloud_hull(mesh: &IndexedMesh, params: &ShellParams) -> ShellResult<IndexedMesh> {
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh);
    }

    let sample = PointSample::from_surface(
        mesh,
        params.fallback_sample_count,
        params.seed.wrapping_add(2),
    );
    let mut cloud = sample.downsample(mesh.bounds().max_extent() / CLOUD_CELLS);
    for p in axis_extremes(mesh) {
        cloud.push(p);
    }
    debug!(samples = sample.len(), cloud = cloud.len(), "Built point cloud");

    convex_hull(&cloud.points)
}

fn identity(mesh: &IndexedMesh) -> ShellResult<IndexedMesh> {
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh);
    }
    Ok(mesh.clone())
}

/// Minimum and maximum vertex along each axis.
fn axis_extremes(mesh: &IndexedMesh) -> Vec<Point3<f64>> {
    let Some(first) = mesh.positions().next() else {
        return Vec::new();
    };
    let mut extremes = [*first; 6];
    for p in mesh.positions() {
        for axis in 0..3 {
            if p[axis] < extremes[2 * axis][axis] {
                extremes[2 * axis] = *p;
            }
            if p[axis] > extremes[2 * axis + 1][axis] {
                extremes[2 * axis + 1] = *p;
            }
        }
    }
    extremes.to_vec()
}

/// One invoked strategy and, if it did not win, why.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellAttempt {
    /// The strategy.
    pub strategy: ShellStrategy,
    /// `None` for the strategy that produced the shell.
    pub failure: Option<ShellError>,
}

/// Result of [`extract_shell`].
#[derive(Debug, Clone)]
pub struct ShellExtraction {
    /// The shell.
    pub mesh: IndexedMesh,
    /// Strategy that produced it.
    pub strategy_used: ShellStrategy,
    /// Every strategy invoked, in order. Strategies after the winner are
    /// never invoked and never appear here.
    pub attempts: Vec<ShellAttempt>,
}

impl ShellExtraction {
    /// True if `strategy` was run.
    #[must_use]
    pub fn was_attempted(&self, strategy: ShellStrategy) -> bool {
        self.attempts.iter().any(|a| a.strategy == strategy)
    }

    /// Number of strategies that failed before one succeeded.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.failure.is_some()).count()
    }
}

/// Extract the outer shell of a mesh.
///
/// Runs `params.strategies` in order and stops at the first one that
/// returns a mesh with vertices and faces. Failures are logged and kept in
/// [`ShellExtraction::attempts`]; they never escape. If every configured
/// strategy fails, the input is returned unchanged as if by
/// [`ShellStrategy::Identity`].
///
/// # Example
///
/// ```
/// use mesh_shell::{extract_shell, ShellParams, ShellStrategy};
/// use mesh_types::{cuboid, unit_cube, Point3};
///
/// let mut mesh = unit_cube();
/// mesh.merge(&cuboid(Point3::new(0.4, 0.4, 0.4), Point3::new(0.6, 0.6, 0.6)));
///
/// let shell = extract_shell(&mesh, &ShellParams::default());
/// assert_eq!(shell.strategy_used, ShellStrategy::VoxelSurface);
/// assert_eq!(shell.mesh.faces.len(), 12);
/// assert_eq!(shell.attempts.len(), 1);
/// ```
#[must_use]
pub fn extract_shell(mesh: &IndexedMesh, params: &ShellParams) -> ShellExtraction {
    let mut attempts = Vec::with_capacity(params.strategies.len());

    for &strategy in &params.strategies {
        let failure = match strategy.run(mesh, params) {
            Ok(shell) if shell.vertex_count() > 0 && shell.face_count() > 0 => {
                info!(
                    strategy = %strategy,
                    vertices = shell.vertex_count(),
                    faces = shell.face_count(),
                    "Extracted shell"
                );
                attempts.push(ShellAttempt {
                    strategy,
                    failure: None,
                });
                return ShellExtraction {
                    mesh: shell,
                    strategy_used: strategy,
                    attempts,
                };
            }
            Ok(_) => ShellError::EmptyResult,
            Err(err) => err,
        };
        warn!(strategy = %strategy, error = %failure, "Shell strategy failed");
        attempts.push(ShellAttempt {
            strategy,
            failure: Some(failure),
        });
    }

    warn!(
        attempted = attempts.len(),
        "No strategy produced a shell, keeping the input"
    );
    ShellExtraction {
        mesh: mesh.clone(),
        strategy_used: ShellStrategy::Identity,
        attempts,
    }
}
