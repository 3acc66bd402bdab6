//! Outer shell extraction for triangle meshes.
//!
//! Scanned, exported or assembled meshes often carry internal geometry:
//! nested parts, cavities, duplicated inner walls. This crate replaces such
//! a mesh by a single closed surface that bounds the same region from the
//! outside.
//!
//! Extraction is an ordered chain of [`ShellStrategy`]s. Each one either
//! produces a non-empty mesh or fails; the first success wins and the
//! remaining strategies are never run. The default chain is:
//!
//! 1. [`ShellStrategy::VoxelSurface`]: rasterize, flood the exterior, mesh
//!    the boundary of what is left.
//! 2. [`ShellStrategy::AlphaShape`]: Delaunay tetrahedralization of a
//!    surface sample, keeping tetrahedra under a circumradius limit.
//! 3. [`ShellStrategy::ConvexHull`]: convex hull of all vertices.
//! 4. [`ShellStrategy::PointCloudHull`]: convex hull of a sparse sample.
//! 5. [`ShellStrategy::Identity`]: the input, unchanged.
//!
//! # Example
//!
//! ```
//! use mesh_shell::{extract_shell, ShellParams, ShellStrategy};
//! use mesh_types::unit_cube;
//!
//! let result = extract_shell(&unit_cube(), &ShellParams::default());
//! assert_eq!(result.strategy_used, ShellStrategy::VoxelSurface);
//! assert!(result.mesh.is_watertight());
//! ```
//!
//! Strategies can also be run alone:
//!
//! ```
//! use mesh_shell::{ShellParams, ShellStrategy};
//! use mesh_types::unit_cube;
//!
//! let hull = ShellStrategy::ConvexHull
//!     .run(&unit_cube(), &ShellParams::default())
//!     .unwrap();
//! assert_eq!(hull.faces.len(), 12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod alpha;
mod error;
mod extract;
mod hull;
mod params;
mod sampling;
mod voxel;

pub use error::{ShellError, ShellResult};
pub use params::{ShellParams, ShellStrategy};

// Chain
pub use extract::{extract_shell, point_cloud_hull, vertex_hull, ShellAttempt, ShellExtraction};

// Building blocks
pub use alpha::{alpha_shape, tetrahedralize};
pub use hull::convex_hull;
pub use sampling::PointSample;
pub use voxel::{boundary_mesh, voxel_surface, VoxelGrid};
