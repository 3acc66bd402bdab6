//! Idempotent mesh cleanup and repair.
//!
//! Every operation mutates an [`IndexedMesh`] in place and never fails:
//!
//! - [`merge_vertices`] - weld coincident vertices (STL soups)
//! - [`remove_duplicate_faces`] - drop repeated faces
//! - [`remove_degenerate_faces`] - drop zero-area and collapsed faces
//! - [`remove_unreferenced_vertices`] - compact the vertex array
//! - [`fill_holes`] - close boundary loops by ear clipping
//! - [`decimate`] - quadric edge collapse toward a face budget
//! - [`fix_normals`] - consistent, outward winding and vertex normals
//!
//! The cleanup operations return the number of removed elements. The
//! best-effort ones return a [`RepairOutcome`] whose optional
//! [`RepairWarning`] says what could not be done. Running any operation on
//! its own output changes nothing.
//!
//! [`repair_mesh`] chains the enabled operations from [`RepairOptions`] and
//! collects a [`RepairReport`]; [`validate_mesh`] inspects without
//! modifying.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::{repair_mesh, validate_mesh, RepairOptions};
//!
//! let mut mesh = unit_cube();
//! mesh.flip_normals();
//! assert!(validate_mesh(&mesh).is_inside_out);
//!
//! let report = repair_mesh(&mut mesh, &RepairOptions::default());
//! assert_eq!(report.faces_flipped, 12);
//! assert!(validate_mesh(&mesh).is_clean_shell());
//! ```
//!
//! [`IndexedMesh`]: mesh_types::IndexedMesh

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod adjacency;
mod cleanup;
mod holes;
mod normals;
mod repair;
mod simplify;
mod validate;
mod warning;

pub use adjacency::MeshAdjacency;
pub use cleanup::{
    canonical_rotation, merge_vertices, remove_degenerate_faces, remove_duplicate_faces,
    remove_unreferenced_vertices,
};
pub use holes::{detect_holes, fill_holes, triangulate_loop, BoundaryLoop};
pub use normals::{count_inconsistent_edges, fix_normals};
pub use repair::{repair_mesh, RepairOptions, RepairReport};
pub use simplify::{decimate, DecimationPolicy};
pub use validate::{validate_mesh, MeshReport};
pub use warning::{RepairOutcome, RepairWarning};
