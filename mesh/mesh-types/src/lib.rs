//! Core mesh types for the outer-shell pipeline.
//!
//! This crate provides the data model every other stage works on:
//!
//! - [`Vertex`] - A position with an optional unit normal
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Triangle`] - A concrete triangle with resolved positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Scene`] - Named sub-meshes from a multi-object source file
//!
//! # Units
//!
//! The pipeline is **unit-agnostic**. Coordinates are `f64` in whatever
//! unit the source file used; nothing downstream assumes millimeters.
//!
//! # Winding
//!
//! Face winding is **counter-clockwise (CCW) when viewed from outside**.
//! Normals point outward by the right-hand rule.
//!
//! # Derived attributes
//!
//! Bounds, normals and the watertight flag are computed on demand rather
//! than cached, so a mesh mutated in place by a repair pass never carries a
//! stale attribute.
//!
//! # Example
//!
//! ```
//! use mesh_types::{unit_cube, MeshBounds, MeshTopology};
//!
//! let cube = unit_cube();
//! assert_eq!(cube.face_count(), 12);
//! assert!(cube.is_watertight());
//! assert!((cube.bounds().max_extent() - 1.0).abs() < 1e-12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod mesh;
mod scene;
mod traits;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use mesh::{cuboid, torus, unit_cube, IndexedMesh};
pub use scene::Scene;
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
