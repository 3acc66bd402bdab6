//! Outer shell extraction, end to end.
//!
//! This umbrella crate re-exports the `mesh-*` crates and adds the
//! pipeline that ties them together:
//!
//! ```text
//! bytes -> load -> pre-clean -> extract shell -> post-clean -> decimate -> fix normals -> GLB
//! ```
//!
//! Only two things can fail a run: reading the input and writing the
//! output. Everything in between degrades instead. Extraction falls back
//! through its strategy chain down to the cleaned input itself, and repair
//! steps report partial results as warnings.
//!
//! The pipeline is synchronous and keeps no state between calls, so
//! independent runs can go to separate threads without coordination.
//!
//! # Quick Start
//!
//! ```no_run
//! use outer_shell::{process, PipelineConfig};
//!
//! let bytes = std::fs::read("scan.stl").unwrap();
//! let report = process(&bytes, "stl", "scan_outer_shell.glb", &PipelineConfig::default()).unwrap();
//! println!("{report}");
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`, `Scene`
//! - [`io`] - OBJ, STL, PLY and GLB loading, GLB export
//! - [`repair`] - Cleanup, hole filling, winding repair, decimation policy
//! - [`decimate`] - Quadric edge-collapse simplification
//! - [`shell`] - Strategy chain for outer shell extraction

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{process, process_mesh, PipelineReport};

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`.
pub use mesh_types as types;

/// Loading and GLB export.
pub use mesh_io as io;

/// Mesh cleanup and repair.
pub use mesh_repair as repair;

/// Mesh simplification (QEM-based decimation).
pub use mesh_decimate as decimate;

/// Outer shell extraction.
pub use mesh_shell as shell;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for shell processing.
///
/// ```
/// use outer_shell::prelude::*;
///
/// let (shell, report) = process_mesh(unit_cube(), &PipelineConfig::default());
/// assert_eq!(shell.face_count(), report.output_faces);
/// ```
pub mod prelude {
    pub use crate::{process, process_mesh, PipelineConfig, PipelineError, PipelineReport};

    pub use mesh_types::{unit_cube, Aabb, IndexedMesh, MeshBounds, MeshTopology, Vertex};

    pub use mesh_io::{export_glb, load_mesh, load_mesh_file, MeshFormat};

    pub use mesh_repair::{repair_mesh, validate_mesh, DecimationPolicy, RepairOptions};

    pub use mesh_shell::{extract_shell, ShellParams, ShellStrategy};
}
