//! Mesh simplification using quadric error metrics.
//!
//! Edges are collapsed cheapest-first, where the cost of merging two
//! vertices is the summed squared distance of the merged position to the
//! planes of their original faces.
//!
//! # Guarantees
//!
//! - The face count never increases.
//! - A mesh is never reduced below four faces.
//! - Collapses that would break manifoldness (link condition) or flip a
//!   surviving face are rejected, so a closed input stays closed.
//! - If quality constraints stall the strict pass above the target, a
//!   relaxed pass keeps collapsing (see [`DecimateParams::guarantee_target`]).
//!
//! # Example
//!
//! ```
//! use mesh_types::torus;
//! use mesh_decimate::{decimate_mesh, DecimateParams};
//!
//! let mesh = torus(2.0, 0.5, 64, 32);
//!
//! // Keep a quarter of the faces
//! let result = decimate_mesh(&mesh, &DecimateParams::with_target_ratio(0.25)).unwrap();
//! println!("{}", result);
//! assert!(result.reached_target());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod decimate;
mod error;
mod params;
mod quadric;
mod result;

// Re-export main types and functions
pub use decimate::decimate_mesh;
pub use error::{DecimateError, DecimateResult};
pub use params::{DecimateParams, MIN_FACES};
pub use result::DecimationResult;
