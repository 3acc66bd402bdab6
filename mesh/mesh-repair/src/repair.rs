//! The composed repair pass.

use std::fmt;

use mesh_types::IndexedMesh;
use tracing::{debug, info};

use crate::cleanup::{
    merge_vertices, remove_degenerate_faces, remove_duplicate_faces, remove_unreferenced_vertices,
};
use crate::holes::fill_holes;
use crate::normals::fix_normals;
use crate::simplify::{decimate, DecimationPolicy};
use crate::warning::{RepairOutcome, RepairWarning};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which repair operations to run, and their thresholds.
///
/// All distances are in mesh units.
///
/// # Example
///
/// ```
/// use mesh_repair::{DecimationPolicy, RepairOptions};
///
/// // Cleanup only, for freshly loaded meshes
/// let pre = RepairOptions::pre_clean().with_weld_tolerance(1e-4);
/// assert!(!pre.fill_holes);
///
/// // Everything, with a custom simplification budget
/// let post = RepairOptions::default()
///     .with_decimation(Some(DecimationPolicy::new(10_000, 5_000)));
/// assert!(post.fix_normals);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct RepairOptions {
    /// Weld vertices closer than `weld_tolerance`.
    ///
    /// Default: `true`
    pub merge_vertices: bool,

    /// Welding distance. `0.0` merges bit-identical positions only.
    ///
    /// Default: `1e-9`
    pub weld_tolerance: f64,

    /// Drop repeated faces.
    ///
    /// Default: `true`
    pub remove_duplicates: bool,

    /// Drop faces with repeated indices or tiny area.
    ///
    /// Default: `true`
    pub remove_degenerates: bool,

    /// Faces with area at or below this are degenerate.
    ///
    /// Default: `0.0`
    pub degenerate_area_threshold: f64,

    /// Drop vertices no face uses.
    ///
    /// Default: `true`
    pub remove_unreferenced: bool,

    /// Close boundary loops.
    ///
    /// Default: `true`
    pub fill_holes: bool,

    /// Longest loop that gets filled.
    ///
    /// Default: `1000`
    pub max_hole_edges: usize,

    /// Simplification policy, `None` to never decimate.
    ///
    /// Default: `Some(DecimationPolicy::default())`
    pub decimation: Option<DecimationPolicy>,

    /// Make winding consistent and outward and recompute vertex normals.
    ///
    /// Default: `true`
    pub fix_normals: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            merge_vertices: true,
            weld_tolerance: 1e-9,
            remove_duplicates: true,
            remove_degenerates: true,
            degenerate_area_threshold: 0.0,
            remove_unreferenced: true,
            fill_holes: true,
            max_hole_edges: 1000,
            decimation: Some(DecimationPolicy::default()),
            fix_normals: true,
        }
    }
}

impl RepairOptions {
    /// Element cleanup only: weld, duplicates, degenerates, unreferenced.
    #[must_use]
    pub fn pre_clean() -> Self {
        Self {
            fill_holes: false,
            decimation: None,
            fix_normals: false,
            ..Self::default()
        }
    }

    /// Everything except welding, for meshes that are already indexed
    /// (extracted shells).
    #[must_use]
    pub fn post_clean() -> Self {
        Self {
            merge_vertices: false,
            ..Self::default()
        }
    }

    /// Nothing enabled. Combine with the builders to pick single steps.
    #[must_use]
    pub fn none() -> Self {
        Self {
            merge_vertices: false,
            remove_duplicates: false,
            remove_degenerates: false,
            remove_unreferenced: false,
            fill_holes: false,
            decimation: None,
            fix_normals: false,
            ..Self::default()
        }
    }

    /// Enable welding with the given tolerance.
    #[must_use]
    pub const fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.merge_vertices = true;
        self.weld_tolerance = tolerance;
        self
    }

    /// Set the degenerate-face area threshold.
    #[must_use]
    pub const fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Enable or disable hole filling.
    #[must_use]
    pub const fn with_fill_holes(mut self, enabled: bool) -> Self {
        self.fill_holes = enabled;
        self
    }

    /// Set the longest loop that gets filled.
    #[must_use]
    pub const fn with_max_hole_edges(mut self, max_edges: usize) -> Self {
        self.max_hole_edges = max_edges;
        self
    }

    /// Set or clear the decimation policy.
    #[must_use]
    pub const fn with_decimation(mut self, policy: Option<DecimationPolicy>) -> Self {
        self.decimation = policy;
        self
    }

    /// Enable or disable normal fixing.
    #[must_use]
    pub const fn with_fix_normals(mut self, enabled: bool) -> Self {
        self.fix_normals = enabled;
        self
    }
}

/// What [`repair_mesh`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Vertices before repair.
    pub initial_vertices: usize,
    /// Faces before repair.
    pub initial_faces: usize,
    /// Vertices after repair.
    pub final_vertices: usize,
    /// Faces after repair.
    pub final_faces: usize,
    /// Vertices merged by welding.
    pub vertices_merged: usize,
    /// Repeated faces removed.
    pub duplicates_removed: usize,
    /// Degenerate faces removed.
    pub degenerates_removed: usize,
    /// Unused vertices removed.
    pub unreferenced_removed: usize,
    /// Boundary loops closed.
    pub holes_filled: usize,
    /// Faces removed by decimation.
    pub faces_decimated: usize,
    /// Faces whose winding was reversed.
    pub faces_flipped: usize,
    /// Non-fatal problems, in the order they happened.
    pub warnings: Vec<RepairWarning>,
}

impl RepairReport {
    /// Whether any step modified the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_merged > 0
            || self.duplicates_removed > 0
            || self.degenerates_removed > 0
            || self.unreferenced_removed > 0
            || self.holes_filled > 0
            || self.faces_decimated > 0
            || self.faces_flipped > 0
    }

    fn record(&mut self, outcome: RepairOutcome) -> usize {
        if let Some(warning) = outcome.warning {
            self.warnings.push(warning);
        }
        outcome.changed
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repair: {} -> {} verts ({} merged, {} unreferenced), {} -> {} faces \
             ({} duplicate, {} degenerate, {} decimated, {} holes filled, {} flipped)",
            self.initial_vertices,
            self.final_vertices,
            self.vertices_merged,
            self.unreferenced_removed,
            self.initial_faces,
            self.final_faces,
            self.duplicates_removed,
            self.degenerates_removed,
            self.faces_decimated,
            self.holes_filled,
            self.faces_flipped
        )?;
        if !self.warnings.is_empty() {
            write!(f, ", {} warning(s)", self.warnings.len())?;
        }
        Ok(())
    }
}

/// Run the enabled repair operations in a fixed order: weld, duplicates,
/// degenerates, unreferenced, holes, decimation, normals.
///
/// Never fails; partial results are reported in
/// [`RepairReport::warnings`].
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{repair_mesh, RepairOptions};
///
/// let mut mesh = unit_cube();
/// mesh.faces.push(mesh.faces[0]);      // duplicate
/// mesh.faces.push([0, 0, 1]);          // degenerate
/// mesh.faces.swap_remove(5);           // hole
///
/// let report = repair_mesh(&mut mesh, &RepairOptions::default());
/// assert_eq!(report.duplicates_removed, 1);
/// assert_eq!(report.degenerates_removed, 1);
/// assert_eq!(report.holes_filled, 1);
/// assert!(report.warnings.is_empty());
/// assert!(mesh.is_watertight());
///
/// // A second pass has nothing to do.
/// assert!(!repair_mesh(&mut mesh, &RepairOptions::default()).had_changes());
/// ```
pub fn repair_mesh(mesh: &mut IndexedMesh, options: &RepairOptions) -> RepairReport {
    let mut report = RepairReport {
        initial_vertices: mesh.vertices.len(),
        initial_faces: mesh.faces.len(),
        ..RepairReport::default()
    };

    if options.merge_vertices {
        report.vertices_merged = merge_vertices(mesh, options.weld_tolerance);
    }
    if options.remove_duplicates {
        report.duplicates_removed = remove_duplicate_faces(mesh);
    }
    if options.remove_degenerates {
        report.degenerates_removed =
            remove_degenerate_faces(mesh, options.degenerate_area_threshold);
    }
    if options.remove_unreferenced {
        report.unreferenced_removed = remove_unreferenced_vertices(mesh);
    }
    if options.fill_holes {
        report.holes_filled = report.record(fill_holes(mesh, options.max_hole_edges));
    }
    if let Some(target) = options
        .decimation
        .and_then(|policy| policy.target_for(mesh.faces.len()))
    {
        report.faces_decimated = report.record(decimate(mesh, target));
    }
    if options.fix_normals {
        report.faces_flipped = report.record(fix_normals(mesh));
    }

    report.final_vertices = mesh.vertices.len();
    report.final_faces = mesh.faces.len();

    debug!(report = %report, "Repair finished");
    if report.had_changes() {
        info!(
            vertices = report.final_vertices,
            faces = report.final_faces,
            warnings = report.warnings.len(),
            "Repaired mesh"
        );
    }
    report
}
