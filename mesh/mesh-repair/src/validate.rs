//! Mesh health reporting.

use std::fmt;

use hashbrown::HashSet;
use mesh_types::{Aabb, IndexedMesh, MeshBounds};

use crate::adjacency::MeshAdjacency;
use crate::cleanup::canonical_rotation;
use crate::holes::detect_holes;
use crate::normals::count_inconsistent_edges;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counts and flags describing a mesh's condition.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,
    /// Distinct undirected edges.
    pub edge_count: usize,

    /// Edges with one face.
    pub boundary_edge_count: usize,
    /// Edges with more than two faces.
    pub non_manifold_edge_count: usize,
    /// Manifold edges both of whose faces traverse it the same way.
    pub inconsistent_edge_count: usize,
    /// Faces with repeated indices or zero area.
    pub degenerate_face_count: usize,
    /// Faces repeating an earlier face with the same winding.
    pub duplicate_face_count: usize,
    /// Boundary chains.
    pub hole_count: usize,

    /// No boundary edges.
    pub is_watertight: bool,
    /// No non-manifold edges.
    pub is_manifold: bool,
    /// Closed and with negative signed volume.
    pub is_inside_out: bool,

    /// Axis-aligned bounds of the vertices, `None` when empty.
    pub bounds: Option<Aabb>,
    /// Total face area.
    pub surface_area: f64,
    /// Signed enclosed volume (meaningful for closed meshes).
    pub signed_volume: f64,
}

impl MeshReport {
    /// Closed, manifold, consistently wound and outward.
    #[must_use]
    pub fn is_clean_shell(&self) -> bool {
        self.face_count > 0
            && self.is_watertight
            && self.is_manifold
            && self.inconsistent_edge_count == 0
            && !self.is_inside_out
    }

    /// Any countable defect present.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }

    /// Sum of all defect counts.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.boundary_edge_count
            + self.non_manifold_edge_count
            + self.inconsistent_edge_count
            + self.degenerate_face_count
            + self.duplicate_face_count
    }
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "yes" } else { "no" };

        writeln!(f, "Vertices:   {}", self.vertex_count)?;
        writeln!(f, "Faces:      {}", self.face_count)?;
        writeln!(f, "Edges:      {}", self.edge_count)?;
        if let Some(bounds) = &self.bounds {
            let size = bounds.size();
            writeln!(
                f,
                "Bounds:     [{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}] (size {:.4} x {:.4} x {:.4})",
                bounds.min.x, bounds.min.y, bounds.min.z,
                bounds.max.x, bounds.max.y, bounds.max.z,
                size.x, size.y, size.z
            )?;
        }
        writeln!(f, "Area:       {:.6}", self.surface_area)?;
        writeln!(f, "Volume:     {:.6}", self.signed_volume)?;
        writeln!(f, "Watertight: {}", yes_no(self.is_watertight))?;
        writeln!(f, "Manifold:   {}", yes_no(self.is_manifold))?;
        write!(f, "Inside-out: {}", yes_no(self.is_inside_out))?;

        let issues = [
            ("boundary edges", self.boundary_edge_count),
            ("holes", self.hole_count),
            ("non-manifold edges", self.non_manifold_edge_count),
            ("inconsistent edges", self.inconsistent_edge_count),
            ("degenerate faces", self.degenerate_face_count),
            ("duplicate faces", self.duplicate_face_count),
        ];
        for (label, count) in issues.iter().filter(|(_, c)| *c > 0) {
            write!(f, "\n  {label}: {count}")?;
        }
        Ok(())
    }
}

/// Inspect a mesh without modifying it.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::validate_mesh;
///
/// let report = validate_mesh(&unit_cube());
/// assert!(report.is_clean_shell());
/// assert_eq!(report.edge_count, 18);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let is_watertight = adjacency.is_watertight();
    let signed_volume = mesh.signed_volume();

    MeshReport {
        vertex_count: mesh.vertices.len(),
        face_count: mesh.faces.len(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        inconsistent_edge_count: count_inconsistent_edges(mesh),
        degenerate_face_count: count_degenerate_faces(mesh),
        duplicate_face_count: count_duplicate_faces(&mesh.faces),
        hole_count: detect_holes(&adjacency).len(),
        is_watertight,
        is_manifold: adjacency.is_manifold(),
        is_inside_out: is_watertight && !mesh.faces.is_empty() && signed_volume < 0.0,
        bounds: mesh.bounds_opt(),
        surface_area: mesh.surface_area(),
        signed_volume,
    }
}

fn count_degenerate_faces(mesh: &IndexedMesh) -> usize {
    mesh.faces
        .iter()
        .filter(|&&[a, b, c]| {
            if a == b || b == c || a == c {
                return true;
            }
            let (Some(v0), Some(v1), Some(v2)) = (
                mesh.vertices.get(a as usize),
                mesh.vertices.get(b as usize),
                mesh.vertices.get(c as usize),
            ) else {
                return true;
            };
            let area = (v1.position - v0.position)
                .cross(&(v2.position - v0.position))
                .norm();
            area.is_nan() || area <= 0.0
        })
        .count()
}

fn count_duplicate_faces(faces: &[[u32; 3]]) -> usize {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(faces.len());
    faces
        .iter()
        .filter(|&&face| !seen.insert(canonical_rotation(face)))
        .count()
}
