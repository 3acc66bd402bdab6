//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges (edges with only one adjacent
//! face). Loops are traced along the directed boundary half-edges, so each
//! loop is ordered the way its neighbouring faces traverse it; the patch is
//! triangulated over the reversed loop, which makes the new faces wind
//! consistently with the surface around the hole.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::fill_holes;
//!
//! let mut mesh = unit_cube();
//! mesh.faces.truncate(10); // Open the +X side
//!
//! let outcome = fill_holes(&mut mesh, 100);
//! assert_eq!(outcome.changed, 1);
//! assert!(outcome.warning.is_none());
//! assert!(mesh.is_watertight());
//! ```

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Point3, Triangle, Vector3};
use tracing::{debug, info, warn};

use crate::adjacency::MeshAdjacency;
use crate::warning::{RepairOutcome, RepairWarning};

/// A chain of boundary edges.
///
/// `vertices` is ordered along the boundary half-edges: consecutive
/// vertices `a, b` mean some face traverses `a -> b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered vertex indices.
    pub vertices: Vec<u32>,
    /// The chain returns to its first vertex.
    pub closed: bool,
    /// The chain passes through a vertex with more than one outgoing or
    /// incoming boundary edge.
    pub non_manifold: bool,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Closed, at least a triangle, and through manifold vertices only.
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        self.closed && !self.non_manifold && self.vertices.len() >= 3
    }
}

/// Trace all boundary chains of the mesh.
///
/// # Example
///
/// ```
/// use mesh_repair::{detect_holes, MeshAdjacency};
///
/// let adjacency = MeshAdjacency::build(&[[0, 1, 2]]);
/// let holes = detect_holes(&adjacency);
///
/// assert_eq!(holes.len(), 1);
/// assert_eq!(holes[0].vertices, vec![0, 1, 2]);
/// assert!(holes[0].is_fillable());
/// ```
#[must_use]
pub fn detect_holes(adjacency: &MeshAdjacency) -> Vec<BoundaryLoop> {
    let edges = adjacency.boundary_half_edges();
    if edges.is_empty() {
        return Vec::new();
    }

    let mut outgoing: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut incoming: HashMap<u32, usize> = HashMap::new();
    for &(a, b) in &edges {
        outgoing.entry(a).or_default().push(b);
        *incoming.entry(b).or_default() += 1;
    }
    let branching = |v: u32| {
        outgoing.get(&v).map_or(0, Vec::len) > 1 || incoming.get(&v).copied().unwrap_or(0) > 1
    };

    let mut visited: HashSet<(u32, u32)> = HashSet::with_capacity(edges.len());
    let mut loops = Vec::new();

    for &(start, first) in &edges {
        if !visited.insert((start, first)) {
            continue;
        }

        let mut vertices = vec![start];
        let mut non_manifold = branching(start);
        let mut closed = false;
        let mut current = first;

        // Every step consumes an unvisited edge, so this terminates.
        loop {
            if current == start {
                closed = true;
                break;
            }
            non_manifold |= branching(current);
            vertices.push(current);

            let next = outgoing
                .get(&current)
                .and_then(|targets| targets.iter().find(|&&t| !visited.contains(&(current, t))))
                .copied();
            match next {
                Some(n) => {
                    visited.insert((current, n));
                    current = n;
                }
                None => break,
            }
        }

        if !closed {
            warn!(start, length = vertices.len(), "Boundary chain is not closed");
        }
        loops.push(BoundaryLoop {
            vertices,
            closed,
            non_manifold,
        });
    }

    debug!(
        boundary_edges = edges.len(),
        loops = loops.len(),
        "Traced boundary loops"
    );
    loops
}

/// Triangulate a closed loop by ear clipping, falling back to a fan when
/// no ear can be found.
///
/// The returned faces traverse every loop edge in the opposite direction
/// from the loop itself.
#[must_use]
pub fn triangulate_loop(mesh: &IndexedMesh, boundary: &BoundaryLoop) -> Vec<[u32; 3]> {
    let n = boundary.vertices.len();
    if n < 3 {
        return Vec::new();
    }

    let reversed: Vec<u32> = boundary.vertices.iter().rev().copied().collect();
    let Some(positions) = reversed
        .iter()
        .map(|&idx| mesh.vertices.get(idx as usize).map(|v| v.position))
        .collect::<Option<Vec<Point3<f64>>>>()
    else {
        return Vec::new();
    };

    let normal = newell_normal(&positions);
    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let next = remaining[(i + 1) % len];
            is_ear(&positions, &remaining, prev, remaining[i], next, &normal)
        });

        let Some(i) = ear else {
            debug!(remaining = len, "No ear found, fan-filling the rest");
            break;
        };
        let prev = remaining[(i + len - 1) % len];
        let next = remaining[(i + 1) % len];
        triangles.push([reversed[prev], reversed[remaining[i]], reversed[next]]);
        remaining.remove(i);
    }

    for i in 1..remaining.len() - 1 {
        triangles.push([
            reversed[remaining[0]],
            reversed[remaining[i]],
            reversed[remaining[i + 1]],
        ]);
    }

    triangles
}

/// Fill every fillable boundary loop with at most `max_edges` edges.
///
/// `changed` counts filled loops. Loops that are too long, open or pass
/// through a non-manifold vertex are left alone and reported in a
/// [`RepairWarning::HolesSkipped`]. A mesh without boundary edges is
/// untouched, so a second call is a no-op.
pub fn fill_holes(mesh: &mut IndexedMesh, max_edges: usize) -> RepairOutcome {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let holes = detect_holes(&adjacency);
    if holes.is_empty() {
        return RepairOutcome::unchanged();
    }

    let mut too_large = 0;
    let mut non_manifold = 0;
    let mut patches = Vec::new();

    for hole in &holes {
        if !hole.is_fillable() {
            non_manifold += 1;
            continue;
        }
        if hole.edge_count() > max_edges {
            too_large += 1;
            continue;
        }
        let triangles = triangulate_loop(mesh, hole);
        if triangles.is_empty() {
            non_manifold += 1;
        } else {
            patches.push(triangles);
        }
    }

    let filled = patches.len();
    for patch in patches {
        mesh.faces.extend(patch);
    }
    if filled > 0 {
        info!(filled, "Filled holes");
    }

    let outcome = RepairOutcome::changed(filled);
    let skipped = too_large + non_manifold;
    if skipped == 0 {
        return outcome;
    }

    warn!(skipped, too_large, non_manifold, max_edges, "Left holes unfilled");
    outcome.with_warning(RepairWarning::HolesSkipped {
        skipped,
        too_large,
        non_manifold,
        max_edges,
    })
}

/// Newell's polygon normal, unit length; `+Z` for degenerate polygons.
fn newell_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    let n = positions.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let p0 = positions[i];
        let p1 = positions[(i + 1) % n];
        normal.x += (p0.y - p1.y) * (p0.z + p1.z);
        normal.y += (p0.z - p1.z) * (p0.x + p1.x);
        normal.z += (p0.x - p1.x) * (p0.y + p1.y);
    }
    normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
}

fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    polygon_normal: &Vector3<f64>,
) -> bool {
    let (a, b, c) = (positions[prev], positions[curr], positions[next]);

    // Reflex or degenerate corners are not ears.
    let Some(tri_normal) = Triangle::new(a, b, c).normal() else {
        return false;
    };
    if tri_normal.dot(polygon_normal) <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .any(|&idx| point_in_triangle_projected(&positions[idx], &a, &b, &c, polygon_normal))
}

/// Point-in-triangle test after dropping the axis most aligned with
/// `normal`.
fn point_in_triangle_projected(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    let (nx, ny, nz) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let project = |q: &Point3<f64>| {
        if nz >= nx && nz >= ny {
            (q.x, q.y)
        } else if ny >= nx {
            (q.x, q.z)
        } else {
            (q.y, q.z)
        }
    };
    let (p, a, b, c) = (project(p), project(a), project(b), project(c));

    let side = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };
    let d1 = side(p, a, b);
    let d2 = side(p, b, c);
    let d3 = side(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, Vertex};

    /// Unit cube without its two top triangles.
    fn open_box() -> IndexedMesh {
        let mut mesh = unit_cube();
        let top: Vec<usize> = mesh
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.iter().all(|&v| mesh.vertices[v as usize].position.z > 0.5))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(top.len(), 2);
        for i in top.into_iter().rev() {
            mesh.faces.remove(i);
        }
        mesh
    }

    /// Flat 3x3 vertex grid with the centre vertex's faces removed.
    fn grid_with_hole() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        for y in 0..4 {
            for x in 0..4 {
                mesh.vertices
                    .push(Vertex::from_coords(f64::from(x), f64::from(y), 0.0));
            }
        }
        for y in 0..3u32 {
            for x in 0..3u32 {
                if x == 1 && y == 1 {
                    continue;
                }
                let i = y * 4 + x;
                mesh.faces.push([i, i + 1, i + 5]);
                mesh.faces.push([i, i + 5, i + 4]);
            }
        }
        mesh
    }

    #[test]
    fn open_box_has_one_square_hole() {
        let mesh = open_box();
        let holes = detect_holes(&MeshAdjacency::build(&mesh.faces));
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].edge_count(), 4);
        assert!(holes[0].is_fillable());
    }

    #[test]
    fn closed_cube_has_no_holes() {
        let mesh = unit_cube();
        assert!(detect_holes(&MeshAdjacency::build(&mesh.faces)).is_empty());
    }

    #[test]
    fn filled_box_is_watertight_and_outward() {
        let mut mesh = open_box();
        let outcome = fill_holes(&mut mesh, 100);
        assert_eq!(outcome.changed, 1);
        assert!(outcome.warning.is_none());
        assert_eq!(mesh.faces.len(), 12);
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 1.0, epsilon = 1e-9);

        // Second run finds nothing to do.
        assert_eq!(fill_holes(&mut mesh, 100), RepairOutcome::unchanged());
    }

    #[test]
    fn too_large_holes_are_reported() {
        let mut mesh = open_box();
        let before = mesh.faces.len();
        let outcome = fill_holes(&mut mesh, 3);
        assert_eq!(outcome.changed, 0);
        assert_eq!(mesh.faces.len(), before);
        assert_eq!(
            outcome.warning,
            Some(RepairWarning::HolesSkipped {
                skipped: 1,
                too_large: 1,
                non_manifold: 0,
                max_edges: 3,
            })
        );
    }

    #[test]
    fn inner_hole_of_a_sheet_is_filled_flat() {
        let mut mesh = grid_with_hole();
        let holes = detect_holes(&MeshAdjacency::build(&mesh.faces));
        // Outer rim (12 edges) and the inner square (4 edges).
        let mut sizes: Vec<usize> = holes.iter().map(BoundaryLoop::edge_count).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 12]);

        let area_before = mesh.surface_area();
        let outcome = fill_holes(&mut mesh, 4);
        assert_eq!(outcome.changed, 1);
        assert_relative_eq!(mesh.surface_area(), area_before + 1.0, epsilon = 1e-9);

        // All new faces point the same way as the sheet.
        for face in &mesh.faces {
            let tri = Triangle::new(
                mesh.vertices[face[0] as usize].position,
                mesh.vertices[face[1] as usize].position,
                mesh.vertices[face[2] as usize].position,
            );
            assert!(tri.normal().is_some_and(|n| n.z > 0.99));
        }
    }

    #[test]
    fn concave_loop_uses_ears() {
        // L-shaped hexagon in the plane, wound so the patch faces +Z.
        let mut mesh = IndexedMesh::new();
        for (x, y) in [(0.0, 0.0), (0.0, 2.0), (1.0, 2.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)] {
            mesh.vertices.push(Vertex::from_coords(x, y, 0.0));
        }
        let boundary = BoundaryLoop {
            vertices: (0..6).collect(),
            closed: true,
            non_manifold: false,
        };
        let triangles = triangulate_loop(&mesh, &boundary);
        assert_eq!(triangles.len(), 4);

        let area: f64 = triangles
            .iter()
            .map(|f| {
                Triangle::new(
                    mesh.vertices[f[0] as usize].position,
                    mesh.vertices[f[1] as usize].position,
                    mesh.vertices[f[2] as usize].position,
                )
                .area()
            })
            .sum();
        assert_relative_eq!(area, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn bowtie_vertex_is_skipped() {
        // Two triangles touching at vertex 0 only.
        let mut mesh = IndexedMesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (-1.0, 0.0), (-1.0, -1.0)] {
            mesh.vertices.push(Vertex::from_coords(x, y, 0.0));
        }
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 3, 4]);

        let outcome = fill_holes(&mut mesh, 100);
        assert_eq!(outcome.changed, 0);
        assert!(matches!(
            outcome.warning,
            Some(RepairWarning::HolesSkipped { non_manifold, .. }) if non_manifold > 0
        ));
        assert_eq!(mesh.faces.len(), 2);
    }
}
