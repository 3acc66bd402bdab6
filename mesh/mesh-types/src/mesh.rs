//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle, Vertex};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index. This is the single value that flows through the
/// pipeline: created by a loader, mutated in place by repair passes,
/// replaced wholesale by shell extraction, consumed by the exporter.
///
/// # Invariants
///
/// A mesh accepted by the loader satisfies [`IndexedMesh::has_valid_indices`]
/// and [`IndexedMesh::is_finite`]. Every repair pass preserves both.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// assert!(!mesh.is_watertight());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from bare positions and faces.
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>], faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices: positions.iter().copied().map(Vertex::new).collect(),
            faces,
        }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// Returns an empty mesh if either array length is not a multiple of 3.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let mesh = IndexedMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Self { vertices, faces }
    }

    /// Iterate over vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.vertices.iter().map(|v| &v.position)
    }

    /// True if every face index is below the vertex count.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n))
    }

    /// True if no vertex has a NaN or infinite coordinate.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(Vertex::is_finite)
    }

    /// Signed volume via the divergence theorem.
    ///
    /// Positive for a closed mesh with outward winding, negative when
    /// inside-out. Meaningless for open meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Absolute volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Whether every edge is shared by exactly two faces that traverse it
    /// in opposite directions.
    ///
    /// A mesh with no faces is not watertight.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }

        let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                if a == b {
                    return false;
                }
                *directed.entry((a, b)).or_insert(0) += 1;
            }
        }

        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Unit normal per face; degenerate faces get `None`.
    #[must_use]
    pub fn face_normals(&self) -> Vec<Option<Vector3<f64>>> {
        (0..self.faces.len())
            .map(|i| self.triangle(i).and_then(|t| t.normal()))
            .collect()
    }

    /// Recompute area-weighted vertex normals from the current winding.
    ///
    /// Vertices touched only by degenerate faces, or by none, get `None`.
    pub fn compute_vertex_normals(&mut self) {
        let mut sums = vec![Vector3::zeros(); self.vertices.len()];
        for i in 0..self.faces.len() {
            let Some(tri) = self.triangle(i) else {
                continue;
            };
            // Unnormalized normal weights by area.
            let n = tri.normal_unnormalized();
            for &vi in &self.faces[i] {
                sums[vi as usize] += n;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.try_normalize(f64::EPSILON);
        }
    }

    /// Reverse the winding of every face and negate stored normals.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            if let Some(normal) = vertex.normal.as_mut() {
                *normal = -*normal;
            }
        }
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Scale uniformly around the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in &mut self.vertices {
            vertex.position.coords *= factor;
        }
    }

    /// Append another mesh, offsetting its face indices by the current
    /// vertex count.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let [i0, i1, i2] = *self.faces.get(face_index)?;
        Some(Triangle::new(
            self.vertices.get(i0 as usize)?.position,
            self.vertices.get(i1 as usize)?.position,
            self.vertices.get(i2 as usize)?.position,
        ))
    }

    fn faces(&self) -> impl Iterator<Item = [u32; 3]> {
        self.faces.iter().copied()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions())
    }
}

/// Unit cube from the origin to (1, 1, 1), outward-wound.
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
}

/// Axis-aligned box between two corners: 8 vertices, 12 outward-wound
/// triangles.
#[must_use]
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> IndexedMesh {
    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = vec![
        // -Z
        [0, 2, 1],
        [0, 3, 2],
        // +Z
        [4, 5, 6],
        [4, 6, 7],
        // -Y
        [0, 1, 5],
        [0, 5, 4],
        // +Y
        [3, 7, 6],
        [3, 6, 2],
        // -X
        [0, 4, 7],
        [0, 7, 3],
        // +X
        [1, 2, 6],
        [1, 6, 5],
    ];

    IndexedMesh::from_positions(&positions, faces)
}

/// Closed torus around the Z axis with `rings * sides * 2` triangles.
///
/// `rings` segments run around the main circle, `sides` around the tube.
/// Both are clamped to at least 3.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
pub fn torus(major_radius: f64, minor_radius: f64, rings: usize, sides: usize) -> IndexedMesh {
    let rings = rings.max(3);
    let sides = sides.max(3);
    let mut mesh = IndexedMesh::with_capacity(rings * sides, rings * sides * 2);

    for i in 0..rings {
        let theta = std::f64::consts::TAU * i as f64 / rings as f64;
        let (st, ct) = theta.sin_cos();
        for j in 0..sides {
            let phi = std::f64::consts::TAU * j as f64 / sides as f64;
            let (sp, cp) = phi.sin_cos();
            let r = minor_radius.mul_add(cp, major_radius);
            mesh.vertices
                .push(Vertex::from_coords(r * ct, r * st, minor_radius * sp));
        }
    }

    let index = |i: usize, j: usize| ((i % rings) * sides + (j % sides)) as u32;
    for i in 0..rings {
        for j in 0..sides {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            mesh.faces.push([a, b, c]);
            mesh.faces.push([a, c, d]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty());

        mesh2.faces.push([0, 0, 0]);
        assert!(!mesh2.is_empty());
    }

    #[test]
    fn torus_is_closed_and_outward() {
        let t = torus(2.0, 0.5, 40, 20);
        assert_eq!(t.face_count(), 40 * 20 * 2);
        assert_eq!(t.vertex_count(), 40 * 20);
        assert!(t.is_watertight());
        // Analytic volume is 2 * pi^2 * R * r^2; the faceted one is a bit smaller.
        let analytic = 2.0 * std::f64::consts::PI.powi(2) * 2.0 * 0.25;
        assert!(t.signed_volume() > 0.95 * analytic);
        assert!(t.signed_volume() < analytic);
    }

    #[test]
    fn cuboid_corners() {
        let b = cuboid(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(b.volume(), 48.0, epsilon = 1e-12);
        assert!(b.is_watertight());
    }

    #[test]
    fn cube_volume_and_area() {
        let cube = unit_cube();
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn flipped_cube_is_inside_out() {
        let mut cube = unit_cube();
        cube.flip_normals();
        assert_relative_eq!(cube.signed_volume(), -1.0, epsilon = 1e-12);
        // Opposite winding everywhere is still watertight.
        assert!(cube.is_watertight());
    }

    #[test]
    fn watertight_detection() {
        let cube = unit_cube();
        assert!(cube.is_watertight());

        let mut open = cube.clone();
        open.faces.pop();
        assert!(!open.is_watertight());

        // One face flipped: its edges are now traversed twice in one direction.
        let mut inconsistent = cube;
        inconsistent.faces[0].swap(1, 2);
        assert!(!inconsistent.is_watertight());

        assert!(!IndexedMesh::new().is_watertight());
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        b.translate(Vector3::new(5.0, 0.0, 0.0));
        a.merge(&b);

        assert_eq!(a.vertex_count(), 16);
        assert_eq!(a.face_count(), 24);
        assert_eq!(a.faces[12], [8, 10, 9]);
        assert!(a.has_valid_indices());
        assert_relative_eq!(a.bounds().max.x, 6.0);
    }

    #[test]
    fn vertex_normals_point_outward() {
        let mut cube = unit_cube();
        cube.compute_vertex_normals();
        let n = cube.vertices[6].normal.unwrap();
        assert!(n.x > 0.0 && n.y > 0.0 && n.z > 0.0);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_indices_detected() {
        let mut mesh = unit_cube();
        assert!(mesh.has_valid_indices());
        mesh.faces.push([0, 1, 99]);
        assert!(!mesh.has_valid_indices());
        // The bad face is skipped rather than panicking.
        assert_eq!(mesh.triangles().count(), 12);
    }

    #[test]
    fn face_normals_flag_degenerates() {
        let mut mesh = unit_cube();
        mesh.faces.push([0, 1, 1]);
        let normals = mesh.face_normals();
        assert_eq!(normals.len(), 13);
        assert!(normals[12].is_none());
        assert_relative_eq!(normals[2].unwrap().z, 1.0);
    }
}
