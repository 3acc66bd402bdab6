//! Traits for mesh types.

use crate::{Aabb, Triangle, Vertex};
use nalgebra::Point3;

/// Read access to mesh topology.
///
/// Algorithms that only read geometry take `&impl MeshTopology`, so test
/// fixtures and alternative representations can be passed directly.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangular faces.
    fn face_count(&self) -> usize;

    /// True when there is nothing to render: no vertices or no faces.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Vertex by index, `None` if out of range.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// Face by index, `None` if out of range.
    fn face(&self, index: usize) -> Option<[u32; 3]>;

    /// Face with resolved positions, `None` if the face or any of its
    /// indices is out of range.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over faces as vertex index triples.
    fn faces(&self) -> impl Iterator<Item = [u32; 3]>;

    /// Iterate over every face with resolved positions.
    ///
    /// Faces with out-of-range indices are skipped.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Types that can report an axis-aligned bounding box.
pub trait MeshBounds {
    /// Bounding box of every vertex; empty for a mesh with no vertices.
    fn bounds(&self) -> Aabb;

    /// Bounding box, or `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }
}
