//! Mesh vertex.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex: a position plus an optional unit normal.
///
/// Normals are filled in by loaders that carry them (OBJ `vn`, glTF
/// `NORMAL`) and recomputed by the normal-fixing repair pass before
/// export.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3, Vector3};
///
/// let v = Vertex::from_coords(1.0, 2.0, 3.0);
/// assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
/// assert!(v.normal.is_none());
///
/// let n = v.with_normal(Vector3::z());
/// assert_eq!(n.normal, Some(Vector3::z()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in model space.
    pub position: Point3<f64>,

    /// Unit normal, if known.
    pub normal: Option<Vector3<f64>>,
}

impl Vertex {
    /// Create a vertex at the given position with no normal.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Attach a normal. The vector is stored as given.
    #[inline]
    #[must_use]
    pub const fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = Some(normal);
        self
    }

    /// True if every coordinate of the position is finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

impl From<[f64; 3]> for Vertex {
    fn from(c: [f64; 3]) -> Self {
        Self::from_coords(c[0], c[1], c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_from_array() {
        let v: Vertex = [1.0, -2.0, 0.5].into();
        assert!((v.position.y + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vertex_finite_check() {
        assert!(Vertex::from_coords(0.0, 1.0, 2.0).is_finite());
        assert!(!Vertex::from_coords(f64::NAN, 1.0, 2.0).is_finite());
        assert!(!Vertex::from_coords(0.0, f64::INFINITY, 2.0).is_finite());
    }
}
