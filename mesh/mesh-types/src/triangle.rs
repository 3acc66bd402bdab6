//! Triangle type for geometric calculations.

use nalgebra::{Point3, Vector3};

/// A triangle with concrete vertex positions.
///
/// # Example
///
/// ```
/// use mesh_types::{Triangle, Point3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// assert!((tri.area() - 0.5).abs() < 1e-12);
/// assert!((tri.normal().unwrap().z - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3<f64>,
    /// Second vertex.
    pub v1: Point3<f64>,
    /// Third vertex.
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Cross product of the two edges leaving `v0`.
    ///
    /// Its length is twice the area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, or `None` when the triangle has zero area.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > 0.0 && len_sq.is_finite() {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Area of the triangle.
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Centroid (mean of the three corners).
    #[inline]
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// True if the area is at or below `area_threshold`.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self, area_threshold: f64) -> bool {
        self.area() <= area_threshold
    }

    /// Point at barycentric coordinates `(1 - u - v, u, v)`.
    #[inline]
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.v0 + (self.v1 - self.v0) * u + (self.v2 - self.v0) * v
    }

    /// Corners as an array.
    #[inline]
    #[must_use]
    pub const fn corners(&self) -> [Point3<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        )
    }

    #[test]
    fn area_and_centroid() {
        let tri = right_triangle();
        assert_relative_eq!(tri.area(), 6.0);
        assert_relative_eq!(tri.centroid().x, 1.0);
        assert_relative_eq!(tri.centroid().y, 4.0 / 3.0);
    }

    #[test]
    fn collinear_triangle_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert!(tri.is_degenerate(0.0));
        assert!(!right_triangle().is_degenerate(0.0));
    }

    #[test]
    fn barycentric_point() {
        let tri = right_triangle();
        let p = tri.point_at(0.5, 0.5);
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.y, 2.0);
    }
}
