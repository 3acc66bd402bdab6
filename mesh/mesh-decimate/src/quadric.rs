//! Quadric error metric.
//!
//! A quadric accumulates squared distances to a set of weighted planes. The
//! error of placing a vertex at `p` is `[p 1]^T Q [p 1]`; the minimizer
//! solves the upper-left 3x3 system.

use mesh_types::{Point3, Vector3};
use nalgebra::Matrix3;

/// Symmetric 4x4 quadric, stored as the 3x3 block `a`, the vector `b` and
/// the scalar `c` of `p^T A p + 2 b^T p + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    a: Matrix3<f64>,
    b: Vector3<f64>,
    c: f64,
}

impl Default for Quadric {
    fn default() -> Self {
        Self {
            a: Matrix3::zeros(),
            b: Vector3::zeros(),
            c: 0.0,
        }
    }
}

impl std::ops::AddAssign for Quadric {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
    }
}

impl std::ops::Add for Quadric {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Quadric {
    /// Quadric of the plane through `point` with unit `normal`, scaled by
    /// `weight`.
    #[must_use]
    pub fn from_plane(normal: &Vector3<f64>, point: &Point3<f64>, weight: f64) -> Self {
        let d = -normal.dot(&point.coords);
        Self {
            a: normal * normal.transpose() * weight,
            b: normal * (d * weight),
            c: d * d * weight,
        }
    }

    /// Area-weighted quadric of a triangle's supporting plane, or `None`
    /// for a degenerate triangle.
    #[must_use]
    pub fn from_triangle(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Self> {
        let cross = (p1 - p0).cross(&(p2 - p0));
        let double_area = cross.norm();
        if double_area <= f64::EPSILON || !double_area.is_finite() {
            return None;
        }
        Some(Self::from_plane(&(cross / double_area), p0, 0.5 * double_area))
    }

    /// Squared-distance error of placing a vertex at `p`.
    #[must_use]
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let v = p.coords;
        (v.dot(&(self.a * v)) + 2.0 * self.b.dot(&v) + self.c).max(0.0)
    }

    /// Position minimizing the error, or `None` when the 3x3 block is
    /// (near) singular, e.g. for coplanar or collinear plane sets.
    #[must_use]
    pub fn optimal_point(&self) -> Option<Point3<f64>> {
        let scale = self.a.amax();
        if scale <= 0.0 || self.a.determinant().abs() <= 1e-12 * scale * scale * scale {
            return None;
        }
        let inv = self.a.try_inverse()?;
        let p = -(inv * self.b);
        p.iter().all(|c| c.is_finite()).then(|| Point3::from(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_quadric_has_no_error() {
        let q = Quadric::default();
        assert_relative_eq!(q.evaluate(&Point3::new(1.0, 2.0, 3.0)), 0.0);
        assert!(q.optimal_point().is_none());
    }

    #[test]
    fn plane_error_is_squared_distance() {
        let q = Quadric::from_plane(&Vector3::z(), &Point3::new(5.0, 5.0, 1.0), 1.0);
        assert_relative_eq!(q.evaluate(&Point3::new(-3.0, 7.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 0.0, 3.0)), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn triangle_quadric_is_area_weighted() {
        let q = Quadric::from_triangle(
            &Point3::origin(),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 2.0, 0.0),
        )
        .unwrap();
        // Area 2, distance 1.
        assert_relative_eq!(q.evaluate(&Point3::new(0.3, 0.3, 1.0)), 2.0, epsilon = 1e-12);

        let flat = Quadric::from_triangle(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(flat.is_none());
    }

    #[test]
    fn three_planes_meet_at_corner() {
        let corner = Point3::new(1.0, -2.0, 0.5);
        let q = Quadric::from_plane(&Vector3::x(), &corner, 1.0)
            + Quadric::from_plane(&Vector3::y(), &corner, 1.0)
            + Quadric::from_plane(&Vector3::z(), &corner, 1.0);

        let p = q.optimal_point().unwrap();
        assert_relative_eq!(p, corner, epsilon = 1e-9);
        assert_relative_eq!(q.evaluate(&p), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn coplanar_planes_have_no_unique_optimum() {
        let mut q = Quadric::from_plane(&Vector3::z(), &Point3::origin(), 1.0);
        q += Quadric::from_plane(&Vector3::z(), &Point3::new(1.0, 1.0, 0.0), 3.0);
        assert!(q.optimal_point().is_none());
    }
}
