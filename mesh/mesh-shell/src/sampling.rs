//! Surface point samples.

// Voxel keys come from floor() of finite coordinates divided by a
// positive cell size.
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use hashbrown::HashMap;
use mesh_types::{Aabb, MeshTopology, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An unordered set of points drawn from a surface.
///
/// Only ever used as input to reconstruction; nothing refers back to the
/// faces the points came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSample {
    /// The sampled positions.
    pub points: Vec<Point3<f64>>,
}

impl PointSample {
    /// Creates an empty sample.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Draw `count` points uniformly by area from the mesh surface.
    ///
    /// The same mesh, count and seed always give the same points. Returns
    /// an empty sample if the mesh has no face with positive, finite area.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_shell::PointSample;
    /// use mesh_types::unit_cube;
    ///
    /// let sample = PointSample::from_surface(&unit_cube(), 100, 7);
    /// assert_eq!(sample.len(), 100);
    /// assert_eq!(sample, PointSample::from_surface(&unit_cube(), 100, 7));
    /// ```
    #[must_use]
    pub fn from_surface<M: MeshTopology>(mesh: &M, count: usize, seed: u64) -> Self {
        let mut triangles = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0;
        for triangle in mesh.triangles() {
            let area = triangle.area();
            if area.is_finite() && area > 0.0 {
                total += area;
                triangles.push(triangle);
                cumulative.push(total);
            }
        }
        if triangles.is_empty() || !total.is_finite() {
            return Self::new();
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..count)
            .map(|_| {
                let target = rng.gen::<f64>() * total;
                let pick = cumulative
                    .partition_point(|&c| c < target)
                    .min(triangles.len() - 1);
                // Square-root warp gives a uniform density over the triangle.
                let r1 = rng.gen::<f64>().sqrt();
                let r2 = rng.gen::<f64>();
                triangles[pick].point_at(r1 * (1.0 - r2), r1 * r2)
            })
            .collect();
        Self { points }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box, `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        (!self.is_empty()).then(|| Aabb::from_points(self.points.iter()))
    }

    /// Add a point.
    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    /// Offset every point by a seeded random vector with components in
    /// `[-magnitude, magnitude]`.
    ///
    /// Breaks exact coplanarity and cosphericity before a Delaunay build.
    pub fn jitter(&mut self, magnitude: f64, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for p in &mut self.points {
            let offset = Vector3::from_fn(|_, _| rng.gen_range(-1.0..=1.0));
            *p += offset * magnitude;
        }
    }

    /// Replace the points in each cubic cell of edge `voxel_size` by their
    /// centroid.
    ///
    /// Output order follows the cells' first appearance in the input.
    #[must_use]
    pub fn downsample(&self, voxel_size: f64) -> Self {
        if self.points.is_empty() || !(voxel_size.is_finite() && voxel_size > 0.0) {
            return self.clone();
        }

        let mut cells: HashMap<[i64; 3], usize> = HashMap::new();
        let mut sums: Vec<(Vector3<f64>, usize)> = Vec::new();
        for p in &self.points {
            let key = [
                (p.x / voxel_size).floor() as i64,
                (p.y / voxel_size).floor() as i64,
                (p.z / voxel_size).floor() as i64,
            ];
            let slot = *cells.entry(key).or_insert_with(|| {
                sums.push((Vector3::zeros(), 0));
                sums.len() - 1
            });
            sums[slot].0 += p.coords;
            sums[slot].1 += 1;
        }

        let points = sums
            .into_iter()
            .map(|(sum, count)| Point3::from(sum / count as f64))
            .collect();
        Self { points }
    }
}

impl FromIterator<Point3<f64>> for PointSample {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
