//! Boolean occupancy grid.

// Grid coordinates come from floor() of bounded, finite values and are
// clamped into the grid before use.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use std::collections::VecDeque;

use mesh_types::{Aabb, MeshTopology, Point3, Triangle, Vector3};

use crate::error::{ShellError, ShellResult};

/// A 3D occupancy field with a uniform pitch.
///
/// Cell `(ix, iy, iz)` covers the cube from
/// `origin + pitch * (ix, iy, iz)` to `origin + pitch * (ix + 1, iy + 1, iz + 1)`.
/// Cells are stored with x varying fastest.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    occupied: Vec<bool>,
    dimensions: [usize; 3],
    origin: Point3<f64>,
    pitch: f64,
}

impl VoxelGrid {
    /// Create an empty grid.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_shell::VoxelGrid;
    /// use mesh_types::Point3;
    ///
    /// let grid = VoxelGrid::new([4, 4, 4], Point3::origin(), 0.5);
    /// assert_eq!(grid.len(), 64);
    /// assert_eq!(grid.occupied_count(), 0);
    /// ```
    #[must_use]
    pub fn new(dimensions: [usize; 3], origin: Point3<f64>, pitch: f64) -> Self {
        let [nx, ny, nz] = dimensions;
        Self {
            occupied: vec![false; nx * ny * nz],
            dimensions,
            origin,
            pitch,
        }
    }

    /// Size a grid for a bounding box at `resolution` cells along its
    /// longest edge.
    ///
    /// The box is padded by one and a half cells on every side, so the
    /// outermost layer of cells never touches the box and cell `(0, 0, 0)`
    /// is always exterior.
    ///
    /// # Errors
    ///
    /// - [`ShellError::Degenerate`] if the box is empty, infinite or has
    ///   zero extent.
    /// - [`ShellError::GridTooLarge`] if the padded grid exceeds
    ///   `max_cells`.
    pub fn for_bounds(bounds: &Aabb, resolution: u32, max_cells: usize) -> ShellResult<Self> {
        if bounds.is_empty() || !bounds.is_finite() {
            return Err(ShellError::degenerate("mesh bounds are empty or not finite"));
        }
        let pitch = bounds.max_extent() / f64::from(resolution);
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(ShellError::degenerate(format!(
                "voxel pitch {pitch} from extent {}",
                bounds.max_extent()
            )));
        }

        let size = bounds.size();
        let mut dimensions = [0usize; 3];
        for (axis, n) in dimensions.iter_mut().enumerate() {
            *n = (size[axis] / pitch).ceil() as usize + 3;
        }

        let cells = dimensions.iter().map(|&n| n as u128).product::<u128>();
        if cells > max_cells as u128 {
            return Err(ShellError::GridTooLarge {
                cells,
                limit: max_cells,
            });
        }

        let origin = bounds.min - Vector3::repeat(1.5 * pitch);
        Ok(Self::new(dimensions, origin, pitch))
    }

    /// Cells along each axis.
    #[must_use]
    pub const fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Minimum corner of cell `(0, 0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Edge length of a cell.
    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// True if the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    /// Occupancy of a cell; `false` outside the grid.
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.linear(ix, iy, iz).is_some_and(|i| self.occupied[i])
    }

    /// Set a cell. Does nothing outside the grid.
    pub fn set(&mut self, ix: usize, iy: usize, iz: usize, value: bool) {
        if let Some(i) = self.linear(ix, iy, iz) {
            self.occupied[i] = value;
        }
    }

    /// Occupancy for signed coordinates; `false` outside the grid.
    pub(crate) fn is_solid(&self, cell: [i64; 3]) -> bool {
        if cell.iter().any(|&c| c < 0) {
            return false;
        }
        self.get(cell[0] as usize, cell[1] as usize, cell[2] as usize)
    }

    /// World-space center of a cell.
    #[must_use]
    pub fn cell_center(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        self.origin + Vector3::new(ix as f64 + 0.5, iy as f64 + 0.5, iz as f64 + 0.5) * self.pitch
    }

    /// Mark every cell that a triangle of the mesh touches.
    ///
    /// Uses the separating-axis triangle/box test, so thin triangles and
    /// triangles smaller than a cell are never missed. Faces with invalid
    /// indices are skipped. Returns the number of newly occupied cells.
    pub fn rasterize<M: MeshTopology>(&mut self, mesh: &M) -> usize {
        let half = self.pitch * 0.5;
        let mut marked = 0;

        for triangle in mesh.triangles() {
            let Some((lo, hi)) = self.cell_range(&triangle) else {
                continue;
            };
            for iz in lo[2]..=hi[2] {
                for iy in lo[1]..=hi[1] {
                    for ix in lo[0]..=hi[0] {
                        let index = self.index(ix, iy, iz);
                        if self.occupied[index] {
                            continue;
                        }
                        let center = self.cell_center(ix, iy, iz);
                        if triangle_overlaps_cube(center, half, &triangle) {
                            self.occupied[index] = true;
                            marked += 1;
                        }
                    }
                }
            }
        }
        marked
    }

    /// Flood the exterior from cell `(0, 0, 0)` and make everything it
    /// cannot reach solid.
    ///
    /// Enclosed cavities, including nested shells, become part of the
    /// solid. Returns the number of cells filled.
    ///
    /// # Errors
    ///
    /// [`ShellError::Degenerate`] if the start cell is occupied, which
    /// means the grid has no exterior padding.
    pub fn fill_exterior(&mut self) -> ShellResult<usize> {
        if self.occupied.first().copied().unwrap_or(true) {
            return Err(ShellError::degenerate("grid corner is occupied"));
        }

        let [nx, ny, nz] = self.dimensions;
        let layer = nx * ny;
        let mut exterior = vec![false; self.occupied.len()];
        let mut queue = VecDeque::new();
        exterior[0] = true;
        queue.push_back(0usize);

        while let Some(index) = queue.pop_front() {
            let ix = index % nx;
            let iy = (index / nx) % ny;
            let iz = index / layer;
            let neighbors = [
                (ix > 0).then(|| index - 1),
                (ix + 1 < nx).then(|| index + 1),
                (iy > 0).then(|| index - nx),
                (iy + 1 < ny).then(|| index + nx),
                (iz > 0).then(|| index - layer),
                (iz + 1 < nz).then(|| index + layer),
            ];
            for next in neighbors.into_iter().flatten() {
                if !exterior[next] && !self.occupied[next] {
                    exterior[next] = true;
                    queue.push_back(next);
                }
            }
        }

        let mut filled = 0;
        for (cell, outside) in self.occupied.iter_mut().zip(&exterior) {
            if !*outside && !*cell {
                *cell = true;
                filled += 1;
            }
        }
        Ok(filled)
    }

    fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + iy * self.dimensions[0] + iz * self.dimensions[0] * self.dimensions[1]
    }

    fn linear(&self, ix: usize, iy: usize, iz: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dimensions;
        (ix < nx && iy < ny && iz < nz).then(|| self.index(ix, iy, iz))
    }

    /// Inclusive cell range covering a triangle's bounds, clamped to the grid.
    fn cell_range(&self, triangle: &Triangle) -> Option<([usize; 3], [usize; 3])> {
        let corners = triangle.corners();
        if corners.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return None;
        }
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..3 {
            let (min, max) = corners
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), p| {
                    (a.min(p[axis]), b.max(p[axis]))
                });
            let last = self.dimensions[axis] as i64 - 1;
            let to_cell = |x: f64| (((x - self.origin[axis]) / self.pitch).floor() as i64).clamp(0, last);
            lo[axis] = to_cell(min) as usize;
            hi[axis] = to_cell(max) as usize;
        }
        Some((lo, hi))
    }
}

/// Separating-axis test between a triangle and an axis-aligned cube.
///
/// Touching counts as overlapping.
fn triangle_overlaps_cube(center: Point3<f64>, half: f64, triangle: &Triangle) -> bool {
    let v = [
        triangle.v0 - center,
        triangle.v1 - center,
        triangle.v2 - center,
    ];

    // Box face normals.
    for axis in 0..3 {
        let min = v[0][axis].min(v[1][axis]).min(v[2][axis]);
        let max = v[0][axis].max(v[1][axis]).max(v[2][axis]);
        if min > half || max < -half {
            return false;
        }
    }

    // Cross products of box axes and triangle edges.
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
    for edge in &edges {
        for axis in 0..3 {
            let l = Vector3::ith(axis, 1.0).cross(edge);
            let p = [l.dot(&v[0]), l.dot(&v[1]), l.dot(&v[2])];
            let radius = half * l.abs().sum();
            let min = p[0].min(p[1]).min(p[2]);
            let max = p[0].max(p[1]).max(p[2]);
            if min > radius || max < -radius {
                return false;
            }
        }
    }

    // Triangle plane.
    let normal = edges[0].cross(&edges[1]);
    normal.dot(&v[0]).abs() <= half * normal.abs().sum()
}
