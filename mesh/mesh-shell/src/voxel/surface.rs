//! Boundary surface of a solid voxel grid.
//!
//! Coplanar cell faces are merged into rectangles, then each rectangle is
//! triangulated so that it shares every boundary vertex with its
//! neighbours. The result is closed and outward-wound, with no T-junctions.

// Lattice coordinates are bounded by the grid dimensions.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Vector3, Vertex};

use super::grid::VoxelGrid;

/// Lattice key in half-cell units, so rectangle centers stay integral.
type Key = [i64; 3];

/// An axis-aligned rectangle of merged cell faces.
#[derive(Debug, Clone, Copy)]
struct Rect {
    /// Normal axis.
    axis: usize,
    /// Faces point toward +axis.
    positive: bool,
    /// Lattice plane along `axis`.
    plane: i64,
    /// Lattice span along the first in-plane axis.
    u: (i64, i64),
    /// Lattice span along the second in-plane axis.
    v: (i64, i64),
}

impl Rect {
    fn key(&self, u: i64, v: i64) -> Key {
        let mut key = [0; 3];
        key[self.axis] = 2 * self.plane;
        key[(self.axis + 1) % 3] = 2 * u;
        key[(self.axis + 2) % 3] = 2 * v;
        key
    }

    fn corners(&self) -> [Key; 4] {
        [
            self.key(self.u.0, self.v.0),
            self.key(self.u.1, self.v.0),
            self.key(self.u.1, self.v.1),
            self.key(self.u.0, self.v.1),
        ]
    }

    fn center(&self) -> Key {
        let mut key = [0; 3];
        key[self.axis] = 2 * self.plane;
        key[(self.axis + 1) % 3] = self.u.0 + self.u.1;
        key[(self.axis + 2) % 3] = self.v.0 + self.v.1;
        key
    }

    /// Every lattice point on the perimeter, counter-clockwise in (u, v)
    /// starting at the minimum corner.
    fn perimeter(&self) -> impl Iterator<Item = Key> + '_ {
        let (u0, u1) = self.u;
        let (v0, v1) = self.v;
        let bottom = (u0..u1).map(move |u| (u, v0));
        let right = (v0..v1).map(move |v| (u1, v));
        let top = (u0 + 1..=u1).rev().map(move |u| (u, v1));
        let left = (v0 + 1..=v1).rev().map(move |v| (u0, v));
        bottom
            .chain(right)
            .chain(top)
            .chain(left)
            .map(move |(u, v)| self.key(u, v))
    }
}

/// Mesh the boundary between solid and empty cells.
///
/// Faces point from solid into empty space. Cells that touch only along
/// an edge produce a non-manifold edge there.
#[must_use]
pub fn boundary_mesh(grid: &VoxelGrid) -> IndexedMesh {
    let rects = merge_faces(grid);

    let corners: HashSet<Key> = rects.iter().flat_map(Rect::corners).collect();

    let mut builder = MeshBuilder::new(grid);
    for rect in &rects {
        let mut ring: Vec<Key> = rect.perimeter().filter(|k| corners.contains(k)).collect();
        if !rect.positive {
            ring.reverse();
        }

        if ring.len() == 4 {
            builder.triangle(ring[0], ring[1], ring[2]);
            builder.triangle(ring[0], ring[2], ring[3]);
        } else {
            // Neighbour corners split this rectangle's edges; fan from
            // the center so every split point is a vertex here too.
            let center = rect.center();
            for (i, &a) in ring.iter().enumerate() {
                let b = ring[(i + 1) % ring.len()];
                builder.triangle(center, a, b);
            }
        }
    }
    builder.finish()
}

/// Greedy rectangle merge of boundary faces, plane by plane.
fn merge_faces(grid: &VoxelGrid) -> Vec<Rect> {
    let dims = grid.dimensions();
    let mut rects = Vec::new();

    for axis in 0..3 {
        let (ua, va) = ((axis + 1) % 3, (axis + 2) % 3);
        let (nu, nv) = (dims[ua], dims[va]);
        let mut mask = vec![0i8; nu * nv];

        for plane in 0..=dims[axis] as i64 {
            for j in 0..nv {
                for i in 0..nu {
                    let mut cell = [0i64; 3];
                    cell[ua] = i as i64;
                    cell[va] = j as i64;
                    cell[axis] = plane - 1;
                    let below = grid.is_solid(cell);
                    cell[axis] = plane;
                    let above = grid.is_solid(cell);
                    mask[j * nu + i] = match (below, above) {
                        (true, false) => 1,
                        (false, true) => -1,
                        _ => 0,
                    };
                }
            }

            for j in 0..nv {
                let mut i = 0;
                while i < nu {
                    let sign = mask[j * nu + i];
                    if sign == 0 {
                        i += 1;
                        continue;
                    }

                    let mut width = 1;
                    while i + width < nu && mask[j * nu + i + width] == sign {
                        width += 1;
                    }
                    let mut height = 1;
                    while j + height < nv
                        && mask[(j + height) * nu + i..(j + height) * nu + i + width]
                            .iter()
                            .all(|&m| m == sign)
                    {
                        height += 1;
                    }
                    for row in j..j + height {
                        mask[row * nu + i..row * nu + i + width].fill(0);
                    }

                    rects.push(Rect {
                        axis,
                        positive: sign > 0,
                        plane,
                        u: (i as i64, (i + width) as i64),
                        v: (j as i64, (j + height) as i64),
                    });
                    i += width;
                }
            }
        }
    }
    rects
}

struct MeshBuilder<'a> {
    grid: &'a VoxelGrid,
    index: HashMap<Key, u32>,
    mesh: IndexedMesh,
}

impl<'a> MeshBuilder<'a> {
    fn new(grid: &'a VoxelGrid) -> Self {
        Self {
            grid,
            index: HashMap::new(),
            mesh: IndexedMesh::new(),
        }
    }

    fn vertex(&mut self, key: Key) -> u32 {
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let half = self.grid.pitch() * 0.5;
        let offset = Vector3::new(key[0] as f64, key[1] as f64, key[2] as f64) * half;
        let i = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(Vertex::new(self.grid.origin() + offset));
        self.index.insert(key, i);
        i
    }

    fn triangle(&mut self, a: Key, b: Key, c: Key) {
        let face = [self.vertex(a), self.vertex(b), self.vertex(c)];
        self.mesh.faces.push(face);
    }

    fn finish(self) -> IndexedMesh {
        self.mesh
    }
}
