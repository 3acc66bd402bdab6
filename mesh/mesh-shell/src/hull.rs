//! 3D convex hull by QuickHull.
//!
//! 1. Build a tetrahedron from extreme points.
//! 2. Assign every other point to one face it lies outside of.
//! 3. Take a face with outside points, pick the farthest one, remove all
//!    faces that see it and cone the horizon to it.
//! 4. Repeat until no face has outside points.

// Hull vertex indices are u32 like every mesh index.
#![allow(clippy::cast_possible_truncation)]

use hashbrown::{HashMap, HashSet};
use mesh_types::{Aabb, IndexedMesh, Point3, Vector3, Vertex};

use crate::error::{ShellError, ShellResult};

/// Distance tolerance relative to the point set's extent.
const RELATIVE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
    outside: Vec<usize>,
}

impl HullFace {
    /// Face through three points, wound so its normal points away from
    /// `interior`.
    fn new(a: usize, b: usize, c: usize, points: &[Point3<f64>], interior: &Point3<f64>) -> Self {
        let raw = (points[b] - points[a]).cross(&(points[c] - points[a]));
        let (vertices, raw) = if raw.dot(&(points[a] - *interior)) < 0.0 {
            ([a, c, b], -raw)
        } else {
            ([a, b, c], raw)
        };
        let normal = raw.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        Self {
            vertices,
            normal,
            offset: normal.dot(&points[a].coords),
            outside: Vec::new(),
        }
    }

    fn distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Convex hull of a point set as a closed, outward-wound mesh.
///
/// Exact duplicates are ignored; points within a small tolerance of the
/// hull are not added as vertices.
///
/// # Errors
///
/// [`ShellError::Degenerate`] for fewer than four distinct points,
/// non-finite coordinates, or a collinear or coplanar set.
///
/// # Example
///
/// ```
/// use mesh_shell::convex_hull;
/// use mesh_types::Point3;
///
/// let points = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
///     Point3::new(0.1, 0.1, 0.1),
/// ];
/// let hull = convex_hull(&points).unwrap();
/// assert_eq!(hull.faces.len(), 4);
/// assert!(hull.is_watertight());
/// ```
pub fn convex_hull(points: &[Point3<f64>]) -> ShellResult<IndexedMesh> {
    if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(ShellError::degenerate("non-finite point"));
    }

    let mut seen = HashSet::with_capacity(points.len());
    let unique: Vec<Point3<f64>> = points
        .iter()
        .filter(|p| seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]))
        .copied()
        .collect();
    if unique.len() < 4 {
        return Err(ShellError::degenerate(format!(
            "convex hull needs 4 distinct points, got {}",
            unique.len()
        )));
    }

    let extent = Aabb::from_points(unique.iter()).max_extent();
    let epsilon = extent * RELATIVE_EPSILON;

    let simplex = initial_simplex(&unique, epsilon)?;
    let interior = Point3::from(
        simplex
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + unique[i].coords)
            / 4.0,
    );

    let [p0, p1, p2, p3] = simplex;
    let mut faces = vec![
        HullFace::new(p0, p1, p2, &unique, &interior),
        HullFace::new(p0, p2, p3, &unique, &interior),
        HullFace::new(p0, p3, p1, &unique, &interior),
        HullFace::new(p1, p3, p2, &unique, &interior),
    ];
    let remaining = (0..unique.len()).filter(|i| !simplex.contains(i));
    assign_outside(&mut faces, remaining, &unique, epsilon);

    while let Some(seed) = faces.iter().position(|f| !f.outside.is_empty()) {
        let Some(apex) = farthest(&faces[seed], &unique) else {
            break;
        };

        let (visible, kept): (Vec<HullFace>, Vec<HullFace>) = faces
            .into_iter()
            .partition(|f| f.distance(&unique[apex]) > epsilon);
        faces = kept;

        let horizon = horizon_edges(&visible);
        let orphans = visible
            .into_iter()
            .flat_map(|f| f.outside)
            .filter(|&i| i != apex)
            .collect::<Vec<_>>();

        for (a, b) in horizon {
            faces.push(HullFace::new(a, b, apex, &unique, &interior));
        }
        assign_outside(&mut faces, orphans, &unique, epsilon);
    }

    Ok(faces_to_mesh(&faces, &unique))
}

/// Four affinely independent points chosen from the extremes.
fn initial_simplex(points: &[Point3<f64>], epsilon: f64) -> ShellResult<[usize; 4]> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[2 * axis]][axis] {
                extremes[2 * axis] = i;
            }
            if p[axis] > points[extremes[2 * axis + 1]][axis] {
                extremes[2 * axis + 1] = i;
            }
        }
    }

    let mut best = (extremes[0], extremes[1], 0.0);
    for (k, &a) in extremes.iter().enumerate() {
        for &b in &extremes[k + 1..] {
            let d = (points[a] - points[b]).norm_squared();
            if d > best.2 {
                best = (a, b, d);
            }
        }
    }
    let (p0, p1, _) = best;
    if best.2.sqrt() <= epsilon {
        return Err(ShellError::degenerate("all points coincide"));
    }

    let dir = (points[p1] - points[p0]).normalize();
    let p2 = farthest_by(points, |p| {
        let v = *p - points[p0];
        (v - dir * v.dot(&dir)).norm()
    })
    .filter(|&(_, d)| d > epsilon)
    .map(|(i, _)| i)
    .ok_or_else(|| ShellError::degenerate("all points are collinear"))?;

    let normal = (points[p1] - points[p0])
        .cross(&(points[p2] - points[p0]))
        .normalize();
    let p3 = farthest_by(points, |p| normal.dot(&(*p - points[p0])).abs())
        .filter(|&(_, d)| d > epsilon)
        .map(|(i, _)| i)
        .ok_or_else(|| ShellError::degenerate("all points are coplanar"))?;

    Ok([p0, p1, p2, p3])
}

fn farthest_by(
    points: &[Point3<f64>],
    metric: impl Fn(&Point3<f64>) -> f64,
) -> Option<(usize, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, metric(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

fn farthest(face: &HullFace, points: &[Point3<f64>]) -> Option<usize> {
    face.outside
        .iter()
        .copied()
        .max_by(|&a, &b| face.distance(&points[a]).total_cmp(&face.distance(&points[b])))
}

/// Give each point to the first face it is strictly outside of. Points
/// outside none are inside the hull and dropped.
fn assign_outside(
    faces: &mut [HullFace],
    candidates: impl IntoIterator<Item = usize>,
    points: &[Point3<f64>],
    epsilon: f64,
) {
    for i in candidates {
        if let Some(face) = faces.iter_mut().find(|f| f.distance(&points[i]) > epsilon) {
            face.outside.push(i);
        }
    }
}

/// Edges of the visible region used by exactly one visible face, in that
/// face's direction.
fn horizon_edges(visible: &[HullFace]) -> Vec<(usize, usize)> {
    let mut count: HashMap<(usize, usize), usize> = HashMap::new();
    for face in visible {
        for (a, b) in face.edges() {
            *count.entry((a.min(b), a.max(b))).or_default() += 1;
        }
    }
    visible
        .iter()
        .flat_map(HullFace::edges)
        .filter(|&(a, b)| count.get(&(a.min(b), a.max(b))) == Some(&1))
        .collect()
}

fn faces_to_mesh(faces: &[HullFace], points: &[Point3<f64>]) -> IndexedMesh {
    let mut remap: HashMap<usize, u32> = HashMap::new();
    let mut mesh = IndexedMesh::with_capacity(faces.len() / 2 + 2, faces.len());
    for face in faces {
        let mut out = [0u32; 3];
        for (slot, &v) in out.iter_mut().zip(&face.vertices) {
            *slot = *remap.entry(v).or_insert_with(|| {
                mesh.vertices.push(Vertex::new(points[v]));
                (mesh.vertices.len() - 1) as u32
            });
        }
        mesh.faces.push(out);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{torus, unit_cube};

    fn cube_corners() -> Vec<Point3<f64>> {
        unit_cube().vertices.iter().map(|v| v.position).collect()
    }

    #[test]
    fn tetrahedron() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let hull = convex_hull(&points).unwrap();
        assert_eq!(hull.vertices.len(), 4);
        assert_eq!(hull.faces.len(), 4);
        assert!(hull.signed_volume() > 0.0);
    }

    #[test]
    fn cube_corners_give_twelve_triangles() {
        let hull = convex_hull(&cube_corners()).unwrap();
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.faces.len(), 12);
        assert!(hull.is_watertight());
        assert_relative_eq!(hull.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn interior_and_duplicate_points_are_ignored() {
        let mut points = cube_corners();
        points.push(Point3::new(0.5, 0.5, 0.5));
        points.push(Point3::new(0.2, 0.7, 0.4));
        points.extend(cube_corners());
        let hull = convex_hull(&points).unwrap();
        assert_eq!(hull.vertices.len(), 8);
        assert_eq!(hull.faces.len(), 12);
    }

    #[test]
    fn torus_hull_is_closed_and_contains_the_torus() {
        let mesh = torus(2.0, 0.5, 24, 8);
        let points: Vec<_> = mesh.vertices.iter().map(|v| v.position).collect();
        let hull = convex_hull(&points).unwrap();
        assert!(hull.is_watertight());
        assert!(hull.signed_volume() > mesh.signed_volume());

        // Every input point is inside or on every hull face plane.
        for [a, b, c] in &hull.faces {
            let (a, b, c) = (
                hull.vertices[*a as usize].position,
                hull.vertices[*b as usize].position,
                hull.vertices[*c as usize].position,
            );
            let n = (b - a).cross(&(c - a)).normalize();
            for p in &points {
                assert!(n.dot(&(p - a)) < 1e-9);
            }
        }
    }

    #[test]
    fn degenerate_sets_fail() {
        let few = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert!(convex_hull(&few).is_err());

        let collinear: Vec<_> = (0..10).map(|i| Point3::new(f64::from(i), 0.0, 0.0)).collect();
        assert!(matches!(convex_hull(&collinear), Err(ShellError::Degenerate(m)) if m.contains("collinear")));

        let coplanar: Vec<_> = (0..16)
            .map(|i| Point3::new(f64::from(i % 4), f64::from(i / 4), 2.0))
            .collect();
        assert!(matches!(convex_hull(&coplanar), Err(ShellError::Degenerate(m)) if m.contains("coplanar")));

        let repeated = vec![Point3::new(1.0, 2.0, 3.0); 10];
        assert!(convex_hull(&repeated).is_err());

        let nan = [Point3::new(f64::NAN, 0.0, 0.0); 4];
        assert!(convex_hull(&nan).is_err());
    }
}
