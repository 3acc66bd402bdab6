//! Alpha shape reconstruction.
//!
//! Surface samples are tetrahedralized with Bowyer-Watson insertion. All
//! orientation and in-sphere decisions use exact predicates from `robust`,
//! so the triangulation stays valid however close the samples are.
//! Tetrahedra whose circumradius exceeds alpha are dropped, and the faces
//! bounding what remains form the shell.

// Mesh indices are u32.
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use mesh_types::{Aabb, IndexedMesh, MeshBounds, MeshTopology, Point3, Vector3, Vertex};
use robust::{insphere, orient3d, Coord3D};
use tracing::debug;

use crate::error::{ShellError, ShellResult};
use crate::params::ShellParams;
use crate::sampling::PointSample;

/// Super-tetrahedron size in multiples of the input diagonal.
const SUPER_SCALE: f64 = 1e3;

/// Sample jitter as a fraction of the longest bounding-box edge.
const JITTER: f64 = 1e-6;

fn coord(p: &Point3<f64>) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

fn orient(points: &[Point3<f64>], a: usize, b: usize, c: usize, d: usize) -> f64 {
    orient3d(
        coord(&points[a]),
        coord(&points[b]),
        coord(&points[c]),
        coord(&points[d]),
    )
}

/// Faces of a positively oriented tetrahedron, each wound outward.
fn tet_faces([a, b, c, d]: [usize; 4]) -> [[usize; 3]; 4] {
    [[a, b, c], [a, d, b], [a, c, d], [b, d, c]]
}

fn sorted(mut face: [usize; 3]) -> [usize; 3] {
    face.sort_unstable();
    face
}

/// Delaunay tetrahedralization.
///
/// Returns tetrahedra as indices into `points`, each positively oriented
/// (`orient3d > 0`). A point that would leave the cavity non-star-shaped,
/// such as an exact duplicate, is skipped.
///
/// # Errors
///
/// [`ShellError::Degenerate`] for fewer than four points or non-finite
/// or coincident input.
pub fn tetrahedralize(points: &[Point3<f64>]) -> ShellResult<Vec<[usize; 4]>> {
    let n = points.len();
    if n < 4 {
        return Err(ShellError::degenerate(format!(
            "tetrahedralization needs 4 points, got {n}"
        )));
    }
    let bounds = Aabb::from_points(points.iter());
    let diagonal = bounds.diagonal();
    if !(bounds.is_finite() && diagonal > 0.0) {
        return Err(ShellError::degenerate("points are coincident or not finite"));
    }

    let c = bounds.center();
    let s = diagonal * SUPER_SCALE;
    let mut all = points.to_vec();
    all.extend([
        c + Vector3::new(s, s, s),
        c + Vector3::new(s, -s, -s),
        c + Vector3::new(-s, s, -s),
        c + Vector3::new(-s, -s, s),
    ]);
    let mut root = [n, n + 1, n + 2, n + 3];
    if orient(&all, root[0], root[1], root[2], root[3]) < 0.0 {
        root.swap(0, 1);
    }

    let mut tets = vec![root];
    let mut skipped = 0usize;
    for p in 0..n {
        if !insert(&mut tets, &all, p) {
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!(skipped, "Points skipped during tetrahedralization");
    }

    tets.retain(|t| t.iter().all(|&v| v < n));
    Ok(tets)
}

/// Bowyer-Watson step. Returns `false` if the point was skipped.
fn insert(tets: &mut Vec<[usize; 4]>, points: &[Point3<f64>], p: usize) -> bool {
    let e = coord(&points[p]);
    let bad: Vec<usize> = tets
        .iter()
        .enumerate()
        .filter(|(_, tet)| {
            let [a, b, c, d] = **tet;
            insphere(
                coord(&points[a]),
                coord(&points[b]),
                coord(&points[c]),
                coord(&points[d]),
                e,
            ) > 0.0
        })
        .map(|(i, _)| i)
        .collect();
    if bad.is_empty() {
        return false;
    }

    let mut faces: HashMap<[usize; 3], ([usize; 3], u8)> = HashMap::new();
    for &t in &bad {
        for face in tet_faces(tets[t]) {
            faces
                .entry(sorted(face))
                .and_modify(|entry| entry.1 += 1)
                .or_insert((face, 1));
        }
    }
    let mut cavity: Vec<[usize; 3]> = faces
        .into_values()
        .filter(|&(_, count)| count == 1)
        .map(|(face, _)| face)
        .collect();
    cavity.sort_unstable();

    if cavity
        .iter()
        .any(|&[a, b, c]| orient(points, a, b, c, p) <= 0.0)
    {
        return false;
    }

    for &t in bad.iter().rev() {
        tets.swap_remove(t);
    }
    tets.extend(cavity.into_iter().map(|[a, b, c]| [a, b, c, p]));
    true
}

/// Circumradius of a tetrahedron, `None` if it is flat.
fn circumradius(points: &[Point3<f64>], [a, b, c, d]: [usize; 4]) -> Option<f64> {
    let u = points[b] - points[a];
    let v = points[c] - points[a];
    let w = points[d] - points[a];
    let denominator = 2.0 * u.dot(&v.cross(&w));
    if denominator.abs() <= f64::EPSILON * u.norm() * v.norm() * w.norm() {
        return None;
    }
    let offset = (v.cross(&w) * u.norm_squared()
        + w.cross(&u) * v.norm_squared()
        + u.cross(&v) * w.norm_squared())
        / denominator;
    let radius = offset.norm();
    radius.is_finite().then_some(radius)
}

/// Faces used by exactly one tetrahedron, as a mesh over the used points.
fn boundary_of(tets: &[[usize; 4]], points: &[Point3<f64>]) -> IndexedMesh {
    let mut order: Vec<[usize; 3]> = Vec::new();
    let mut count: HashMap<[usize; 3], usize> = HashMap::new();
    for &tet in tets {
        for face in tet_faces(tet) {
            let n = count.entry(sorted(face)).or_insert(0);
            if *n == 0 {
                order.push(face);
            }
            *n += 1;
        }
    }

    let mut remap: HashMap<usize, u32> = HashMap::new();
    let mut mesh = IndexedMesh::new();
    for face in order {
        if count.get(&sorted(face)) != Some(&1) {
            continue;
        }
        let mut out = [0u32; 3];
        for (slot, &v) in out.iter_mut().zip(&face) {
            *slot = *remap.entry(v).or_insert_with(|| {
                mesh.vertices.push(Vertex::new(points[v]));
                (mesh.vertices.len() - 1) as u32
            });
        }
        mesh.faces.push(out);
    }
    mesh
}

/// Outer shell from the alpha complex of area-weighted surface samples.
///
/// # Errors
///
/// - [`ShellError::EmptyMesh`] for an input without faces.
/// - [`ShellError::Degenerate`] if fewer than four samples could be drawn.
/// - [`ShellError::EmptyResult`] if no tetrahedron fits within alpha.
pub fn alpha_shape(mesh: &IndexedMesh, params: &ShellParams) -> ShellResult<IndexedMesh> {
    params.validate()?;
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh);
    }

    let extent = mesh.bounds().max_extent();
    let mut sample = PointSample::from_surface(mesh, params.alpha_sample_count, params.seed);
    if sample.len() < 4 {
        return Err(ShellError::degenerate(format!(
            "only {} surface samples",
            sample.len()
        )));
    }
    sample.jitter(extent * JITTER, params.seed.wrapping_add(1));

    let tets = tetrahedralize(&sample.points)?;
    let alpha = params.alpha_ratio * extent;
    let kept: Vec<[usize; 4]> = tets
        .iter()
        .copied()
        .filter(|&t| circumradius(&sample.points, t).is_some_and(|r| r <= alpha))
        .collect();

    debug!(
        samples = sample.len(),
        tetrahedra = tets.len(),
        kept = kept.len(),
        alpha,
        "Built alpha complex"
    );

    if kept.is_empty() {
        return Err(ShellError::EmptyResult);
    }
    Ok(boundary_of(&kept, &sample.points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn volume(points: &[Point3<f64>], [a, b, c, d]: [usize; 4]) -> f64 {
        (points[a] - points[d])
            .dot(&(points[b] - points[d]).cross(&(points[c] - points[d])))
            / 6.0
    }

    #[test]
    fn interior_point_splits_the_tetrahedron() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.2, 0.2, 0.2),
        ];
        let tets = tetrahedralize(&points).unwrap();
        assert_eq!(tets.len(), 4);
        let total: f64 = tets.iter().map(|&t| volume(&points, t)).sum();
        assert_relative_eq!(total, 1.0 / 6.0, epsilon = 1e-12);
        assert!(tets.iter().all(|&t| orient(&points, t[0], t[1], t[2], t[3]) > 0.0));
    }

    #[test]
    fn random_cloud_is_delaunay() {
        let mut rng = StdRng::seed_from_u64(11);
        let points: Vec<Point3<f64>> = (0..60)
            .map(|_| Point3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect();
        let tets = tetrahedralize(&points).unwrap();
        assert!(!tets.is_empty());

        for &[a, b, c, d] in &tets {
            assert!(orient(&points, a, b, c, d) > 0.0);
            for (i, p) in points.iter().enumerate() {
                if [a, b, c, d].contains(&i) {
                    continue;
                }
                let inside = insphere(
                    coord(&points[a]),
                    coord(&points[b]),
                    coord(&points[c]),
                    coord(&points[d]),
                    coord(p),
                );
                assert!(inside <= 0.0, "point {i} inside circumsphere");
            }
        }
    }

    #[test]
    fn too_few_points() {
        let points = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        assert!(tetrahedralize(&points).is_err());
        assert!(tetrahedralize(&[Point3::origin(); 6]).is_err());
    }

    #[test]
    fn circumradius_of_corner_tetrahedron() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let r = circumradius(&points, [0, 1, 2, 3]).unwrap();
        assert_relative_eq!(r, 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);

        let flat = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(circumradius(&flat, [0, 1, 2, 3]).is_none());
    }

    #[test]
    fn single_tetrahedron_boundary_is_closed() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let mut tet = [0, 1, 2, 3];
        if orient(&points, 0, 1, 2, 3) < 0.0 {
            tet.swap(0, 1);
        }
        let mesh = boundary_of(&[tet], &points);
        assert_eq!(mesh.faces.len(), 4);
        assert!(mesh.is_watertight());
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn cube_gives_a_non_empty_deterministic_shell() {
        let params = ShellParams::default();
        let shell = alpha_shape(&unit_cube(), &params).unwrap();
        assert!(!shell.faces.is_empty());
        assert!(shell.has_valid_indices());
        assert!(shell.signed_volume() > 0.0);
        assert_eq!(shell, alpha_shape(&unit_cube(), &params).unwrap());
    }

    #[test]
    fn tiny_alpha_keeps_nothing() {
        let params = ShellParams::default().with_alpha_ratio(1e-6);
        assert_eq!(
            alpha_shape(&unit_cube(), &params),
            Err(ShellError::EmptyResult)
        );
    }

    #[test]
    fn empty_mesh_fails() {
        assert_eq!(
            alpha_shape(&IndexedMesh::new(), &ShellParams::default()),
            Err(ShellError::EmptyMesh)
        );
    }
}
