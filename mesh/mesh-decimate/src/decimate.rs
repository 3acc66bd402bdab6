//! Core mesh decimation algorithm.
//!
//! Edge collapse with quadric error metrics over a vertex-to-face
//! adjacency. Every heap entry records the versions of both endpoints when
//! it was pushed; an entry whose versions no longer match is stale and is
//! dropped when popped.

// Mesh indices are u32, meshes with >4B vertices are unsupported
#![allow(clippy::cast_possible_truncation)]

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Vertex};
use tracing::{debug, info};

use crate::error::{DecimateError, DecimateResult};
use crate::params::{DecimateParams, MIN_FACES};
use crate::quadric::Quadric;
use crate::result::DecimationResult;

/// Which constraints a collapse must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Boundary preservation and `max_error` apply.
    Strict,
    /// Only topology and normal-flip checks apply.
    Relaxed,
}

/// An edge collapse candidate in the priority queue.
#[derive(Debug, Clone)]
struct Candidate {
    cost: f64,
    keep: u32,
    remove: u32,
    keep_version: u32,
    remove_version: u32,
    target: Point3<f64>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior; ties broken by index for determinism.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.keep.cmp(&self.keep))
            .then_with(|| other.remove.cmp(&self.remove))
    }
}

/// Decimate a mesh using edge collapse with quadric error metrics.
///
/// The face count never increases and never drops below four. Faces that
/// repeat a vertex index are discarded up front. Output vertices carry no
/// normals; recompute them after decimation.
///
/// # Errors
///
/// Returns [`DecimateError`] if a face index is out of range or a vertex
/// coordinate is not finite.
///
/// # Example
///
/// ```
/// use mesh_types::torus;
/// use mesh_decimate::{decimate_mesh, DecimateParams};
///
/// let mesh = torus(2.0, 0.5, 40, 20);
/// let result = decimate_mesh(&mesh, &DecimateParams::with_target_faces(400)).unwrap();
/// assert!(result.final_faces <= 400);
/// assert!(result.mesh.is_watertight());
/// ```
pub fn decimate_mesh(mesh: &IndexedMesh, params: &DecimateParams) -> DecimateResult<DecimationResult> {
    validate(mesh)?;

    let original_faces = mesh.faces.len();
    let target = params.target_for(original_faces);

    if original_faces <= target {
        return Ok(DecimationResult {
            mesh: mesh.clone(),
            original_faces,
            target_faces: target,
            final_faces: original_faces,
            strict_collapses: 0,
            relaxed_collapses: 0,
            collapses_rejected: 0,
        });
    }

    info!(
        original = original_faces,
        target = target,
        "Starting mesh decimation"
    );

    let mut collapser = Collapser::new(mesh, params);

    let (strict_collapses, mut collapses_rejected) = collapser.run(Pass::Strict, target, params);
    debug!(
        faces = collapser.alive_faces,
        collapses = strict_collapses,
        "Strict pass finished"
    );

    let mut relaxed_collapses = 0;
    if params.guarantee_target {
        while collapser.alive_faces > target {
            let (done, rejected) = collapser.run(Pass::Relaxed, target, params);
            collapses_rejected += rejected;
            relaxed_collapses += done;
            if done == 0 {
                break;
            }
        }
        if relaxed_collapses > 0 {
            debug!(
                faces = collapser.alive_faces,
                collapses = relaxed_collapses,
                "Relaxed pass finished"
            );
        }
    }

    let final_faces = collapser.alive_faces;
    let mesh = collapser.into_mesh();

    info!(
        final_faces = final_faces,
        collapses = strict_collapses + relaxed_collapses,
        "Decimation complete"
    );

    Ok(DecimationResult {
        mesh,
        original_faces,
        target_faces: target,
        final_faces,
        strict_collapses,
        relaxed_collapses,
        collapses_rejected,
    })
}

fn validate(mesh: &IndexedMesh) -> DecimateResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face, indices) in mesh.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(DecimateError::InvalidIndex {
                face,
                index,
                vertex_count,
            });
        }
    }
    if let Some(i) = mesh.vertices.iter().position(|v| !v.is_finite()) {
        return Err(DecimateError::NonFinite(i));
    }
    Ok(())
}

// ============================================================================
// Collapse state
// ============================================================================

struct Collapser {
    positions: Vec<Point3<f64>>,
    quadrics: Vec<Quadric>,
    faces: Vec<[u32; 3]>,
    face_alive: Vec<bool>,
    vert_faces: Vec<Vec<usize>>,
    vert_alive: Vec<bool>,
    /// On an open or non-manifold edge.
    border: Vec<bool>,
    version: Vec<u32>,
    alive_faces: usize,
    heap: BinaryHeap<Candidate>,
}

impl Collapser {
    fn new(mesh: &IndexedMesh, params: &DecimateParams) -> Self {
        let positions: Vec<Point3<f64>> = mesh.positions().copied().collect();
        let n = positions.len();

        let faces: Vec<[u32; 3]> = mesh.faces.clone();
        let face_alive: Vec<bool> = faces
            .iter()
            .map(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2])
            .collect();

        let mut quadrics = vec![Quadric::default(); n];
        let mut vert_faces: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut edge_faces: HashMap<(u32, u32), (usize, usize)> = HashMap::new();

        for (fi, face) in faces.iter().enumerate() {
            if !face_alive[fi] {
                continue;
            }
            let [p0, p1, p2] = face.map(|i| positions[i as usize]);
            if let Some(q) = Quadric::from_triangle(&p0, &p1, &p2) {
                for &v in face {
                    quadrics[v as usize] += q;
                }
            }
            for &v in face {
                vert_faces[v as usize].push(fi);
            }
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let entry = edge_faces.entry((a.min(b), a.max(b))).or_insert((0, fi));
                entry.0 += 1;
            }
        }

        let mut border = vec![false; n];
        for (&(a, b), &(count, fi)) in &edge_faces {
            if count == 2 {
                continue;
            }
            border[a as usize] = true;
            border[b as usize] = true;
            if count == 1 {
                // Perpendicular plane through the open edge keeps it in place.
                let [p0, p1, p2] = faces[fi].map(|i| positions[i as usize]);
                let edge = positions[b as usize] - positions[a as usize];
                let normal = (p1 - p0).cross(&(p2 - p0));
                if let Some(plane) = edge.cross(&normal).try_normalize(f64::EPSILON) {
                    let weight = params.boundary_weight * edge.norm_squared();
                    let q = Quadric::from_plane(&plane, &positions[a as usize], weight);
                    quadrics[a as usize] += q;
                    quadrics[b as usize] += q;
                }
            }
        }

        let alive_faces = face_alive.iter().filter(|&&a| a).count();
        if alive_faces < faces.len() {
            debug!(
                dropped = faces.len() - alive_faces,
                "Ignoring faces with repeated vertex indices"
            );
        }

        Self {
            positions,
            quadrics,
            faces,
            face_alive,
            vert_faces,
            vert_alive: vec![true; n],
            border,
            version: vec![0; n],
            alive_faces,
            heap: BinaryHeap::new(),
        }
    }

    /// Collapse edges until the target is met or the queue runs dry.
    ///
    /// Returns `(collapses, rejections)`.
    fn run(&mut self, pass: Pass, target: usize, params: &DecimateParams) -> (usize, usize) {
        self.heap.clear();
        for fi in 0..self.faces.len() {
            if !self.face_alive[fi] {
                continue;
            }
            let face = self.faces[fi];
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                // Each interior edge appears twice, once per direction.
                if a < b || !self.has_face_with_edge(b, a) {
                    self.push_candidate(a, b, pass, params);
                }
            }
        }

        let mut collapses = 0;
        let mut rejected = 0;
        while self.alive_faces > target {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            let (k, r) = (candidate.keep as usize, candidate.remove as usize);
            if !self.vert_alive[k]
                || !self.vert_alive[r]
                || self.version[k] != candidate.keep_version
                || self.version[r] != candidate.remove_version
            {
                continue;
            }
            if !self.is_collapse_valid(&candidate, pass, params) {
                rejected += 1;
                continue;
            }
            self.collapse(&candidate, pass, params);
            collapses += 1;
        }

        (collapses, rejected)
    }

    fn has_face_with_edge(&self, a: u32, b: u32) -> bool {
        self.vert_faces[a as usize].iter().any(|&fi| {
            let f = self.faces[fi];
            self.face_alive[fi] && (0..3).any(|k| f[k] == a && f[(k + 1) % 3] == b)
        })
    }

    /// Sorted, deduplicated neighbors of `v` through alive faces.
    fn neighbors(&self, v: u32) -> Vec<u32> {
        let mut out: Vec<u32> = self.vert_faces[v as usize]
            .iter()
            .filter(|&&fi| self.face_alive[fi])
            .flat_map(|&fi| self.faces[fi])
            .filter(|&u| u != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    fn push_candidate(&mut self, a: u32, b: u32, pass: Pass, params: &DecimateParams) {
        let (ai, bi) = (a as usize, b as usize);
        let (keep, remove, fixed) = match (pass, params.preserve_boundary) {
            (Pass::Strict, true) => match (self.border[ai], self.border[bi]) {
                (true, true) => return,
                (true, false) => (a, b, true),
                (false, true) => (b, a, true),
                (false, false) => (a, b, false),
            },
            _ => (a, b, false),
        };

        let q = self.quadrics[ai] + self.quadrics[bi];
        let pk = self.positions[keep as usize];
        let pr = self.positions[remove as usize];

        let target = if fixed {
            pk
        } else {
            let mid = nalgebra::center(&pk, &pr);
            let reach = 2.0 * (pk - pr).norm();
            match q.optimal_point() {
                Some(p) if (p - mid).norm() <= reach => p,
                _ => [pk, pr, mid]
                    .into_iter()
                    .min_by(|x, y| q.evaluate(x).total_cmp(&q.evaluate(y)))
                    .unwrap_or(mid),
            }
        };

        self.heap.push(Candidate {
            cost: q.evaluate(&target),
            keep,
            remove,
            keep_version: self.version[keep as usize],
            remove_version: self.version[remove as usize],
            target,
        });
    }

    fn is_collapse_valid(&self, c: &Candidate, pass: Pass, params: &DecimateParams) -> bool {
        let (keep, remove) = (c.keep, c.remove);

        let shared: Vec<usize> = self.vert_faces[keep as usize]
            .iter()
            .copied()
            .filter(|&fi| self.face_alive[fi] && self.faces[fi].contains(&remove))
            .collect();
        if shared.is_empty() || self.alive_faces - shared.len() < MIN_FACES {
            return false;
        }

        if pass == Pass::Strict && params.max_error.is_some_and(|max| c.cost > max) {
            return false;
        }

        // An interior edge between two border vertices would pinch the surface.
        if shared.len() == 2 && self.border[keep as usize] && self.border[remove as usize] {
            return false;
        }

        // Link condition: the only common neighbors are the opposite corners
        // of the shared faces.
        let nk = self.neighbors(keep);
        let common = self
            .neighbors(remove)
            .iter()
            .filter(|&&u| u != keep && nk.binary_search(&u).is_ok())
            .count();
        if common != shared.len() {
            return false;
        }

        !self.would_flip(c)
    }

    /// Whether moving both endpoints to the target flips or flattens a
    /// surviving face.
    fn would_flip(&self, c: &Candidate) -> bool {
        let moved = |i: u32| {
            if i == c.keep || i == c.remove {
                c.target
            } else {
                self.positions[i as usize]
            }
        };

        [c.keep, c.remove]
            .iter()
            .flat_map(|&v| self.vert_faces[v as usize].iter())
            .filter(|&&fi| self.face_alive[fi])
            .map(|&fi| self.faces[fi])
            .filter(|f| !(f.contains(&c.keep) && f.contains(&c.remove)))
            .any(|f| {
                let [p0, p1, p2] = f.map(|i| self.positions[i as usize]);
                let before = (p1 - p0).cross(&(p2 - p0));
                let [q0, q1, q2] = f.map(moved);
                let after = (q1 - q0).cross(&(q2 - q0));
                let scale = before.norm_squared();
                scale > 0.0 && (before.dot(&after) <= 0.0 || after.norm_squared() < 1e-12 * scale)
            })
    }

    fn collapse(&mut self, c: &Candidate, pass: Pass, params: &DecimateParams) {
        let (k, r) = (c.keep as usize, c.remove as usize);

        self.positions[k] = c.target;
        let qr = self.quadrics[r];
        self.quadrics[k] += qr;
        self.border[k] |= self.border[r];

        for fi in std::mem::take(&mut self.vert_faces[r]) {
            if !self.face_alive[fi] {
                continue;
            }
            let face = &mut self.faces[fi];
            if face.contains(&c.keep) {
                self.face_alive[fi] = false;
                self.alive_faces -= 1;
            } else {
                for idx in face.iter_mut() {
                    if *idx == c.remove {
                        *idx = c.keep;
                    }
                }
                self.vert_faces[k].push(fi);
            }
        }

        let face_alive = &self.face_alive;
        self.vert_faces[k].retain(|&fi| face_alive[fi]);
        self.vert_alive[r] = false;
        self.version[k] += 1;
        self.version[r] += 1;

        for n in self.neighbors(c.keep) {
            self.push_candidate(c.keep, n, pass, params);
        }
    }

    fn into_mesh(self) -> IndexedMesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.positions.len()];
        let mut mesh = IndexedMesh::with_capacity(self.positions.len(), self.alive_faces);

        for (fi, face) in self.faces.iter().enumerate() {
            if !self.face_alive[fi] {
                continue;
            }
            let mut out = [0u32; 3];
            for (slot, &v) in out.iter_mut().zip(face) {
                *slot = *remap[v as usize].get_or_insert_with(|| {
                    mesh.vertices.push(Vertex::new(self.positions[v as usize]));
                    (mesh.vertices.len() - 1) as u32
                });
            }
            mesh.faces.push(out);
        }

        debug!(
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "Built final decimated mesh"
        );
        mesh
    }
}
