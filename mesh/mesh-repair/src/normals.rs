//! Consistent outward winding.

use std::collections::VecDeque;

use mesh_types::{IndexedMesh, MeshTopology};
use tracing::{debug, info, warn};

use crate::adjacency::{face_edges, MeshAdjacency};
use crate::warning::{RepairOutcome, RepairWarning};

/// Make face winding consistent and outward, then recompute vertex normals.
///
/// Winding is propagated breadth-first across manifold edges: two faces
/// sharing an edge must traverse it in opposite directions. Each connected
/// component keeps the orientation of its first face, and closed
/// components with negative signed volume are then flipped as a whole.
///
/// `changed` counts faces whose winding was reversed. Non-orientable
/// components and non-manifold edges are reported in a
/// [`RepairWarning::OrientationIncomplete`].
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::fix_normals;
///
/// let mut mesh = unit_cube();
/// mesh.flip_normals();
/// mesh.faces[0].swap(1, 2); // One face now disagrees with the rest
///
/// let outcome = fix_normals(&mut mesh);
/// assert_eq!(outcome.changed, 11);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn fix_normals(mesh: &mut IndexedMesh) -> RepairOutcome {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let face_count = mesh.faces.len();

    let mut flip = vec![false; face_count];
    let mut component = vec![usize::MAX; face_count];
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut conflicts = 0;

    for seed in 0..face_count {
        if component[seed] != usize::MAX {
            continue;
        }
        let id = components.len();
        let mut members = vec![seed];
        component[seed] = id;

        let mut queue = VecDeque::from([seed]);
        while let Some(face) = queue.pop_front() {
            for (a, b) in face_edges(&mesh.faces[face]) {
                let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                    continue;
                };
                let other = if f0 == face { f1 } else { f0 };
                if other == face {
                    continue;
                }

                // Same traversal direction means one of the two must flip.
                let same_direction = traverses(&mesh.faces[other], a, b);
                let required = flip[face] ^ same_direction;

                if component[other] == usize::MAX {
                    component[other] = id;
                    flip[other] = required;
                    members.push(other);
                    queue.push_back(other);
                } else if flip[other] != required {
                    conflicts += 1;
                }
            }
        }
        components.push(members);
    }
    // Each conflicting pair is seen from both sides.
    conflicts /= 2;

    for (face, &flipped) in mesh.faces.iter_mut().zip(&flip) {
        if flipped {
            face.swap(1, 2);
        }
    }

    let mut inverted_components = 0;
    for members in &components {
        let closed = members.iter().all(|&f| {
            face_edges(&mesh.faces[f])
                .iter()
                .all(|&(a, b)| a == b || adjacency.faces_for_edge(a, b).map_or(0, <[usize]>::len) == 2)
        });
        if !closed || component_volume(mesh, members) >= 0.0 {
            continue;
        }
        inverted_components += 1;
        for &f in members {
            mesh.faces[f].swap(1, 2);
            flip[f] = !flip[f];
        }
    }

    mesh.compute_vertex_normals();

    let flipped = flip.iter().filter(|&&f| f).count();
    debug!(
        components = components.len(),
        inverted_components,
        flipped,
        "Propagated winding"
    );
    if flipped > 0 {
        info!(flipped, "Fixed face winding");
    }

    let outcome = RepairOutcome::changed(flipped);
    let non_manifold_edges = adjacency.non_manifold_edge_count();
    if conflicts == 0 && non_manifold_edges == 0 {
        return outcome;
    }

    warn!(conflicts, non_manifold_edges, "Winding could not be made fully consistent");
    outcome.with_warning(RepairWarning::OrientationIncomplete {
        conflicts,
        non_manifold_edges,
    })
}

/// Count manifold edges whose two faces traverse them in the same
/// direction. Zero for a consistently oriented mesh.
#[must_use]
pub fn count_inconsistent_edges(mesh: &IndexedMesh) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut count = 0;
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face_edges(face) {
            if let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) {
                let other = if f0 == face_idx { f1 } else { f0 };
                if other != face_idx && traverses(&mesh.faces[other], a, b) {
                    count += 1;
                }
            }
        }
    }
    count / 2
}

fn traverses(face: &[u32; 3], a: u32, b: u32) -> bool {
    face_edges(face).contains(&(a, b))
}

fn component_volume(mesh: &IndexedMesh, members: &[usize]) -> f64 {
    members
        .iter()
        .filter_map(|&f| mesh.triangle(f))
        .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
        .sum::<f64>()
        / 6.0
}
