//! Element-level cleanup: duplicates, degenerates, orphans and welding.
//!
//! Every operation works in place, returns the number of removed elements
//! and is idempotent: running it on its own output removes nothing.

// Mesh indices are u32, meshes with >4B vertices are unsupported
#![allow(clippy::cast_possible_truncation)]

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Point3};
use tracing::debug;

/// Remove faces that repeat an earlier face.
///
/// Faces are compared after rotating their smallest index to the front, so
/// `[1, 2, 0]` duplicates `[0, 1, 2]`. Opposite windings (`[0, 2, 1]`) are
/// distinct faces and are both kept. The first occurrence survives.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::remove_duplicate_faces;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([2, 0, 1]); // Same face, rotated
/// mesh.faces.push([0, 2, 1]); // Back face, kept
///
/// assert_eq!(remove_duplicate_faces(&mut mesh), 1);
/// assert_eq!(mesh.faces.len(), 2);
/// ```
pub fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.faces.len();
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(original_count);
    mesh.faces.retain(|&face| seen.insert(canonical_rotation(face)));

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        debug!(removed, "Removed duplicate faces");
    }
    removed
}

/// Rotate a face so its smallest index comes first, keeping the winding.
#[must_use]
pub fn canonical_rotation(face: [u32; 3]) -> [u32; 3] {
    let min_idx = if face[0] <= face[1] && face[0] <= face[2] {
        0
    } else if face[1] <= face[2] {
        1
    } else {
        2
    };
    [
        face[min_idx],
        face[(min_idx + 1) % 3],
        face[(min_idx + 2) % 3],
    ]
}

/// Remove faces with fewer than three distinct indices, an out-of-range
/// index, or an area at or below `area_threshold`.
///
/// With a threshold of `0.0` only exactly zero-area (and non-finite) faces
/// go.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::remove_degenerate_faces;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 0.0)); // Collinear
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 0, 1]);
///
/// assert_eq!(remove_degenerate_faces(&mut mesh, 0.0), 2);
/// ```
pub fn remove_degenerate_faces(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();
    let vertices = &mesh.vertices;

    mesh.faces.retain(|&[a, b, c]| {
        if a == b || b == c || a == c {
            return false;
        }
        let (Some(v0), Some(v1), Some(v2)) = (
            vertices.get(a as usize),
            vertices.get(b as usize),
            vertices.get(c as usize),
        ) else {
            return false;
        };
        let area = (v1.position - v0.position)
            .cross(&(v2.position - v0.position))
            .norm()
            * 0.5;
        // NaN areas fail the comparison and are dropped.
        area > area_threshold
    });

    let removed = original_count - mesh.faces.len();
    if removed > 0 {
        debug!(removed, area_threshold, "Removed degenerate faces");
    }
    removed
}

/// Remove vertices no face references and compact the vertex array.
///
/// Surviving vertices keep their relative order.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::remove_unreferenced_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(100.0, 100.0, 100.0)); // Unreferenced
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([1, 2, 3]);
///
/// assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
/// assert_eq!(mesh.faces, vec![[0, 1, 2]]);
/// ```
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &v in face {
            if let Some(slot) = referenced.get_mut(v as usize) {
                *slot = true;
            }
        }
    }
    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut next = 0u32;
    for (old, _) in referenced.iter().enumerate().filter(|(_, &r)| r) {
        remap[old] = next;
        next += 1;
    }

    let mut index = 0;
    mesh.vertices.retain(|_| {
        let keep = referenced[index];
        index += 1;
        keep
    });
    for face in &mut mesh.faces {
        for v in face.iter_mut() {
            if let Some(&new) = remap.get(*v as usize) {
                *v = new;
            }
        }
    }

    let removed = original_count - mesh.vertices.len();
    debug!(removed, "Removed unreferenced vertices");
    removed
}

/// Weld vertices closer than `tolerance` and drop the merged copies.
///
/// Each vertex is merged into the first earlier vertex within `tolerance`
/// (spatial hash lookup). A tolerance of `0.0` merges only bit-identical
/// positions. Faces are remapped but not filtered; faces that collapse to
/// fewer than three distinct indices are left for
/// [`remove_degenerate_faces`]. Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::merge_vertices;
///
/// // Two triangles of an STL soup sharing an edge
/// let mut mesh = IndexedMesh::new();
/// for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
///           [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
///     mesh.vertices.push(Vertex::from_coords(p[0], p[1], p[2]));
/// }
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([3, 4, 5]);
///
/// assert_eq!(merge_vertices(&mut mesh, 1e-9), 2);
/// assert_eq!(mesh.vertices.len(), 4);
/// assert_eq!(mesh.faces[1], [1, 3, 2]);
/// ```
pub fn merge_vertices(mesh: &mut IndexedMesh, tolerance: f64) -> usize {
    let original_count = mesh.vertices.len();
    if original_count == 0 {
        return 0;
    }

    let representative = if tolerance > 0.0 && tolerance.is_finite() {
        representatives_within(mesh, tolerance)
    } else {
        representatives_exact(mesh)
    };

    let merged = representative
        .iter()
        .enumerate()
        .filter(|&(i, &r)| r as usize != i)
        .count();
    if merged == 0 {
        return 0;
    }

    // Compact: representatives keep their order, copies vanish.
    let mut new_index = vec![0u32; original_count];
    let mut vertices = Vec::with_capacity(original_count - merged);
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        if representative[i] as usize == i {
            new_index[i] = vertices.len() as u32;
            vertices.push(vertex.clone());
        }
    }
    let remap = |v: u32| {
        representative
            .get(v as usize)
            .map_or(v, |&r| new_index[r as usize])
    };
    for face in &mut mesh.faces {
        *face = face.map(remap);
    }
    mesh.vertices = vertices;

    debug!(merged, tolerance, "Merged coincident vertices");
    merged
}

/// Representative of each vertex: itself, or an earlier vertex within
/// `tolerance` that is its own representative.
fn representatives_within(mesh: &IndexedMesh, tolerance: f64) -> Vec<u32> {
    let cell_size = tolerance * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut representative: Vec<u32> = Vec::with_capacity(mesh.vertices.len());

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        let cell = cell_of(&vertex.position, cell_size);

        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(candidates) = grid.get(&key) else {
                        continue;
                    };
                    for &other in candidates {
                        let p = &mesh.vertices[other as usize].position;
                        if (vertex.position - p).norm() < tolerance {
                            found = Some(other);
                            break 'search;
                        }
                    }
                }
            }
        }

        match found {
            Some(rep) => representative.push(rep),
            None => {
                representative.push(idx);
                // Only representatives are indexed, so chains cannot form.
                grid.entry(cell).or_default().push(idx);
            }
        }
    }

    representative
}

fn representatives_exact(mesh: &IndexedMesh) -> Vec<u32> {
    let mut first: HashMap<[u64; 3], u32> = HashMap::with_capacity(mesh.vertices.len());
    mesh.vertices
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            let p = v.position;
            // -0.0 and 0.0 are the same point.
            let key = [p.x + 0.0, p.y + 0.0, p.z + 0.0].map(f64::to_bits);
            *first.entry(key).or_insert(idx as u32)
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: saturating float-to-int cast; far-away points share edge cells
fn cell_of(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}
