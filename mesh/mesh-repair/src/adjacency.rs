//! Edge and vertex adjacency of a triangle list.
//!
//! Edges are tracked both undirected (for manifoldness) and as directed
//! half-edges (for boundary orientation and winding checks).

use hashbrown::HashMap;

/// Adjacency information for a face list.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Undirected edge `(lo, hi)` to the faces using it.
    edge_to_faces: HashMap<(u32, u32), Vec<usize>>,
    /// Vertex to the faces using it.
    vertex_to_faces: HashMap<u32, Vec<usize>>,
    /// Directed half-edge `(from, to)` to the number of faces traversing it.
    half_edges: HashMap<(u32, u32), usize>,
}

impl MeshAdjacency {
    /// Build adjacency information from a list of faces.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    ///
    /// let faces = vec![[0, 1, 2], [1, 3, 2]];
    /// let adj = MeshAdjacency::build(&faces);
    ///
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// assert_eq!(adj.faces_for_edge(2, 1).map(<[usize]>::len), Some(2));
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        let mut vertex_to_faces: HashMap<u32, Vec<usize>> = HashMap::new();
        let mut half_edges: HashMap<(u32, u32), usize> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                let list = vertex_to_faces.entry(v).or_default();
                if list.last() != Some(&face_idx) {
                    list.push(face_idx);
                }
            }
            for (a, b) in face_edges(face) {
                if a == b {
                    continue;
                }
                edge_to_faces.entry(undirected(a, b)).or_default().push(face_idx);
                *half_edges.entry((a, b)).or_default() += 1;
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
            half_edges,
        }
    }

    /// Faces using the edge between `v0` and `v1`, in either direction.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&undirected(v0, v1))
            .map(Vec::as_slice)
    }

    /// Faces using a vertex. Empty for unknown vertices.
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], Vec::as_slice)
    }

    /// Number of faces traversing the directed half-edge `from -> to`.
    #[must_use]
    pub fn half_edge_count(&self, from: u32, to: u32) -> usize {
        self.half_edges.get(&(from, to)).copied().unwrap_or(0)
    }

    /// Boundary half-edges, oriented as their single face traverses them,
    /// sorted for deterministic traversal.
    #[must_use]
    pub fn boundary_half_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&(lo, hi), _)| {
                if self.half_edge_count(lo, hi) > 0 {
                    (lo, hi)
                } else {
                    (hi, lo)
                }
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Count of edges with exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() == 1)
            .count()
    }

    /// Count of edges with more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces
            .values()
            .filter(|faces| faces.len() > 2)
            .count()
    }

    /// All edges have at most two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() <= 2)
    }

    /// No boundary edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() >= 2)
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Number of vertices referenced by at least one face.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// The three directed edges of a face.
pub(crate) fn face_edges(face: &[u32; 3]) -> [(u32, u32); 3] {
    [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])]
}

#[inline]
fn undirected(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}
