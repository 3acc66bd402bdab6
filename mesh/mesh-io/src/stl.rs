//! STL (Stereolithography) reader.
//!
//! Both variants are read from an in-memory buffer.
//!
//! # Format Detection
//!
//! A buffer is binary when its length matches the size implied by the
//! triangle count after the 80-byte header. Otherwise a buffer that starts
//! with `solid` is parsed as ASCII. Binary files whose header happens to
//! start with `solid` are therefore handled correctly.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    - Header (ignored)
//! UINT32       - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector (ignored, recomputed downstream)
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count
//! end
//! ```
//!
//! # Scenes
//!
//! Each `solid ... endsolid` block of an ASCII file becomes one scene
//! object. Facets carry their own three vertices; coincident corners are
//! welded later by the repair stage.

use mesh_types::{IndexedMesh, Scene, Vertex};

use crate::error::{LoadError, LoadResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Parse an STL buffer into a scene.
///
/// # Errors
///
/// Returns [`LoadError::CorruptOrEmpty`] if the buffer is neither valid
/// binary nor valid ASCII STL.
pub fn read_stl(bytes: &[u8]) -> LoadResult<Scene> {
    if is_binary(bytes) {
        return read_binary(bytes).map(|mesh| {
            let mut scene = Scene::new();
            scene.push("stl", mesh);
            scene
        });
    }

    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    if String::from_utf8_lossy(head).trim_start().starts_with("solid") {
        return read_ascii(bytes);
    }

    if bytes.len() < HEADER_SIZE + 4 {
        return Err(LoadError::corrupt("file too small to be valid STL"));
    }
    // Binary with a wrong triangle count: read what the count promises.
    read_binary(bytes).map(|mesh| {
        let mut scene = Scene::new();
        scene.push("stl", mesh);
        scene
    })
}

fn triangle_count(bytes: &[u8]) -> Option<usize> {
    let count = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize)
}

fn is_binary(bytes: &[u8]) -> bool {
    triangle_count(bytes)
        .and_then(|n| n.checked_mul(TRIANGLE_SIZE))
        .is_some_and(|body| HEADER_SIZE + 4 + body == bytes.len())
}

fn read_binary(bytes: &[u8]) -> LoadResult<IndexedMesh> {
    let face_count = triangle_count(bytes)
        .ok_or_else(|| LoadError::corrupt("binary STL header truncated"))?;
    let body = &bytes[HEADER_SIZE + 4..];
    if body.len() / TRIANGLE_SIZE < face_count {
        return Err(LoadError::corrupt(format!(
            "binary STL declares {face_count} triangles but holds {}",
            body.len() / TRIANGLE_SIZE
        )));
    }

    let mut mesh = IndexedMesh::with_capacity(face_count * 3, face_count);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(face_count) {
        // Skip the stored normal (12 bytes).
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
        let base = mesh.vertices.len() as u32;
        mesh.vertices.push(read_vertex(&record[12..24]));
        mesh.vertices.push(read_vertex(&record[24..36]));
        mesh.vertices.push(read_vertex(&record[36..48]));
        mesh.faces.push([base, base + 1, base + 2]);
    }

    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 little-endian f32s).
fn read_vertex(buf: &[u8]) -> Vertex {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    Vertex::from_coords(f(0), f(4), f(8))
}

fn read_ascii(bytes: &[u8]) -> LoadResult<Scene> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::corrupt(format!("ASCII STL is not UTF-8: {e}")))?;

    let mut scene = Scene::new();
    let mut current: Option<(String, IndexedMesh)> = None;
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "solid" => {
                if let Some((name, mesh)) = current.take() {
                    scene.push(name, mesh);
                }
                let name = parts.collect::<Vec<_>>().join(" ");
                current = Some((name, IndexedMesh::new()));
            }
            "outer" => corners.clear(),
            "vertex" => {
                let coords: Vec<f64> = parts
                    .take(3)
                    .map(str::parse)
                    .collect::<Result<_, _>>()
                    .map_err(|e| LoadError::corrupt(format!("line {}: {e}", line_no + 1)))?;
                if coords.len() != 3 {
                    return Err(LoadError::corrupt(format!(
                        "line {}: vertex needs three coordinates",
                        line_no + 1
                    )));
                }
                corners.push(Vertex::from_coords(coords[0], coords[1], coords[2]));
            }
            "endfacet" => {
                let (_, mesh) = current.get_or_insert_with(|| (String::new(), IndexedMesh::new()));
                // Only triangles are meaningful; anything else is dropped.
                if corners.len() == 3 {
                    #[allow(clippy::cast_possible_truncation)]
                    // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
                    let base = mesh.vertices.len() as u32;
                    mesh.vertices.append(&mut corners);
                    mesh.faces.push([base, base + 1, base + 2]);
                }
                corners.clear();
            }
            "endsolid" => {
                if let Some((name, mesh)) = current.take() {
                    scene.push(name, mesh);
                }
            }
            _ => {}
        }
    }

    if let Some((name, mesh)) = current.take() {
        scene.push(name, mesh);
    }

    Ok(scene)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mesh_types::{unit_cube, MeshTopology};

    /// Encode a mesh as binary STL, one record per face.
    pub(crate) fn binary_stl(mesh: &IndexedMesh, header: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[..header.len()].copy_from_slice(header);
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(mesh.faces.len() as u32).to_le_bytes());
        for face in &mesh.faces {
            out.extend_from_slice(&[0u8; 12]);
            for &i in face {
                let p = mesh.vertices[i as usize].position;
                for c in [p.x, p.y, p.z] {
                    #[allow(clippy::cast_possible_truncation)]
                    out.extend_from_slice(&(c as f32).to_le_bytes());
                }
            }
            out.extend_from_slice(&[0u8; 2]);
        }
        out
    }

    #[test]
    fn binary_cube() {
        let bytes = binary_stl(&unit_cube(), b"binary");
        let scene = read_stl(&bytes).unwrap();
        let mesh = scene.into_single_mesh().unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertex_count(), 36);
    }

    #[test]
    fn binary_with_solid_header() {
        let bytes = binary_stl(&unit_cube(), b"solid but actually binary");
        let mesh = read_stl(&bytes).unwrap().into_single_mesh().unwrap();
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn truncated_binary_is_corrupt() {
        let mut bytes = binary_stl(&unit_cube(), b"x");
        bytes.truncate(bytes.len() - 60);
        assert!(matches!(read_stl(&bytes), Err(LoadError::CorruptOrEmpty { .. })));
    }

    #[test]
    fn ascii_multiple_solids() {
        let text = "solid first
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid first
solid second
  facet normal 0 0 1
    outer loop
      vertex 0 0 1
      vertex 1 0 1
      vertex 0 1 1
    endloop
  endfacet
endsolid second
";
        let scene = read_stl(text.as_bytes()).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.objects[1].0, "second");

        let merged = scene.into_single_mesh().unwrap();
        assert_eq!(merged.face_count(), 2);
        assert_eq!(merged.faces[1], [3, 4, 5]);
    }

    #[test]
    fn ascii_bad_number() {
        let text = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n";
        assert!(matches!(
            read_stl(text.as_bytes()),
            Err(LoadError::CorruptOrEmpty { .. })
        ));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(read_stl(b"hello").is_err());
    }
}
