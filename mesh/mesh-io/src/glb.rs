//! Binary glTF 2.0 (GLB) container: reader and exporter.
//!
//! The exporter writes one scene with one node referencing one mesh with a
//! single triangle primitive. The BIN chunk holds three tightly packed
//! buffer views:
//!
//! ```text
//! [0] POSITION  f32 x 3 per vertex (accessor carries min/max)
//! [1] NORMAL    f32 x 3 per vertex
//! [2] indices   u32 per corner
//! ```
//!
//! No materials, textures or node transforms are written. The reader
//! accepts any GLB and turns each triangle primitive into a scene object,
//! so a written container reads back with the same counts.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gltf::binary::{Glb, Header};
use gltf::mesh::Mode;
use mesh_types::{IndexedMesh, Scene, Vector3, Vertex};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{ExportError, ExportResult, LoadError, LoadResult};

/// glTF `componentType` for `f32`.
const FLOAT: u32 = 5126;
/// glTF `componentType` for `u32`.
const UNSIGNED_INT: u32 = 5125;
/// glTF `target` for vertex attribute buffer views.
const ARRAY_BUFFER: u32 = 34962;
/// glTF `target` for index buffer views.
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
/// Triangle list primitive mode.
const TRIANGLES: u32 = 4;

/// Parse a GLB buffer into a scene, one object per triangle primitive.
///
/// # Errors
///
/// Returns [`LoadError::CorruptOrEmpty`] if the container is invalid or a
/// primitive's buffers cannot be read.
pub fn read_glb(bytes: &[u8]) -> LoadResult<Scene> {
    let (document, buffers, _images) = gltf::import_slice(bytes)
        .map_err(|e| LoadError::corrupt(format!("invalid glTF binary: {e}")))?;

    let mut scene = Scene::new();
    for mesh in document.meshes() {
        let mesh_name = mesh.name().unwrap_or("mesh").to_string();
        for (p, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != Mode::Triangles {
                debug!(mesh = %mesh_name, primitive = p, "skipping non-triangle primitive");
                continue;
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };

            let mut out = IndexedMesh::new();
            out.vertices.extend(
                positions.map(|[x, y, z]| Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z))),
            );
            if let Some(normals) = reader.read_normals() {
                for (vertex, [x, y, z]) in out.vertices.iter_mut().zip(normals) {
                    vertex.normal = Some(Vector3::new(f64::from(x), f64::from(y), f64::from(z)));
                }
            }

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                #[allow(clippy::cast_possible_truncation)]
                // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
                None => (0..out.vertices.len() as u32).collect(),
            };
            out.faces
                .extend(indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));

            scene.push(format!("{mesh_name}.{p}"), out);
        }
    }

    Ok(scene)
}

/// Encode a mesh as an in-memory GLB container.
///
/// Stored vertex normals are written when every vertex has one; otherwise
/// area-weighted normals are computed from the faces.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the mesh has no faces or invalid
/// indices.
pub fn glb_bytes(mesh: &IndexedMesh) -> ExportResult<Vec<u8>> {
    if mesh.faces.is_empty() || mesh.vertices.is_empty() {
        return Err(ExportError::encode("mesh has no faces"));
    }
    if !mesh.has_valid_indices() {
        return Err(ExportError::encode("face index out of range"));
    }

    let normals = export_normals(mesh);
    let vertex_count = mesh.vertices.len();
    let index_count = mesh.faces.len() * 3;

    let mut bin: Vec<u8> = Vec::with_capacity(vertex_count * 24 + index_count * 4);
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for vertex in &mesh.vertices {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: GLB stores single-precision positions
        let p = [
            vertex.position.x as f32,
            vertex.position.y as f32,
            vertex.position.z as f32,
        ];
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
            bin.extend_from_slice(&p[axis].to_le_bytes());
        }
    }
    let positions_len = bin.len();

    for n in &normals {
        for c in n {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let normals_len = bin.len() - positions_len;

    for face in &mesh.faces {
        for i in face {
            bin.extend_from_slice(&i.to_le_bytes());
        }
    }
    let indices_len = bin.len() - positions_len - normals_len;

    let document = json!({
        "asset": { "version": "2.0", "generator": concat!("outer-shell ", env!("CARGO_PKG_VERSION")) },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "name": "outer_shell" }],
        "meshes": [{
            "name": "outer_shell",
            "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1 },
                "indices": 2,
                "mode": TRIANGLES
            }]
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": positions_len, "target": ARRAY_BUFFER },
            { "buffer": 0, "byteOffset": positions_len, "byteLength": normals_len, "target": ARRAY_BUFFER },
            { "buffer": 0, "byteOffset": positions_len + normals_len, "byteLength": indices_len, "target": ELEMENT_ARRAY_BUFFER }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": FLOAT, "count": vertex_count, "type": "VEC3", "min": min, "max": max },
            { "bufferView": 1, "componentType": FLOAT, "count": vertex_count, "type": "VEC3" },
            { "bufferView": 2, "componentType": UNSIGNED_INT, "count": index_count, "type": "SCALAR" }
        ]
    });

    let mut json = serde_json::to_vec(&document).map_err(|e| ExportError::encode(e.to_string()))?;
    // Chunks are 4-byte aligned: JSON padded with spaces, BIN with zeros.
    json.resize(json.len().next_multiple_of(4), b' ');
    bin.resize(bin.len().next_multiple_of(4), 0);

    let length = 12 + 8 + json.len() + 8 + bin.len();
    let glb = Glb {
        header: Header {
            magic: *b"glTF",
            version: 2,
            length: u32::try_from(length).map_err(|_| ExportError::encode("container exceeds 4 GiB"))?,
        },
        json: Cow::Owned(json),
        bin: Some(Cow::Owned(bin)),
    };

    let mut out = Vec::with_capacity(length);
    glb.to_writer(&mut out)
        .map_err(|e| ExportError::encode(e.to_string()))?;
    Ok(out)
}

/// Write a mesh to `path` as GLB and verify the result.
///
/// Returns the size of the written file in bytes.
///
/// # Errors
///
/// Returns [`ExportError::WriteFailed`] if encoding or writing fails, or if
/// the file is missing or empty afterwards.
///
/// # Example
///
/// ```no_run
/// use mesh_io::export_glb;
/// use mesh_types::unit_cube;
///
/// let size = export_glb(&unit_cube(), "cube.glb").unwrap();
/// assert!(size > 0);
/// ```
pub fn export_glb<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> ExportResult<u64> {
    let path = path.as_ref();
    let fail = |reason: String| ExportError::write_failed(path, reason);

    let bytes = glb_bytes(mesh).map_err(|e| fail(e.to_string()))?;

    let file = File::create(path).map_err(|e| fail(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| fail(e.to_string()))?;
    writer.flush().map_err(|e| fail(e.to_string()))?;
    drop(writer);

    let size = std::fs::metadata(path)
        .map_err(|e| fail(format!("output missing after write: {e}")))?
        .len();
    if size == 0 {
        return Err(fail("output file is empty".to_string()));
    }

    info!(path = %path.display(), bytes = size, vertices = mesh.vertices.len(), faces = mesh.faces.len(), "Exported GLB");
    Ok(size)
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: GLB stores single-precision normals
fn export_normals(mesh: &IndexedMesh) -> Vec<[f32; 3]> {
    let computed;
    let source = if mesh.vertices.iter().all(|v| v.normal.is_some()) {
        mesh
    } else {
        let mut copy = mesh.clone();
        copy.compute_vertex_normals();
        computed = copy;
        &computed
    };

    source
        .vertices
        .iter()
        .map(|v| {
            let n = v
                .normal
                .and_then(|n| n.try_normalize(f64::EPSILON))
                .unwrap_or_else(Vector3::z);
            [n.x as f32, n.y as f32, n.z as f32]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, MeshTopology};

    #[test]
    fn container_layout() {
        let bytes = glb_bytes(&unit_cube()).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 2);
        let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        assert_eq!(length, bytes.len());
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn cube_reads_back() {
        let bytes = glb_bytes(&unit_cube()).unwrap();
        let scene = read_glb(&bytes).unwrap();
        assert_eq!(scene.len(), 1);

        let mesh = scene.into_single_mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.faces, unit_cube().faces);
        assert!(mesh.vertices.iter().all(|v| v.normal.is_some()));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(
            glb_bytes(&IndexedMesh::new()),
            Err(ExportError::Encode { .. })
        ));
    }

    #[test]
    fn bad_index_is_rejected() {
        let mut mesh = unit_cube();
        mesh.faces.push([0, 1, 100]);
        assert!(glb_bytes(&mesh).is_err());
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            read_glb(b"glTF but not really"),
            Err(LoadError::CorruptOrEmpty { .. })
        ));
    }
}
