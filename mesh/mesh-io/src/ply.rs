//! PLY (Polygon File Format) reader.
//!
//! ASCII, binary little-endian and binary big-endian files are read through
//! `ply-rs` from an in-memory cursor.
//!
//! # Supported Properties
//!
//! - Vertex positions (`x`, `y`, `z`) - required
//! - Vertex normals (`nx`, `ny`, `nz`) - optional
//! - Face index lists (`vertex_indices` or `vertex_index`), fan-triangulated

use std::io::Cursor;

use mesh_types::{IndexedMesh, Scene, Vector3, Vertex};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{LoadError, LoadResult};

/// Parse a PLY buffer into a single-object scene.
///
/// # Errors
///
/// Returns [`LoadError::CorruptOrEmpty`] if the header or payload cannot be
/// parsed, a vertex lacks a coordinate, or a face index is negative.
pub fn read_ply(bytes: &[u8]) -> LoadResult<Scene> {
    let mut reader = Cursor::new(bytes);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| LoadError::corrupt(format!("failed to parse PLY: {e}")))?;

    let mut mesh = IndexedMesh::new();

    if let Some(vertex_elements) = ply.payload.get("vertex") {
        mesh.vertices.reserve(vertex_elements.len());
        for (i, element) in vertex_elements.iter().enumerate() {
            let coord = |key: &str| {
                scalar(element, key)
                    .ok_or_else(|| LoadError::corrupt(format!("vertex {i} has no '{key}' property")))
            };
            let mut vertex = Vertex::from_coords(coord("x")?, coord("y")?, coord("z")?);
            if let (Some(nx), Some(ny), Some(nz)) = (
                scalar(element, "nx"),
                scalar(element, "ny"),
                scalar(element, "nz"),
            ) {
                vertex.normal = Some(Vector3::new(nx, ny, nz));
            }
            mesh.vertices.push(vertex);
        }
    }

    if let Some(face_elements) = ply.payload.get("face") {
        mesh.faces.reserve(face_elements.len());
        for (i, element) in face_elements.iter().enumerate() {
            let indices = index_list(element)
                .ok_or_else(|| LoadError::corrupt(format!("face {i} has an invalid index list")))?;
            for k in 1..indices.len().saturating_sub(1) {
                mesh.faces.push([indices[0], indices[k], indices[k + 1]]);
            }
        }
    }

    let mut scene = Scene::new();
    scene.push("ply", mesh);
    Ok(scene)
}

/// Read a numeric scalar property as `f64`.
fn scalar(element: &DefaultElement, key: &str) -> Option<f64> {
    Some(match element.get(key)? {
        Property::Float(v) => f64::from(*v),
        Property::Double(v) => *v,
        Property::Char(v) => f64::from(*v),
        Property::UChar(v) => f64::from(*v),
        Property::Short(v) => f64::from(*v),
        Property::UShort(v) => f64::from(*v),
        Property::Int(v) => f64::from(*v),
        Property::UInt(v) => f64::from(*v),
        _ => return None,
    })
}

/// Extract the face index list, rejecting negative entries.
fn index_list(element: &DefaultElement) -> Option<Vec<u32>> {
    for key in ["vertex_indices", "vertex_index"] {
        let Some(prop) = element.get(key) else {
            continue;
        };
        return match prop {
            Property::ListInt(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
            Property::ListUInt(v) => Some(v.clone()),
            Property::ListShort(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
            Property::ListUShort(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
            Property::ListChar(v) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
            Property::ListUChar(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
            _ => None,
        };
    }
    None
}
