//! Wavefront OBJ reader.
//!
//! Reads `v`, `vn` and `f` records; `vt`, materials and smoothing groups
//! are ignored. Face corners may be `v`, `v/vt`, `v//vn` or `v/vt/vn`, and
//! indices may be negative (relative to the end of the list). Polygons are
//! fan-triangulated. Each `o` or `g` record starts a new scene object; all
//! objects index into the shared vertex list, so every object is compacted
//! to the vertices it actually uses.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Scene, Vector3, Vertex};

use crate::error::{LoadError, LoadResult};

/// Faces of one object, as indices into the file-wide vertex list.
#[derive(Default)]
struct ObjectFaces {
    name: String,
    faces: Vec<[usize; 3]>,
    /// Normal index attached to a vertex by the first corner that used it.
    normals: HashMap<usize, usize>,
}

/// Parse an OBJ buffer into a scene.
///
/// # Errors
///
/// Returns [`LoadError::CorruptOrEmpty`] on malformed numbers or indices
/// that fall outside the vertex list.
pub fn read_obj(bytes: &[u8]) -> LoadResult<Scene> {
    let text = String::from_utf8_lossy(bytes);

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut normals: Vec<Vector3<f64>> = Vec::new();
    let mut objects: Vec<ObjectFaces> = vec![ObjectFaces::default()];

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default();
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let err = |msg: &str| LoadError::corrupt(format!("line {}: {msg}", line_no + 1));

        match keyword {
            "v" => {
                let c = parse_triple(&mut parts).ok_or_else(|| err("bad vertex"))?;
                positions.push(Point3::new(c[0], c[1], c[2]));
            }
            "vn" => {
                let c = parse_triple(&mut parts).ok_or_else(|| err("bad normal"))?;
                normals.push(Vector3::new(c[0], c[1], c[2]));
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let current = objects.last_mut().ok_or_else(|| err("no object"))?;
                if current.faces.is_empty() {
                    current.name = name;
                } else {
                    objects.push(ObjectFaces {
                        name,
                        ..ObjectFaces::default()
                    });
                }
            }
            "f" => {
                let mut corners = Vec::with_capacity(4);
                for token in parts {
                    let (v, vn) = parse_corner(token, positions.len(), normals.len())
                        .ok_or_else(|| err("face index out of range"))?;
                    corners.push((v, vn));
                }
                if corners.len() < 3 {
                    return Err(err("face needs at least three corners"));
                }
                let current = objects.last_mut().ok_or_else(|| err("no object"))?;
                for &(v, vn) in &corners {
                    if let Some(n) = vn {
                        current.normals.entry(v).or_insert(n);
                    }
                }
                for i in 1..corners.len() - 1 {
                    current
                        .faces
                        .push([corners[0].0, corners[i].0, corners[i + 1].0]);
                }
            }
            _ => {}
        }
    }

    let mut scene = Scene::new();
    for object in objects {
        let mesh = compact_object(&object, &positions, &normals);
        scene.push(object.name, mesh);
    }
    Ok(scene)
}

fn parse_triple<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<[f64; 3]> {
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    Some([x, y, z])
}

/// Resolve a 1-based or negative OBJ index against a list length.
fn resolve_index(token: &str, len: usize) -> Option<usize> {
    let i: i64 = token.parse().ok()?;
    let len = i64::try_from(len).ok()?;
    let resolved = match i {
        0 => return None,
        i if i > 0 => i - 1,
        i => len + i,
    };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

fn parse_corner(token: &str, n_positions: usize, n_normals: usize) -> Option<(usize, Option<usize>)> {
    let mut fields = token.split('/');
    let v = resolve_index(fields.next()?, n_positions)?;
    let _vt = fields.next();
    let vn = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, n_normals)?),
        _ => None,
    };
    Some((v, vn))
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
fn compact_object(object: &ObjectFaces, positions: &[Point3<f64>], normals: &[Vector3<f64>]) -> IndexedMesh {
    let mut remap: HashMap<usize, u32> = HashMap::new();
    let mut mesh = IndexedMesh::with_capacity(object.faces.len(), object.faces.len());

    for face in &object.faces {
        let mut out = [0u32; 3];
        for (slot, &v) in out.iter_mut().zip(face) {
            *slot = *remap.entry(v).or_insert_with(|| {
                let mut vertex = Vertex::new(positions[v]);
                vertex.normal = object.normals.get(&v).map(|&n| normals[n]);
                mesh.vertices.push(vertex);
                (mesh.vertices.len() - 1) as u32
            });
        }
        mesh.faces.push(out);
    }

    mesh
}
