//! File-level conformance tests: every accepted format loads from disk,
//! and exported containers read back with the same topology.
//!
//! To run: cargo test -p mesh-io --test format_conformance

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use mesh_io::{export_glb, load_mesh, load_mesh_file, ExportError, LoadError};
use mesh_types::{torus, unit_cube, IndexedMesh, MeshTopology};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

fn cube_obj() -> String {
    let cube = unit_cube();
    let mut out = String::from("o cube\n");
    for v in &cube.vertices {
        out.push_str(&format!("v {} {} {}\n", v.position.x, v.position.y, v.position.z));
    }
    for f in &cube.faces {
        out.push_str(&format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1));
    }
    out
}

fn cube_ascii_stl() -> String {
    let cube = unit_cube();
    let mut out = String::from("solid cube\n");
    for f in &cube.faces {
        out.push_str("  facet normal 0 0 0\n    outer loop\n");
        for &i in f {
            let p = cube.vertices[i as usize].position;
            out.push_str(&format!("      vertex {} {} {}\n", p.x, p.y, p.z));
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    out.push_str("endsolid cube\n");
    out
}

fn cube_ply() -> String {
    let cube = unit_cube();
    let mut out = format!(
        "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nelement face {}\nproperty list uchar int vertex_indices\nend_header\n",
        cube.vertices.len(),
        cube.faces.len()
    );
    for v in &cube.vertices {
        out.push_str(&format!("{} {} {}\n", v.position.x, v.position.y, v.position.z));
    }
    for f in &cube.faces {
        out.push_str(&format!("3 {} {} {}\n", f[0], f[1], f[2]));
    }
    out
}

#[test]
fn every_format_loads_from_disk() {
    let dir = tempdir().unwrap();

    let obj = load_mesh_file(write(dir.path(), "cube.obj", cube_obj().as_bytes())).unwrap();
    assert_eq!(obj.face_count(), 12);
    assert!(obj.is_watertight());

    // STL repeats corners per facet, so the soup is not watertight yet.
    let stl = load_mesh_file(write(dir.path(), "cube.STL", cube_ascii_stl().as_bytes())).unwrap();
    assert_eq!(stl.face_count(), 12);
    assert_eq!(stl.vertex_count(), 36);

    let ply = load_mesh_file(write(dir.path(), "cube.ply", cube_ply().as_bytes())).unwrap();
    assert_eq!(ply.face_count(), 12);
    assert!((ply.volume() - 1.0).abs() < 1e-9);
}

#[test]
fn unsupported_extension_is_rejected_before_reading() {
    // The file does not exist: the extension check must come first.
    let err = load_mesh_file("/definitely/not/here/model.fbx").unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat { .. }));

    let err = load_mesh_file("/definitely/not/here/model.obj").unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn exported_glb_round_trips() {
    let dir = tempdir().unwrap();
    let mesh = torus(2.0, 0.5, 32, 16);
    let path = dir.path().join("torus_outer_shell.glb");

    let size = export_glb(&mesh, &path).unwrap();
    assert_eq!(size, std::fs::metadata(&path).unwrap().len());

    let back = load_mesh_file(&path).unwrap();
    assert_eq!(back.vertex_count(), mesh.vertex_count());
    assert_eq!(back.face_count(), mesh.face_count());
    assert!(back.is_watertight());
    assert!(back.signed_volume() > 0.0);
}

#[test]
fn export_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("out.glb");
    let err = export_glb(&unit_cube(), &path).unwrap_err();
    assert!(matches!(err, ExportError::WriteFailed { .. }));
    assert!(!path.exists());
}

#[test]
fn export_empty_mesh_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.glb");
    assert!(export_glb(&IndexedMesh::new(), &path).is_err());
}

#[test]
fn garbage_bytes_are_corrupt_for_every_format() {
    for ext in ["obj", "stl", "ply", "glb"] {
        let err = load_mesh(b"\x00\x01garbage", ext).unwrap_err();
        assert!(
            matches!(err, LoadError::CorruptOrEmpty { .. }),
            "{ext}: unexpected {err}"
        );
    }
}
