//! Benchmarks for mesh-io operations.
//!
//! Run with: cargo bench -p mesh-io
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-io -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-io -- --baseline main

use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mesh_io::{export_glb, glb_bytes, load_mesh};
use mesh_types::{torus, IndexedMesh};
use tempfile::tempdir;

// =============================================================================
// Input Encoding
// =============================================================================

fn to_obj(mesh: &IndexedMesh) -> Vec<u8> {
    let mut out = String::new();
    for v in &mesh.vertices {
        let p = v.position;
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for f in &mesh.faces {
        let _ = writeln!(out, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1);
    }
    out.into_bytes()
}

#[allow(clippy::cast_possible_truncation)]
fn to_binary_stl(mesh: &IndexedMesh) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out.extend_from_slice(&(mesh.faces.len() as u32).to_le_bytes());
    for f in &mesh.faces {
        out.extend_from_slice(&[0u8; 12]);
        for &i in f {
            let p = mesh.vertices[i as usize].position;
            for c in [p.x, p.y, p.z] {
                out.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        out.extend_from_slice(&[0u8; 2]);
    }
    out
}

// =============================================================================
// I/O Benchmarks
// =============================================================================

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("IO");

    let mesh = torus(2.0, 0.5, 100, 50); // 10k triangles
    let obj = to_obj(&mesh);
    let stl = to_binary_stl(&mesh);
    let glb = glb_bytes(&mesh).expect("failed to encode GLB");

    group.throughput(Throughput::Elements(mesh.faces.len() as u64));

    group.bench_function("load_obj", |b| b.iter(|| load_mesh(black_box(&obj), "obj")));
    group.bench_function("load_stl", |b| b.iter(|| load_mesh(black_box(&stl), "stl")));
    group.bench_function("load_glb", |b| b.iter(|| load_mesh(black_box(&glb), "glb")));

    group.bench_function("encode_glb", |b| b.iter(|| glb_bytes(black_box(&mesh))));

    let temp_dir = tempdir().expect("failed to create temp dir");
    let out = temp_dir.path().join("bench_out.glb");
    group.bench_function("export_glb", |b| {
        b.iter(|| export_glb(black_box(&mesh), black_box(&out)));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_io);
criterion_main!(benches);
