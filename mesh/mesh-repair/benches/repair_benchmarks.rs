//! Benchmarks for mesh-repair operations.
//!
//! Run with: cargo bench -p mesh-repair
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-repair -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-repair -- --baseline main

#![allow(missing_docs, clippy::cast_possible_truncation)]

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use mesh_repair::{fill_holes, fix_normals, merge_vertices, repair_mesh, validate_mesh, RepairOptions};
use mesh_types::{torus, IndexedMesh};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Torus exploded into an STL-style soup: three fresh vertices per face.
fn soup(mesh: &IndexedMesh) -> IndexedMesh {
    let mut out = IndexedMesh::with_capacity(mesh.faces.len() * 3, mesh.faces.len());
    for face in &mesh.faces {
        let base = out.vertices.len() as u32;
        for &i in face {
            out.vertices.push(mesh.vertices[i as usize].clone());
        }
        out.faces.push([base, base + 1, base + 2]);
    }
    out
}

fn test_cases() -> [(&'static str, IndexedMesh); 3] {
    [
        ("torus_1k", torus(2.0, 0.5, 32, 16)),
        ("torus_10k", torus(2.0, 0.5, 100, 50)),
        ("torus_80k", torus(2.0, 0.5, 400, 100)),
    ]
}

// =============================================================================
// Validation Benchmarks
// =============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Validation");

    for (name, mesh) in &test_cases() {
        group.throughput(Throughput::Elements(mesh.faces.len() as u64));
        group.bench_with_input(BenchmarkId::new("validate", name), mesh, |b, mesh| {
            b.iter(|| validate_mesh(black_box(mesh)));
        });
    }

    group.finish();
}

// =============================================================================
// Repair Benchmarks
// =============================================================================

fn bench_repair(c: &mut Criterion) {
    let mut group = c.benchmark_group("Repair");
    group.sample_size(20);

    for (name, mesh) in &test_cases() {
        let soup = soup(mesh);
        group.throughput(Throughput::Elements(mesh.faces.len() as u64));

        group.bench_with_input(BenchmarkId::new("merge_vertices", name), &soup, |b, soup| {
            b.iter_batched(
                || soup.clone(),
                |mut m| merge_vertices(&mut m, 1e-9),
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("fix_normals", name), mesh, |b, mesh| {
            b.iter_batched(
                || {
                    let mut m = mesh.clone();
                    m.flip_normals();
                    m
                },
                |mut m| fix_normals(&mut m),
                BatchSize::LargeInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("pre_clean_soup", name), &soup, |b, soup| {
            let options = RepairOptions::pre_clean();
            b.iter_batched(
                || soup.clone(),
                |mut m| repair_mesh(&mut m, &options),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Hole Filling Benchmarks
// =============================================================================

fn bench_hole_filling(c: &mut Criterion) {
    let mut group = c.benchmark_group("HoleFilling");

    // Every tenth face removed: many small holes.
    let mut perforated = torus(2.0, 0.5, 100, 50);
    let mut index = 0;
    perforated.faces.retain(|_| {
        index += 1;
        index % 10 != 0
    });

    group.bench_function("fill_holes_torus_10k", |b| {
        b.iter_batched(
            || perforated.clone(),
            |mut m| fill_holes(&mut m, 100),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_validation, bench_repair, bench_hole_filling);
criterion_main!(benches);
