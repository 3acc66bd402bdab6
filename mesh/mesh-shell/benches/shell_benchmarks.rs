//! Benchmarks for mesh-shell operations.
//!
//! Run with: cargo bench -p mesh-shell
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-shell -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-shell -- --baseline main

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_shell::{
    alpha_shape, convex_hull, extract_shell, point_cloud_hull, voxel_surface, PointSample,
    ShellParams, ShellStrategy,
};
use mesh_types::{cuboid, torus, IndexedMesh, Point3};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Torus with a smaller torus and a box hidden inside it.
fn nested_torus() -> IndexedMesh {
    let mut mesh = torus(2.0, 0.5, 64, 32);
    mesh.merge(&torus(2.0, 0.25, 32, 16));
    mesh.merge(&cuboid(
        Point3::new(1.9, -0.1, -0.1),
        Point3::new(2.1, 0.1, 0.1),
    ));
    mesh
}

// =============================================================================
// Strategies
// =============================================================================

fn bench_voxel_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("VoxelSurface");
    let mesh = nested_torus();
    group.throughput(Throughput::Elements(mesh.faces.len() as u64));

    for resolution in [32, 64, 100] {
        let params = ShellParams::default().with_voxel_resolution(resolution);
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &params,
            |b, params| b.iter(|| voxel_surface(black_box(&mesh), params)),
        );
    }

    group.finish();
}

fn bench_alpha_shape(c: &mut Criterion) {
    let mut group = c.benchmark_group("AlphaShape");
    group.sample_size(20);
    let mesh = nested_torus();

    for samples in [256, 1024] {
        let params = ShellParams {
            alpha_sample_count: samples,
            ..ShellParams::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(samples), &params, |b, params| {
            b.iter(|| alpha_shape(black_box(&mesh), params));
        });
    }

    group.finish();
}

fn bench_hulls(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hull");
    let mesh = nested_torus();
    let params = ShellParams::default();

    for count in [1_000, 10_000] {
        let points = PointSample::from_surface(&mesh, count, 1).points;
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("convex_hull", count), &points, |b, p| {
            b.iter(|| convex_hull(black_box(p)));
        });
    }

    group.bench_function("point_cloud_hull", |b| {
        b.iter(|| point_cloud_hull(black_box(&mesh), &params));
    });

    group.finish();
}

// =============================================================================
// Chain
// =============================================================================

fn bench_extract_shell(c: &mut Criterion) {
    let mut group = c.benchmark_group("ExtractShell");
    let mesh = nested_torus();

    group.bench_function("default_chain", |b| {
        b.iter(|| extract_shell(black_box(&mesh), &ShellParams::default()));
    });

    // Force the chain past the voxel stage.
    let params = ShellParams::default().with_strategies([
        ShellStrategy::ConvexHull,
        ShellStrategy::Identity,
    ]);
    group.bench_function("hull_first", |b| {
        b.iter(|| extract_shell(black_box(&mesh), &params));
    });

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(
    benches,
    bench_voxel_surface,
    bench_alpha_shape,
    bench_hulls,
    bench_extract_shell
);
criterion_main!(benches);
