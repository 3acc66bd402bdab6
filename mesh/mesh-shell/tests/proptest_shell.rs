//! Property-based tests for shell extraction.
//!
//! Run with: cargo test -p mesh-shell --test proptest_shell

use mesh_shell::{convex_hull, extract_shell, ShellParams, ShellStrategy};
use mesh_types::{cuboid, torus, IndexedMesh, MeshBounds, Point3, Vertex};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_cuboid() -> impl Strategy<Value = IndexedMesh> {
    (arb_point(), prop::array::uniform3(0.5..5.0f64)).prop_map(|(min, [dx, dy, dz])| {
        cuboid(min, Point3::new(min.x + dx, min.y + dy, min.z + dz))
    })
}

fn arb_torus() -> impl Strategy<Value = IndexedMesh> {
    (1.0..4.0f64, 0.2..0.8f64, 8usize..24, 6usize..12)
        .prop_map(|(major, minor, rings, sides)| torus(major, minor, rings, sides))
}

/// Arbitrary triangles over a handful of points; often not closed at all.
fn arb_soup() -> impl Strategy<Value = IndexedMesh> {
    (
        prop::collection::vec(arb_point(), 3..12),
        prop::collection::vec(prop::array::uniform3(0u32..3), 1..8),
    )
        .prop_map(|(points, faces)| IndexedMesh {
            vertices: points.into_iter().map(Vertex::new).collect(),
            faces,
        })
}

fn contains(outer: &IndexedMesh, inner: &IndexedMesh, tolerance: f64) -> bool {
    let (a, b) = (outer.bounds(), inner.bounds());
    (0..3).all(|i| a.min[i] <= b.min[i] + tolerance && a.max[i] >= b.max[i] - tolerance)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn voxel_shell_encloses_a_cuboid(mesh in arb_cuboid()) {
        let params = ShellParams::default().with_voxel_resolution(24);
        let result = extract_shell(&mesh, &params);

        prop_assert_eq!(result.strategy_used, ShellStrategy::VoxelSurface);
        prop_assert!(result.mesh.has_valid_indices());
        prop_assert!(contains(&result.mesh, &mesh, 1e-9));
        prop_assert!(result.mesh.volume() >= mesh.volume() * (1.0 - 1e-9));
    }

    #[test]
    fn torus_shell_is_never_empty(mesh in arb_torus()) {
        let params = ShellParams::default().with_voxel_resolution(32);
        let result = extract_shell(&mesh, &params);

        prop_assert!(!result.mesh.faces.is_empty());
        prop_assert!(result.mesh.has_valid_indices());
        prop_assert!(contains(&result.mesh, &mesh, 1e-9));
    }

    #[test]
    fn extraction_always_returns_a_usable_mesh(mesh in arb_soup()) {
        let params = ShellParams::default().with_voxel_resolution(16);
        let result = extract_shell(&mesh, &params);

        prop_assert!(result.mesh.has_valid_indices());
        prop_assert!(!result.attempts.is_empty());
        if result.strategy_used == ShellStrategy::Identity {
            prop_assert_eq!(&result.mesh, &mesh);
        }
    }

    #[test]
    fn hull_contains_its_points(points in prop::collection::vec(arb_point(), 4..64)) {
        let Ok(hull) = convex_hull(&points) else {
            return Ok(());
        };
        prop_assert!(hull.is_watertight());
        for (normal, face) in hull.face_normals().into_iter().zip(&hull.faces) {
            let Some(normal) = normal else { continue };
            let origin = hull.vertices[face[0] as usize].position;
            for p in &points {
                prop_assert!((p - origin).dot(&normal) <= 1e-6);
            }
        }
    }
}
