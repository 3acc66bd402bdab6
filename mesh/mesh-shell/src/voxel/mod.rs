//! Voxel surface extraction.
//!
//! The mesh is rasterized into a [`VoxelGrid`] at a pitch of
//! `max_extent / R`. Flooding the exterior from a padded corner leaves
//! everything else solid, so cavities and nested shells disappear. The
//! boundary of the solid is then meshed with [`boundary_mesh`].

mod grid;
mod surface;

pub use grid::VoxelGrid;
pub use surface::boundary_mesh;

use mesh_types::{IndexedMesh, MeshBounds, MeshTopology};
use tracing::debug;

use crate::error::{ShellError, ShellResult};
use crate::params::ShellParams;

/// Outer shell from the boundary of the voxelized solid.
///
/// # Errors
///
/// - [`ShellError::EmptyMesh`] for an input without faces.
/// - [`ShellError::InvalidParams`] for bad parameters.
/// - [`ShellError::Degenerate`] or [`ShellError::GridTooLarge`] when no
///   grid can be sized for the mesh.
/// - [`ShellError::EmptyResult`] if nothing was rasterized.
pub fn voxel_surface(mesh: &IndexedMesh, params: &ShellParams) -> ShellResult<IndexedMesh> {
    params.validate()?;
    if mesh.is_empty() {
        return Err(ShellError::EmptyMesh);
    }

    let mut grid =
        VoxelGrid::for_bounds(&mesh.bounds(), params.voxel_resolution, params.max_voxel_cells)?;
    let surface_cells = grid.rasterize(mesh);
    let filled = grid.fill_exterior()?;

    debug!(
        dimensions = ?grid.dimensions(),
        pitch = grid.pitch(),
        surface_cells,
        filled,
        "Voxelized mesh"
    );

    let shell = boundary_mesh(&grid);
    if shell.faces.is_empty() {
        return Err(ShellError::EmptyResult);
    }
    Ok(shell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{cuboid, unit_cube, Point3};

    #[test]
    fn nested_cube_keeps_only_the_outer_shell() {
        let mut mesh = unit_cube();
        mesh.merge(&cuboid(
            Point3::new(0.25, 0.25, 0.25),
            Point3::new(0.75, 0.75, 0.75),
        ));
        assert_eq!(mesh.faces.len(), 24);

        let shell = voxel_surface(&mesh, &ShellParams::default()).unwrap();
        assert_eq!(shell.faces.len(), 12);
        assert_eq!(shell.vertices.len(), 8);
        assert!(shell.is_watertight());

        // One pitch of padding from the rasterized face cells.
        let bounds = shell.bounds();
        assert_relative_eq!(bounds.min.x, -0.5 / 64.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.max.x, 1.0 + 0.5 / 64.0, epsilon = 1e-12);
        assert!(shell.signed_volume() > 1.0);
    }

    #[test]
    fn detailed_resolution_also_gives_a_box() {
        let shell = voxel_surface(&unit_cube(), &ShellParams::detailed()).unwrap();
        assert_eq!(shell.faces.len(), 12);
    }

    #[test]
    fn empty_mesh_fails() {
        assert_eq!(
            voxel_surface(&IndexedMesh::new(), &ShellParams::default()),
            Err(ShellError::EmptyMesh)
        );
    }

    #[test]
    fn cell_budget_is_enforced() {
        let params = ShellParams {
            max_voxel_cells: 1000,
            ..ShellParams::default()
        };
        assert!(matches!(
            voxel_surface(&unit_cube(), &params),
            Err(ShellError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn flat_mesh_becomes_a_slab() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(mesh_types::Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(mesh_types::Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(mesh_types::Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let shell = voxel_surface(&mesh, &ShellParams::default().with_voxel_resolution(8)).unwrap();
        assert!(shell.is_watertight());
        assert!(shell.signed_volume() > 0.0);
    }
}
