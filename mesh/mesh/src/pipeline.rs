//! The end-to-end run: bytes in, GLB out.

use std::fmt;
use std::path::Path;

use mesh_io::{export_glb, load_mesh, LoadError};
use mesh_repair::{repair_mesh, RepairReport, RepairWarning};
use mesh_shell::{extract_shell, ShellAttempt, ShellStrategy};
use mesh_types::IndexedMesh;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// What a pipeline run did, stage by stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Vertices as loaded.
    pub input_vertices: usize,
    /// Faces as loaded.
    pub input_faces: usize,
    /// Cleanup of the loaded mesh.
    pub pre_clean: RepairReport,
    /// Strategy that produced the shell.
    pub strategy_used: ShellStrategy,
    /// Every strategy tried, in order.
    pub shell_attempts: Vec<ShellAttempt>,
    /// Cleanup, hole filling, simplification and normal fixing of the
    /// shell.
    pub post_clean: RepairReport,
    /// Vertices written.
    pub output_vertices: usize,
    /// Faces written.
    pub output_faces: usize,
    /// Whether the final mesh is closed with consistent winding.
    pub watertight: bool,
    /// Size of the written container. `None` for in-memory runs.
    pub output_bytes: Option<u64>,
}

impl PipelineReport {
    /// Repair warnings from both cleanup passes, in order.
    pub fn warnings(&self) -> impl Iterator<Item = &RepairWarning> {
        self.pre_clean
            .warnings
            .iter()
            .chain(&self.post_clean.warnings)
    }

    /// True if the post-extraction pass simplified the shell.
    #[must_use]
    pub const fn decimated(&self) -> bool {
        self.post_clean.faces_decimated > 0
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} verts / {} faces -> {} verts / {} faces via {}",
            self.input_vertices,
            self.input_faces,
            self.output_vertices,
            self.output_faces,
            self.strategy_used
        )?;
        if self.watertight {
            write!(f, ", watertight")?;
        }
        if let Some(bytes) = self.output_bytes {
            write!(f, ", {bytes} bytes")?;
        }
        let warnings = self.warnings().count();
        if warnings > 0 {
            write!(f, ", {warnings} warning(s)")?;
        }
        Ok(())
    }
}

/// Run every geometric stage on an in-memory mesh.
///
/// Cleans the input, extracts its outer shell, cleans the shell (filling
/// holes only if it is not watertight), applies the decimation policy and
/// fixes normals. Never fails: strategy failures fall through the chain
/// and repair setbacks become warnings in the report.
///
/// # Example
///
/// ```
/// use outer_shell::{process_mesh, PipelineConfig};
/// use outer_shell::shell::ShellStrategy;
/// use outer_shell::types::{cuboid, unit_cube, Point3};
///
/// let mut mesh = unit_cube();
/// mesh.merge(&cuboid(Point3::new(0.3, 0.3, 0.3), Point3::new(0.7, 0.7, 0.7)));
///
/// let (shell, report) = process_mesh(mesh, &PipelineConfig::default());
/// assert_eq!(report.strategy_used, ShellStrategy::VoxelSurface);
/// assert_eq!(shell.faces.len(), 12);
/// assert!(report.watertight);
/// ```
#[must_use]
pub fn process_mesh(mut mesh: IndexedMesh, config: &PipelineConfig) -> (IndexedMesh, PipelineReport) {
    let loaded = (mesh.vertices.len(), mesh.faces.len());
    let pre_clean = clean_input(&mut mesh, config);
    shell_stages(mesh, loaded, pre_clean, config)
}

fn clean_input(mesh: &mut IndexedMesh, config: &PipelineConfig) -> RepairReport {
    let report = repair_mesh(mesh, &config.pre_clean);
    debug!(report = %report, "Pre-clean finished");
    report
}

/// Extraction and post-clean of an already cleaned mesh. `loaded` is the
/// vertex and face count before pre-clean.
fn shell_stages(
    mesh: IndexedMesh,
    loaded: (usize, usize),
    pre_clean: RepairReport,
    config: &PipelineConfig,
) -> (IndexedMesh, PipelineReport) {
    let extraction = extract_shell(&mesh, &config.shell);
    drop(mesh);
    let mut shell = extraction.mesh;

    let mut post_options = config.post_clean.clone();
    post_options.fill_holes &= !shell.is_watertight();
    let post_clean = repair_mesh(&mut shell, &post_options);
    debug!(report = %post_clean, "Post-clean finished");

    let watertight = shell.is_watertight();
    if !watertight {
        warn!(faces = shell.faces.len(), "Output is not watertight");
    }

    let report = PipelineReport {
        input_vertices: loaded.0,
        input_faces: loaded.1,
        pre_clean,
        strategy_used: extraction.strategy_used,
        shell_attempts: extraction.attempts,
        post_clean,
        output_vertices: shell.vertices.len(),
        output_faces: shell.faces.len(),
        watertight,
        output_bytes: None,
    };
    (shell, report)
}

/// Load `bytes` as a mesh of type `ext`, run [`process_mesh`] and write
/// the result to `out_path` as GLB.
///
/// # Errors
///
/// - [`crate::PipelineError::Load`] if the extension is not supported,
///   the bytes are not a mesh, or no face survives pre-clean. Nothing is
///   written.
/// - [`crate::PipelineError::Export`] if the container cannot be written.
///
/// # Example
///
/// ```
/// use outer_shell::{process, PipelineConfig};
///
/// let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n";
/// let dir = tempfile::tempdir().unwrap();
/// let out = dir.path().join("tet_outer_shell.glb");
///
/// let report = process(obj.as_bytes(), "obj", &out, &PipelineConfig::default()).unwrap();
/// assert!(report.output_bytes.unwrap() > 0);
/// assert!(out.exists());
/// ```
pub fn process<P: AsRef<Path>>(
    bytes: &[u8],
    ext: &str,
    out_path: P,
    config: &PipelineConfig,
) -> PipelineResult<PipelineReport> {
    let out_path = out_path.as_ref();

    let mut mesh = load_mesh(bytes, ext)?;
    let loaded = (mesh.vertices.len(), mesh.faces.len());
    info!(
        format = ext,
        vertices = loaded.0,
        faces = loaded.1,
        "Loaded mesh"
    );

    let pre_clean = clean_input(&mut mesh, config);
    if mesh.faces.is_empty() {
        return Err(LoadError::corrupt("no usable faces after cleanup").into());
    }

    let (shell, mut report) = shell_stages(mesh, loaded, pre_clean, config);
    report.output_bytes = Some(export_glb(&shell, out_path)?);

    info!(
        path = %out_path.display(),
        strategy = %report.strategy_used,
        faces = report.output_faces,
        bytes = report.output_bytes,
        "Wrote outer shell"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_repair::DecimationPolicy;
    use mesh_types::{torus, unit_cube, Vertex};

    #[test]
    fn welds_soup_before_extraction() {
        // Unit cube as an STL-style soup: 36 vertices.
        let cube = unit_cube();
        let mut soup = IndexedMesh::new();
        for face in &cube.faces {
            let base = u32::try_from(soup.vertices.len()).unwrap();
            for &i in face {
                soup.vertices.push(cube.vertices[i as usize].clone());
            }
            soup.faces.push([base, base + 1, base + 2]);
        }

        let config = PipelineConfig::default().with_strategies([ShellStrategy::Identity]);
        let (shell, report) = process_mesh(soup, &config);
        assert_eq!(report.input_vertices, 36);
        assert_eq!(report.pre_clean.vertices_merged, 28);
        assert_eq!(shell.vertices.len(), 8);
        assert!(report.watertight);
    }

    #[test]
    fn open_shell_gets_its_holes_filled() {
        let mut mesh = unit_cube();
        mesh.faces.truncate(10);

        let config = PipelineConfig::default().with_strategies([ShellStrategy::Identity]);
        let (shell, report) = process_mesh(mesh, &config);
        assert_eq!(report.post_clean.holes_filled, 1);
        assert_eq!(shell.faces.len(), 12);
        assert!(report.watertight);
    }

    #[test]
    fn decimation_policy_applies_to_the_shell() {
        let config = PipelineConfig::default()
            .with_strategies([ShellStrategy::Identity])
            .with_decimation(Some(DecimationPolicy::new(1_000, 500)));
        let (shell, report) = process_mesh(torus(2.0, 0.5, 40, 20), &config);
        assert!(report.decimated());
        assert!(shell.faces.len() <= 500);
        assert_eq!(report.output_faces, shell.faces.len());
    }

    #[test]
    fn flat_input_survives_via_identity() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let config = PipelineConfig::default().with_strategies([
            ShellStrategy::ConvexHull,
            ShellStrategy::PointCloudHull,
            ShellStrategy::Identity,
        ]);
        let (shell, report) = process_mesh(mesh, &config);
        assert_eq!(report.strategy_used, ShellStrategy::Identity);
        assert_eq!(report.shell_attempts.len(), 3);
        assert!(!shell.faces.is_empty());
    }

    #[test]
    fn report_display() {
        let (_, report) = process_mesh(unit_cube(), &PipelineConfig::default());
        let text = report.to_string();
        assert!(text.starts_with("8 verts / 12 faces"));
        assert!(text.contains("voxel_surface"));
        assert!(text.contains("watertight"));
    }
}
