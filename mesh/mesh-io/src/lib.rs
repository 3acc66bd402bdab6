//! Mesh loading and GLB export for the outer-shell pipeline.
//!
//! The loader takes raw bytes plus the declared extension and returns one
//! [`IndexedMesh`]; the exporter writes a binary glTF container and checks
//! that it landed on disk.
//!
//! # Accepted formats
//!
//! - **OBJ** (Wavefront) - ASCII, `o`/`g` groups become scene objects
//! - **STL** (Stereolithography) - binary and ASCII, multi-solid ASCII
//! - **PLY** (Polygon File Format) - ASCII and binary
//! - **GLB** (binary glTF 2.0) - accepted so exported shells can be
//!   re-loaded
//!
//! Anything else is rejected with [`LoadError::UnsupportedFormat`] before a
//! single byte is parsed.
//!
//! # Scenes
//!
//! Multi-object sources are parsed into a [`Scene`] and collapsed with
//! [`Scene::into_single_mesh`]: objects without faces are skipped, a single
//! survivor is used directly, several are concatenated with index offsets.
//!
//! # Example
//!
//! ```
//! use mesh_io::{load_mesh, LoadError};
//! use mesh_types::MeshTopology;
//!
//! let obj = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n";
//! let mesh = load_mesh(obj, "obj").unwrap();
//! assert_eq!(mesh.face_count(), 4);
//!
//! assert!(matches!(load_mesh(b"...", ".fbx"), Err(LoadError::UnsupportedFormat { .. })));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod glb;
mod obj;
mod ply;
mod stl;

pub use error::{ExportError, ExportResult, LoadError, LoadResult};
pub use glb::{export_glb, glb_bytes, read_glb};
pub use obj::read_obj;
pub use ply::read_ply;
pub use stl::read_stl;

use std::path::Path;

use mesh_types::{IndexedMesh, Scene};
use tracing::{debug, info};

/// Input formats on the whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ.
    Obj,
    /// STL, binary or ASCII.
    Stl,
    /// PLY, binary or ASCII.
    Ply,
    /// Binary glTF 2.0.
    Glb,
}

impl MeshFormat {
    /// Match a declared extension, case-insensitively and with or without
    /// a leading dot.
    ///
    /// ```
    /// use mesh_io::MeshFormat;
    ///
    /// assert_eq!(MeshFormat::from_extension(".STL"), Some(MeshFormat::Stl));
    /// assert_eq!(MeshFormat::from_extension("fbx"), None);
    /// ```
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            "ply" => Some(Self::Ply),
            "glb" => Some(Self::Glb),
            _ => None,
        }
    }

    /// Detect the format from a path's extension.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
            Self::Ply => "ply",
            Self::Glb => "glb",
        }
    }

    /// Parse bytes in this format into a scene.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::CorruptOrEmpty`] if the bytes do not parse.
    pub fn read_scene(self, bytes: &[u8]) -> LoadResult<Scene> {
        match self {
            Self::Obj => read_obj(bytes),
            Self::Stl => read_stl(bytes),
            Self::Ply => read_ply(bytes),
            Self::Glb => read_glb(bytes),
        }
    }
}

/// Load a mesh from raw bytes and a declared extension.
///
/// # Errors
///
/// - [`LoadError::UnsupportedFormat`] if the extension is not on the
///   whitelist; nothing is parsed.
/// - [`LoadError::EmptyScene`] if a multi-object source has no object with
///   faces.
/// - [`LoadError::CorruptOrEmpty`] if parsing fails, or the mesh has no
///   faces, out-of-range indices or non-finite coordinates.
pub fn load_mesh(bytes: &[u8], ext: &str) -> LoadResult<IndexedMesh> {
    let format = MeshFormat::from_extension(ext).ok_or_else(|| {
        LoadError::unsupported(ext.trim().trim_start_matches('.').to_ascii_lowercase())
    })?;

    let scene = format.read_scene(bytes)?;
    let object_count = scene.len();
    debug!(format = format.extension(), objects = object_count, "Parsed input");

    let mesh = match scene.into_single_mesh() {
        Some(mesh) => mesh,
        None if object_count > 1 => return Err(LoadError::EmptyScene),
        None => return Err(LoadError::corrupt("no faces")),
    };

    if !mesh.is_finite() {
        return Err(LoadError::corrupt("non-finite vertex coordinate"));
    }

    info!(
        format = format.extension(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Read a file and load it using its own extension.
///
/// # Errors
///
/// Everything [`load_mesh`] returns, plus [`LoadError::Io`] if the file
/// cannot be read. The extension is checked before the file is opened.
pub fn load_mesh_file<P: AsRef<Path>>(path: P) -> LoadResult<IndexedMesh> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if MeshFormat::from_extension(ext).is_none() {
        return Err(LoadError::unsupported(ext.to_ascii_lowercase()));
    }
    let bytes = std::fs::read(path)?;
    load_mesh(&bytes, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, MeshTopology};

    #[test]
    fn format_from_extension() {
        assert_eq!(MeshFormat::from_extension("obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_extension(".Ply"), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_extension("GLB"), Some(MeshFormat::Glb));
        assert_eq!(MeshFormat::from_extension("3mf"), None);
        assert_eq!(MeshFormat::from_extension(""), None);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("/a/b/model.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("model"), None);
    }

    #[test]
    fn fbx_is_rejected_before_parsing() {
        // Valid OBJ content does not matter: the extension decides.
        let err = load_mesh(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", ".fbx").unwrap_err();
        match err {
            LoadError::UnsupportedFormat { extension } => assert_eq!(extension, "fbx"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn faceless_obj_objects_are_corrupt() {
        // An `o` record with no faces yet renames the open object, so this
        // is a single object without faces, not an empty scene.
        let text = "o a\nv 0 0 0\no b\nv 1 1 1\n";
        match load_mesh(text.as_bytes(), "obj").unwrap_err() {
            LoadError::CorruptOrEmpty { reason } => assert_eq!(reason, "no faces"),
            other => panic!("unexpected error: {other}"),
        }

        let text = "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 1 1 1\nv 2 1 1\nv 1 2 1\n";
        let mesh = load_mesh(text.as_bytes(), "obj").unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn multi_solid_stl_without_facets_is_empty_scene() {
        let text = "solid a\nendsolid a\nsolid b\nendsolid b\n";
        assert!(matches!(
            load_mesh(text.as_bytes(), "stl"),
            Err(LoadError::EmptyScene)
        ));
    }

    #[test]
    fn empty_obj_is_corrupt() {
        assert!(matches!(
            load_mesh(b"", "obj"),
            Err(LoadError::CorruptOrEmpty { .. })
        ));
    }

    #[test]
    fn non_finite_coordinates_are_corrupt() {
        let text = "v 0 0 0\nv inf 0 0\nv 0 1 0\nf 1 2 3\n";
        assert!(matches!(
            load_mesh(text.as_bytes(), "obj"),
            Err(LoadError::CorruptOrEmpty { .. })
        ));
    }

    #[test]
    fn glb_reloads() {
        let bytes = glb_bytes(&unit_cube()).unwrap();
        let mesh = load_mesh(&bytes, "glb").unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertex_count(), 8);
    }
}
