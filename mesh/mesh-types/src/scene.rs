//! Multi-object scenes.

use crate::{IndexedMesh, MeshTopology};

/// Named sub-meshes read from a source that encodes several objects
/// (OBJ `o`/`g` groups, multi-solid ASCII STL, glTF primitives).
///
/// A scene only lives between parsing and [`Scene::into_single_mesh`];
/// everything downstream of the loader sees one [`IndexedMesh`].
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, IndexedMesh, MeshTopology, Scene};
///
/// let mut scene = Scene::new();
/// scene.push("outer", unit_cube());
/// scene.push("empty", IndexedMesh::new());
/// scene.push("other", unit_cube());
///
/// let merged = scene.into_single_mesh().unwrap();
/// assert_eq!(merged.face_count(), 24);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Objects in file order.
    pub objects: Vec<(String, IndexedMesh)>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Append a named object.
    pub fn push(&mut self, name: impl Into<String>, mesh: IndexedMesh) {
        self.objects.push((name.into(), mesh));
    }

    /// Number of objects, qualifying or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects that are usable polygonal meshes: at least one face, and
    /// every index in range.
    pub fn qualifying(&self) -> impl Iterator<Item = &(String, IndexedMesh)> {
        self.objects
            .iter()
            .filter(|(_, m)| !m.is_empty() && m.has_valid_indices())
    }

    /// Collapse the scene into one mesh.
    ///
    /// Non-qualifying objects are ignored. Returns `None` if nothing
    /// qualifies, the single object unchanged if exactly one does, and the
    /// index-offset concatenation of all of them otherwise.
    #[must_use]
    pub fn into_single_mesh(self) -> Option<IndexedMesh> {
        let mut meshes = self
            .objects
            .into_iter()
            .map(|(_, m)| m)
            .filter(|m| !m.is_empty() && m.has_valid_indices());

        let mut merged = meshes.next()?;
        for mesh in meshes {
            merged.merge(&mesh);
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{unit_cube, Vertex};

    #[test]
    fn empty_scene_has_no_mesh() {
        assert!(Scene::new().into_single_mesh().is_none());

        let mut scene = Scene::new();
        scene.push("points", IndexedMesh::from_parts(vec![Vertex::from_coords(0.0, 0.0, 0.0)], vec![]));
        assert_eq!(scene.qualifying().count(), 0);
        assert!(scene.into_single_mesh().is_none());
    }

    #[test]
    fn single_object_used_directly() {
        let mut scene = Scene::new();
        scene.push("cube", unit_cube());
        assert_eq!(scene.into_single_mesh(), Some(unit_cube()));
    }

    #[test]
    fn broken_object_is_skipped() {
        let mut scene = Scene::new();
        let mut broken = unit_cube();
        broken.faces.push([0, 1, 42]);
        scene.push("broken", broken);
        scene.push("cube", unit_cube());

        let merged = scene.into_single_mesh().unwrap();
        assert_eq!(merged.face_count(), 12);
    }
}
