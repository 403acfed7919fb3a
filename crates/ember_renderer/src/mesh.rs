//! Conversion of imported meshes into renderable triangles.

use crate::{HittableList, Material, Triangle};
use ember_core::Mesh;

/// One [`Triangle`] per mesh face, all sharing `material`.
///
/// An empty mesh yields an empty list, which never reports a hit.
pub fn mesh_to_triangles<M>(mesh: &Mesh, material: M) -> HittableList
where
    M: Material + Clone + 'static,
{
    let mut list = HittableList::new();
    for [v0, v1, v2] in mesh.triangles() {
        list.add(Triangle::new(v0, v1, v2, material.clone()));
    }

    log::debug!(
        "Converted mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        list.len()
    );
    list
}
