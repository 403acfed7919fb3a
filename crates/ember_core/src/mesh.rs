//! Triangle mesh import.
//!
//! Meshes are loaded from Wavefront OBJ files with `tobj` and handed to the
//! renderer as a flat list of vertex triples. Face-index validation happens
//! here so the renderer can consume the triangles as-is.

use std::path::Path;

use ember_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while importing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ file {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("No geometry found in {0}")]
    Empty(String),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Indexed triangle geometry: positions plus every-three-indices faces.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of the positions
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// A mesh without triangles. Stands in for a mesh that failed to load.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Aabb::from_points(min, max)
    }

    /// Number of index triples, including any that reference missing vertices.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterate the triangles as vertex triples.
    ///
    /// Faces that reference a vertex outside `positions` are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |face| {
            let v0 = self.positions.get(face[0] as usize)?;
            let v1 = self.positions.get(face[1] as usize)?;
            let v2 = self.positions.get(face[2] as usize)?;
            Some([*v0, *v1, *v2])
        })
    }
}

/// Load every model in an OBJ file into a single mesh.
///
/// Polygons are triangulated; normals, texture coordinates and materials in
/// the file are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )
    .map_err(|source| MeshError::Obj {
        path: display.clone(),
        source,
    })?;

    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for model in &models {
        let base = positions.len() as u32;
        positions.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        indices.extend(model.mesh.indices.iter().map(|i| base + i));
    }

    if indices.is_empty() {
        return Err(MeshError::Empty(display));
    }

    let mesh = Mesh::new(positions, indices);
    log::debug!(
        "Loaded mesh {}: {} models, {} vertices, {} triangles",
        display,
        models.len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(mesh)
}
