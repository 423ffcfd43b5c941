//! Mesh.

use glam::{Vec2, Vec3};

use crate::utils::bbox::OptionalBoundingBox3d;

/// Flattened triangle mesh.
///
/// Every polygon vertex gets its own slot, so `vertices` holds three entries
/// per triangle and nothing is shared between neighboring triangles.
/// `normals`, `tangents` and `uvs` are parallel to `vertices`, or empty when
/// the source geometry had no such layer element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Positions of each triangle, in order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Bounding box in the mesh's local space.
    pub fn bounding_box(&self) -> OptionalBoundingBox3d {
        self.vertices.iter().collect()
    }
}
