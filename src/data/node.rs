//! Scene nodes.

use glam::{Mat4, Quat, Vec3};

use super::mesh::Mesh;
use crate::utils::bbox::OptionalBoundingBox3d;

/// A node of the converted scene tree.
///
/// The transform is kept as FBX stores it: `position` and `scale` are the
/// `Lcl Translation` and `Lcl Scaling` properties, `rotation` is
/// `Lcl Rotation`, Euler angles in degrees applied X, then Y, then Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Child nodes, in connection order.
    pub children: Vec<Node>,
    pub mesh: Option<Mesh>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            children: Vec::new(),
            mesh: None,
        }
    }
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Local transform matrix, `T * R * S`.
    pub fn local_matrix(&self) -> Mat4 {
        let Vec3 { x, y, z } = self.rotation;
        let rotation = Quat::from_rotation_z(z.to_radians())
            * Quat::from_rotation_y(y.to_radians())
            * Quat::from_rotation_x(x.to_radians());
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    /// Depth-first, pre-order iterator over this node and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// First node named `name`, in pre-order.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.iter().find(|n| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn mesh_count(&self) -> usize {
        self.iter().filter(|n| n.mesh.is_some()).count()
    }

    /// Union of the mesh bounding boxes of this subtree, each in its own
    /// local space.
    pub fn bounding_box(&self) -> OptionalBoundingBox3d {
        self.iter()
            .filter_map(|n| n.mesh.as_ref())
            .map(Mesh::bounding_box)
            .collect()
    }
}
