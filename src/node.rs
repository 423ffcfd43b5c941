//! Scene graph traversal.

use std::collections::HashSet;

use fbxcel_dom::v7400::{
    object::{
        geometry::{MeshHandle, TypedGeometryHandle},
        model::ModelHandle,
        ObjectHandle, TypedObjectHandle,
    },
    Document,
};
use glam::DVec3;
use tracing::{debug, trace, warn};

#[cfg(feature = "profile")]
use tracing::info_span;

use crate::{
    data::node::Node,
    error::{FbxError, Result},
    loader::ConvertOptions,
    mesh::MeshConverter,
    utils::fbx_extend::{DocumentExt, ObjectHandleExt},
};

/// Name given to the synthetic scene root.
pub const ROOT_NODE_NAME: &str = "RootNode";

/// State of one traversal.
#[derive(Debug, Default)]
struct Walk {
    /// Models on the path from the root to the current one.
    ancestors: HashSet<i64>,
    /// Models converted so far.
    nodes: usize,
}

/// Converts `Model` objects and everything connected below them.
#[derive(Debug, Clone, Copy)]
pub struct NodeConverter {
    meshes: MeshConverter,
    node_limit: usize,
}

impl Default for NodeConverter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl NodeConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            meshes: MeshConverter::new(options),
            node_limit: options.node_limit,
        }
    }

    /// Converts the whole scene, below a synthetic [`ROOT_NODE_NAME`] node.
    pub fn convert_root(&self, doc: &Document) -> Result<Node> {
        #[cfg(feature = "profile")]
        let _hierarchy_span = info_span!("convert_fbx_hierarchy").entered();

        let root_id = match doc.scene_root_id() {
            Some(id) => id,
            None => {
                warn!("FBX document has no scene root, the scene is empty");
                return Ok(Node::new(ROOT_NODE_NAME));
            }
        };
        let mut walk = Walk::default();
        let children = root_id
            .source_objects(doc)
            .filter(|obj| obj.label().is_none())
            .filter_map(|obj| obj.object_handle())
            .filter_map(|obj| match obj.get_typed() {
                TypedObjectHandle::Model(model) => Some(model),
                _ => None,
            })
            .map(|model| self.convert_model(&model, &mut walk))
            .collect::<Result<_>>()?;
        let root = Node {
            children,
            ..Node::new(ROOT_NODE_NAME)
        };
        debug!(
            "Scene has {} nodes, {} meshes",
            root.node_count(),
            root.mesh_count()
        );
        Ok(root)
    }

    /// Converts the `Model` object `id` and its subtree.
    pub fn convert(&self, doc: &Document, id: i64) -> Result<Node> {
        let object = doc.object_by_id(id).ok_or(FbxError::ObjectNotFound(id))?;
        match object.get_typed() {
            TypedObjectHandle::Model(model) => self.convert_model(&model, &mut Walk::default()),
            _ => Err(FbxError::MalformedObject {
                object: id,
                reason: format!("expected a Model, found {}", object.class()),
            }),
        }
    }

    /// A model connected under several parents is converted once per parent,
    /// so chains of shared models grow exponentially. The traversal stops with
    /// [`FbxError::TooManyNodes`] past [`ConvertOptions::node_limit`] models.
    fn convert_model(&self, model: &ModelHandle<'_>, walk: &mut Walk) -> Result<Node> {
        let id = model.object_id().raw();
        if !walk.ancestors.insert(id) {
            return Err(FbxError::ConnectionCycle(id));
        }
        walk.nodes += 1;
        if walk.nodes > self.node_limit {
            return Err(FbxError::TooManyNodes {
                limit: self.node_limit,
            });
        }
        let name = model.display_name();
        trace!("converting model {id} `{name}`");

        let vec3 = |prop: &str, default: DVec3| -> Result<_> {
            Ok(model.get_dvec3(prop)?.unwrap_or(default).as_vec3())
        };
        let mesh = match mesh_geometry(model) {
            Some(geometry) => Some(self.meshes.convert(&geometry)?),
            None => None,
        };
        let children = model
            .child_models()
            .map(|child| self.convert_model(&child, walk))
            .collect::<Result<_>>()?;

        let node = Node {
            name: name.to_owned(),
            position: vec3("Lcl Translation", DVec3::ZERO)?,
            rotation: vec3("Lcl Rotation", DVec3::ZERO)?,
            scale: vec3("Lcl Scaling", DVec3::ONE)?,
            children,
            mesh,
        };
        walk.ancestors.remove(&id);
        Ok(node)
    }
}

/// First mesh geometry connected to the model.
fn mesh_geometry<'a>(model: &ObjectHandle<'a>) -> Option<MeshHandle<'a>> {
    model
        .source_objects()
        .filter(|obj| obj.label().is_none())
        .filter_map(|obj| obj.object_handle())
        .find_map(|obj| match obj.get_typed() {
            TypedObjectHandle::Geometry(TypedGeometryHandle::Mesh(mesh)) => Some(mesh),
            _ => None,
        })
}
