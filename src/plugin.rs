//! Bevy asset loader for converted FBX scenes.

use anyhow::Context;
use bevy_app::{App, Plugin};
use bevy_asset::{AddAsset, AssetLoader, BoxedFuture, Handle, LoadContext, LoadedAsset};
use bevy_reflect::TypeUuid;
use bevy_render::mesh::{Mesh as BevyMesh, PrimitiveTopology, VertexAttributeValues};
use bevy_utils::HashMap;
use tracing::debug;

use crate::{
    data::{mesh::Mesh, scene::FbxScene},
    loader::{ConvertOptions, FbxSceneLoader},
};

/// The converted scene, with a handle to each labeled mesh asset.
#[derive(Debug, Clone, TypeUuid)]
#[uuid = "e87d49b6-8d6a-43c7-bb33-5315db8516eb"]
pub struct FbxSceneAsset {
    pub scene: FbxScene,
    /// Mesh handles by asset label (`FbxMesh@<node name>`).
    pub meshes: HashMap<String, Handle<BevyMesh>>,
}

pub struct FbxPlugin;

impl Plugin for FbxPlugin {
    fn build(&self, app: &mut App) {
        app.add_asset::<FbxSceneAsset>()
            .init_asset_loader::<FbxAssetLoader>();
    }
}

#[derive(Debug, Default)]
pub struct FbxAssetLoader {
    loader: FbxSceneLoader,
}

impl FbxAssetLoader {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            loader: FbxSceneLoader::new(options),
        }
    }
}

impl AssetLoader for FbxAssetLoader {
    fn load<'a>(
        &'a self,
        bytes: &'a [u8],
        load_context: &'a mut LoadContext,
    ) -> BoxedFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let scene = self
                .loader
                .load_bytes(bytes)
                .with_context(|| format!("failed to load {:?}", load_context.path()))?;

            let mut meshes = HashMap::default();
            for node in scene.root.iter() {
                let mesh = match &node.mesh {
                    Some(mesh) => mesh,
                    None => continue,
                };
                let label = unique_label(&meshes, &node.name);
                debug!("Adding mesh asset {label}");
                let handle =
                    load_context.set_labeled_asset(&label, LoadedAsset::new(to_bevy_mesh(mesh)));
                meshes.insert(label, handle);
            }

            load_context.set_default_asset(LoadedAsset::new(FbxSceneAsset { scene, meshes }));
            Ok(())
        })
    }

    fn extensions(&self) -> &[&str] {
        &["fbx"]
    }
}

/// `FbxMesh@<name>`, with the first free `.<n>` suffix if taken.
fn unique_label<V>(taken: &HashMap<String, V>, name: &str) -> String {
    let label = format!("FbxMesh@{name}");
    if !taken.contains_key(&label) {
        return label;
    }
    (1..)
        .map(|n| format!("{label}.{n}"))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or(label)
}

/// Builds a non-indexed triangle list.
///
/// FBX UVs have their origin at the bottom left, bevy's at the top left.
pub fn to_bevy_mesh(mesh: &Mesh) -> BevyMesh {
    let mut bevy_mesh = BevyMesh::new(PrimitiveTopology::TriangleList);
    let positions: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.to_array()).collect();
    bevy_mesh.insert_attribute(BevyMesh::ATTRIBUTE_POSITION, positions);
    if mesh.has_normals() {
        let normals: Vec<[f32; 3]> = mesh.normals.iter().map(|v| v.to_array()).collect();
        bevy_mesh.insert_attribute(BevyMesh::ATTRIBUTE_NORMAL, normals);
    }
    if mesh.has_uvs() {
        let uvs: Vec<[f32; 2]> = mesh.uvs.iter().map(|uv| [uv.x, 1.0 - uv.y]).collect();
        bevy_mesh.insert_attribute(BevyMesh::ATTRIBUTE_UV_0, uvs);
    }
    if mesh.has_tangents() {
        let tangents: Vec<[f32; 4]> = mesh
            .tangents
            .iter()
            .map(|t| t.extend(1.0).to_array())
            .collect();
        bevy_mesh.insert_attribute(BevyMesh::ATTRIBUTE_TANGENT, tangents);
    }
    bevy_mesh
}
