//! Converts Autodesk Filmbox (`*.fbx`) scenes into a plain node tree with
//! triangle meshes.
//!
//! ```no_run
//! use fbx_import::{ConvertOptions, FbxSceneLoader};
//!
//! let loader = FbxSceneLoader::new(ConvertOptions::default().triangulate(true));
//! let scene = loader.load_scene("assets/cube.fbx")?;
//! for node in scene.root.iter() {
//!     println!("{} ({} meshes below)", node.name, node.mesh_count());
//! }
//! # Ok::<(), fbx_import::FbxError>(())
//! ```

pub mod data;
pub mod error;
pub mod layer;
pub mod loader;
pub mod mesh;
pub mod node;
pub mod utils;

#[cfg(feature = "bevy")]
pub mod plugin;

pub use data::{
    mesh::Mesh,
    node::Node,
    scene::{FbxScene, GlobalSettings},
};
pub use error::{FbxError, Result};
pub use layer::{LayerElement, MappingMode, ReferenceMode};
pub use loader::{ConvertOptions, FbxSceneLoader, LoadScene, DEFAULT_NODE_LIMIT};
pub use mesh::MeshConverter;
pub use node::{NodeConverter, ROOT_NODE_NAME};
pub use utils::{
    bbox::{BoundingBox3d, OptionalBoundingBox3d},
    fbx_extend::{DocumentExt, ObjectHandleExt},
};

#[cfg(feature = "bevy")]
pub use plugin::{FbxAssetLoader, FbxPlugin, FbxSceneAsset};
