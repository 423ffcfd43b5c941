//! Scene loading: file → FBX document → converted node tree.

use std::{
    fs::File,
    io::{BufReader, Cursor, Read, Seek},
    path::Path,
};

use fbxcel_dom::{
    any::{self, AnyDocument},
    v7400::Document,
};
use tracing::{debug, info};

use crate::{
    data::{node::Node, scene::FbxScene},
    error::{FbxError, Result},
    node::NodeConverter,
    utils::fbx_extend::DocumentExt,
};

/// Default for [`ConvertOptions::node_limit`].
pub const DEFAULT_NODE_LIMIT: usize = 1_000_000;

/// Conversion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Split quads and n-gons into triangles instead of rejecting the mesh.
    pub triangulate: bool,
    /// Most models a scene may expand to, counting each instance of a shared model.
    pub node_limit: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            triangulate: false,
            node_limit: DEFAULT_NODE_LIMIT,
        }
    }
}

impl ConvertOptions {
    pub fn triangulate(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }

    pub fn node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = node_limit;
        self
    }
}

/// Something that turns a scene file into a node tree.
pub trait LoadScene {
    fn load(&self, path: &Path) -> Result<Node>;
}

/// Loads FBX 7.x binary files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FbxSceneLoader {
    options: ConvertOptions,
}

impl LoadScene for FbxSceneLoader {
    fn load(&self, path: &Path) -> Result<Node> {
        self.load_scene(path).map(|scene| scene.root)
    }
}

impl FbxSceneLoader {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    pub fn load_scene(&self, path: impl AsRef<Path>) -> Result<FbxScene> {
        let path = path.as_ref();
        info!("Started loading scene {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let scene = self.load_reader(reader)?;
        info!(
            "Successfully loaded scene {}: {} nodes, {} meshes",
            path.display(),
            scene.root.node_count(),
            scene.root.mesh_count()
        );
        Ok(scene)
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> Result<FbxScene> {
        self.load_reader(Cursor::new(bytes))
    }

    pub fn load_reader<R: Read + Seek>(&self, reader: R) -> Result<FbxScene> {
        let doc = AnyDocument::from_seekable_reader(reader).map_err(|err| match err {
            any::Error::UnsupportedVersion(_) => FbxError::UnsupportedVersion,
            err => FbxError::InvalidFile(err.to_string()),
        })?;
        if let AnyDocument::V7400(ver, doc) = doc {
            let (major, minor) = ver.major_minor();
            let version = major * 1000 + minor * 100;
            debug!("FBX version {major}.{minor}");
            self.convert_document(version, &doc)
        } else {
            Err(FbxError::UnsupportedVersion)
        }
    }

    /// Converts an already parsed document.
    ///
    /// `version` is stored as is in [`FbxScene::version`], `7400` for 7.4.
    pub fn convert_document(&self, version: u32, doc: &Document) -> Result<FbxScene> {
        let root = NodeConverter::new(self.options).convert_root(doc)?;
        Ok(FbxScene {
            version,
            settings: doc.global_settings(),
            root,
        })
    }
}
