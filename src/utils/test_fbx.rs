//! Binary FBX files assembled in memory, for tests.
//!
//! Shared with the integration tests through `#[path]`, so it only names
//! external crates.
#![allow(dead_code)]

use std::io::Cursor;

use fbxcel::{
    low::{v7400::AttributeValue, FbxVersion},
    tree::v7400::{NodeId, Tree},
    writer::v7400::binary::{FbxFooter, Writer},
};
use fbxcel_dom::{any::AnyDocument, v7400::Document};

/// Object id of the `Document` entry every file carries.
const DOCUMENT_ID: i64 = 1_000_000_000;

pub fn string(s: &str) -> AttributeValue {
    AttributeValue::String(s.to_owned())
}

/// A file with `GlobalSettings`, one scene `Document` rooted at object `0`,
/// and empty `Objects` and `Connections` sections to fill in.
pub struct FbxFile {
    tree: Tree,
    settings: NodeId,
    objects: NodeId,
    connections: NodeId,
}

impl Default for FbxFile {
    fn default() -> Self {
        Self::new()
    }
}

impl FbxFile {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let root = tree.root().node_id();

        let settings = tree.append_new(root, "GlobalSettings");
        let version = tree.append_new(settings, "Version");
        tree.append_attribute(version, 1000i32);

        let documents = tree.append_new(root, "Documents");
        let document = tree.append_new(documents, "Document");
        tree.append_attribute(document, DOCUMENT_ID);
        tree.append_attribute(document, string("Scene\u{0}\u{1}SceneInfo"));
        tree.append_attribute(document, string("Scene"));
        let root_node = tree.append_new(document, "RootNode");
        tree.append_attribute(root_node, 0i64);

        let objects = tree.append_new(root, "Objects");
        let connections = tree.append_new(root, "Connections");
        Self {
            tree,
            settings,
            objects,
            connections,
        }
    }

    /// A node with the given attributes below `parent`.
    pub fn child(&mut self, parent: NodeId, name: &str, attrs: Vec<AttributeValue>) -> NodeId {
        let node = self.tree.append_new(parent, name);
        for attr in attrs {
            self.tree.append_attribute(node, attr);
        }
        node
    }

    pub fn object(&mut self, class: &str, id: i64, name: &str, subclass: &str) -> NodeId {
        let objects = self.objects;
        self.child(
            objects,
            class,
            vec![
                id.into(),
                string(&format!("{name}\u{0}\u{1}{class}")),
                string(subclass),
            ],
        )
    }

    pub fn model(&mut self, id: i64, name: &str) -> NodeId {
        self.object("Model", id, name, "Null")
    }

    /// A `Geometry` mesh with the given control points and polygons.
    pub fn mesh(&mut self, id: i64, vertices: Vec<f64>, polygon_vertex_index: Vec<i32>) -> NodeId {
        let geometry = self.object("Geometry", id, "", "Mesh");
        self.child(geometry, "Vertices", vec![vertices.into()]);
        self.child(geometry, "PolygonVertexIndex", vec![polygon_vertex_index.into()]);
        geometry
    }

    /// A `LayerElement*` node, without its arrays.
    pub fn layer_element(
        &mut self,
        geometry: NodeId,
        kind: &str,
        index: i32,
        mapping: &str,
        reference: &str,
    ) -> NodeId {
        let element = self.child(geometry, kind, vec![index.into()]);
        self.child(element, "Version", vec![101i32.into()]);
        self.child(element, "MappingInformationType", vec![string(mapping)]);
        self.child(element, "ReferenceInformationType", vec![string(reference)]);
        element
    }

    /// A `Layer` listing `(type, typed index)` entries.
    pub fn layer(&mut self, geometry: NodeId, index: i32, entries: &[(&str, i32)]) -> NodeId {
        let layer = self.child(geometry, "Layer", vec![index.into()]);
        for &(ty, typed_index) in entries {
            let entry = self.child(layer, "LayerElement", vec![]);
            self.child(entry, "Type", vec![string(ty)]);
            self.child(entry, "TypedIndex", vec![typed_index.into()]);
        }
        layer
    }

    /// Adds a `P` entry to the `Properties70` of `node`.
    pub fn property(&mut self, node: NodeId, name: &str, values: Vec<AttributeValue>) {
        self.typed_property(node, name, name, values);
    }

    pub fn settings(&mut self, name: &str, ty: &str, values: Vec<AttributeValue>) {
        let settings = self.settings;
        self.typed_property(settings, name, ty, values);
    }

    fn typed_property(&mut self, node: NodeId, name: &str, ty: &str, values: Vec<AttributeValue>) {
        let existing = node
            .to_handle(&self.tree)
            .first_child_by_name("Properties70")
            .map(|props| props.node_id());
        let props = match existing {
            Some(props) => props,
            None => self.tree.append_new(node, "Properties70"),
        };
        let mut attrs = vec![string(name), string(ty), string(""), string("A")];
        attrs.extend(values);
        self.child(props, "P", attrs);
    }

    /// Object-object link, `child` below `parent`.
    pub fn connect(&mut self, child: i64, parent: i64) {
        let connections = self.connections;
        self.child(
            connections,
            "C",
            vec![string("OO"), child.into(), parent.into()],
        );
    }

    /// Object-property link, as materials and animation curves use.
    pub fn connect_property(&mut self, child: i64, parent: i64, property: &str) {
        let connections = self.connections;
        self.child(
            connections,
            "C",
            vec![string("OP"), child.into(), parent.into(), string(property)],
        );
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_as(FbxVersion::V7_4)
    }

    /// The binary file, with the given version in its header.
    pub fn to_bytes_as(&self, version: FbxVersion) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut writer = Writer::new(Cursor::new(&mut bytes), version)
            .expect("failed to start the FBX writer");
        writer
            .write_tree(&self.tree)
            .expect("failed to write the FBX tree");
        writer
            .finalize_and_flush(&FbxFooter::default())
            .expect("failed to finalize the FBX file");
        bytes
    }

    pub fn document(&self) -> Document {
        let doc = AnyDocument::from_seekable_reader(Cursor::new(self.to_bytes()))
            .expect("failed to parse the written FBX file");
        match doc {
            AnyDocument::V7400(_, doc) => *doc,
            _ => panic!("written FBX file is not a 7.4 document"),
        }
    }
}
