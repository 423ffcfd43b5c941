//! Per-vertex layer elements (normals, tangents, UVs).
//!
//! A layer element stores a direct array of values, and optionally an index
//! array into it. Its mapping mode says what the element is keyed by
//! (control point, polygon vertex, ...), its reference mode says whether the
//! key addresses the direct array or the index array.

use std::{borrow::Cow, str::FromStr};

use fbxcel_dom::{
    fbxcel::{low::v7400::AttributeValue, tree::v7400::NodeHandle},
    v7400::object::geometry::MeshHandle,
};
use glam::{Vec2, Vec3};
use tracing::warn;

use crate::{
    error::{FbxError, Result},
    utils::fbx_extend::{attribute_i64, NodeHandleExt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingMode {
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

impl FromStr for MappingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "" | "NoMappingInformation" => Ok(MappingMode::None),
            "ByVertice" | "ByVertex" | "ByControlPoint" => Ok(MappingMode::ByControlPoint),
            "ByPolygonVertex" => Ok(MappingMode::ByPolygonVertex),
            "ByPolygon" => Ok(MappingMode::ByPolygon),
            "ByEdge" => Ok(MappingMode::ByEdge),
            "AllSame" => Ok(MappingMode::AllSame),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
    Direct,
    IndexToDirect,
}

impl FromStr for ReferenceMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "Direct" => Ok(ReferenceMode::Direct),
            // "Index" is the pre-6.0 spelling of the same thing.
            "IndexToDirect" | "Index" => Ok(ReferenceMode::IndexToDirect),
            _ => Err(()),
        }
    }
}

/// Names of the nodes holding one kind of layer element.
#[derive(Debug, Clone, Copy)]
pub struct ElementKind {
    pub node: &'static str,
    pub data: &'static str,
    pub index: &'static str,
}

pub const NORMALS: ElementKind = ElementKind {
    node: "LayerElementNormal",
    data: "Normals",
    index: "NormalsIndex",
};
pub const TANGENTS: ElementKind = ElementKind {
    node: "LayerElementTangent",
    data: "Tangents",
    index: "TangentsIndex",
};
pub const UVS: ElementKind = ElementKind {
    node: "LayerElementUV",
    data: "UV",
    index: "UVIndex",
};

/// A value made of a fixed number of `f64` components in the direct array.
pub trait Component: Copy {
    const COMPONENTS: usize;

    fn from_components(c: &[f64]) -> Self;
}

impl Component for Vec3 {
    const COMPONENTS: usize = 3;

    fn from_components(c: &[f64]) -> Self {
        Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32)
    }
}

impl Component for Vec2 {
    const COMPONENTS: usize = 2;

    fn from_components(c: &[f64]) -> Self {
        Vec2::new(c[0] as f32, c[1] as f32)
    }
}

/// Where a polygon vertex sits in the mesh, every key a mapping mode may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub polygon: usize,
    pub polygon_vertex: usize,
    pub control_point: usize,
}

#[derive(Debug, Clone)]
pub struct LayerElement<T> {
    name: &'static str,
    mapping: MappingMode,
    reference: ReferenceMode,
    direct: Vec<T>,
    index: Vec<i32>,
}

impl<T: Component> LayerElement<T> {
    pub fn new(
        name: &'static str,
        mapping: MappingMode,
        reference: ReferenceMode,
        direct: Vec<T>,
        index: Vec<i32>,
    ) -> Self {
        Self {
            name,
            mapping,
            reference,
            direct,
            index,
        }
    }

    /// Reads the element of `kind` the mesh uses.
    ///
    /// The element named by the lowest-indexed `Layer` wins. Without a `Layer`
    /// entry for `kind`, the element with index 0 is used, else the first
    /// one. Returns `Ok(None)` if the geometry has no such element.
    pub fn from_mesh(mesh: &MeshHandle<'_>, kind: &ElementKind) -> Result<Option<Self>> {
        let geometry = mesh.node();
        let with_index = |index: i64| {
            geometry
                .children_by_name(kind.node)
                .find(|node| node.attributes().first().and_then(attribute_i64) == Some(index))
        };
        let node = layered_index(mesh, kind)
            .and_then(with_index)
            .or_else(|| with_index(0))
            .or_else(|| geometry.first_child_by_name(kind.node));
        node.map(|node| Self::from_node(node, kind)).transpose()
    }

    fn from_node(node: NodeHandle<'_>, kind: &ElementKind) -> Result<Self> {
        let name = kind.node;
        let unknown = |field: &'static str, value: &str| FbxError::UnknownMode {
            element: name,
            field,
            value: value.to_owned(),
        };

        let mapping = match mode_string(node, name, "MappingInformationType")? {
            Some(s) => s
                .parse::<MappingMode>()
                .map_err(|()| unknown("MappingInformationType", s))?,
            None => {
                return Err(FbxError::MissingLayerData {
                    element: name,
                    field: "MappingInformationType",
                })
            }
        };
        let reference = match mode_string(node, name, "ReferenceInformationType")? {
            Some(s) => s
                .parse::<ReferenceMode>()
                .map_err(|()| unknown("ReferenceInformationType", s))?,
            None => ReferenceMode::Direct,
        };

        let raw = node
            .child_attribute(kind.data)
            .and_then(f64_array)
            .ok_or(FbxError::MissingLayerData {
                element: name,
                field: kind.data,
            })?;
        let chunks = raw.chunks_exact(T::COMPONENTS);
        if !chunks.remainder().is_empty() {
            warn!(
                "{name}: `{}` has {} trailing values, ignoring them",
                kind.data,
                chunks.remainder().len()
            );
        }
        let direct: Vec<T> = chunks.map(T::from_components).collect();

        let index = match reference {
            ReferenceMode::Direct => Vec::new(),
            ReferenceMode::IndexToDirect => {
                let attr = node
                    .child_attribute(kind.index)
                    .ok_or(FbxError::MissingLayerData {
                        element: name,
                        field: kind.index,
                    })?;
                index_array(attr, name, direct.len())?.ok_or(FbxError::MissingLayerData {
                    element: name,
                    field: kind.index,
                })?
            }
        };

        Ok(Self::new(name, mapping, reference, direct, index))
    }

    pub fn mapping(&self) -> MappingMode {
        self.mapping
    }

    pub fn reference(&self) -> ReferenceMode {
        self.reference
    }

    /// The value this element holds for the given polygon vertex.
    pub fn resolve(&self, vertex: VertexRef) -> Result<T> {
        let key = match self.mapping {
            MappingMode::ByControlPoint => vertex.control_point,
            MappingMode::ByPolygonVertex => vertex.polygon_vertex,
            MappingMode::ByPolygon => vertex.polygon,
            MappingMode::AllSame | MappingMode::None => 0,
            MappingMode::ByEdge => {
                return Err(FbxError::UnsupportedMapping {
                    element: self.name,
                    mode: self.mapping,
                })
            }
        };
        let direct_index = match self.reference {
            ReferenceMode::Direct => key,
            ReferenceMode::IndexToDirect => {
                let out_of_range = |index: i64| FbxError::IndexOutOfRange {
                    element: self.name,
                    array: "index",
                    index,
                    len: self.index.len(),
                };
                let i = *self.index.get(key).ok_or_else(|| out_of_range(key as i64))?;
                usize::try_from(i).map_err(|_| out_of_range(i.into()))?
            }
        };
        self.direct
            .get(direct_index)
            .copied()
            .ok_or(FbxError::IndexOutOfRange {
                element: self.name,
                array: "direct",
                index: direct_index as i64,
                len: self.direct.len(),
            })
    }
}

/// Typed index of the `kind` element listed by the lowest-indexed layer.
fn layered_index(mesh: &MeshHandle<'_>, kind: &ElementKind) -> Option<i64> {
    let mut layers: Vec<_> = mesh
        .layers()
        .filter_map(|layer| Some((layer.get_index().ok()?.to_u32(), layer)))
        .collect();
    layers.sort_by_key(|(index, _)| *index);
    layers
        .iter()
        .flat_map(|(_, layer)| layer.layer_element_entries())
        .find(|entry| entry.type_str().ok() == Some(kind.node))
        .and_then(|entry| entry.typed_index().ok())
        .map(|index| index.to_u32().into())
}

fn mode_string<'a>(
    node: NodeHandle<'a>,
    element: &'static str,
    field: &'static str,
) -> Result<Option<&'a str>> {
    match node.child_attribute(field) {
        None => Ok(None),
        Some(attr) => attr
            .get_string()
            .map(Some)
            .ok_or(FbxError::MissingLayerData { element, field }),
    }
}

/// Floating point array, borrowed when already stored as `f64`.
fn f64_array(attr: &AttributeValue) -> Option<Cow<'_, [f64]>> {
    match attr {
        AttributeValue::ArrF64(v) => Some(Cow::Borrowed(v.as_slice())),
        AttributeValue::ArrF32(v) => Some(Cow::Owned(v.iter().map(|&f| f.into()).collect())),
        _ => None,
    }
}

/// Index array, stored as `i32` or `i64`.
///
/// `Ok(None)` if `attr` is not an integer array. An `i64` entry that does not
/// fit an `i32` can address nothing and is reported as out of range.
fn index_array(
    attr: &AttributeValue,
    element: &'static str,
    len: usize,
) -> Result<Option<Vec<i32>>> {
    match attr {
        AttributeValue::ArrI32(v) => Ok(Some(v.clone())),
        AttributeValue::ArrI64(v) => v
            .iter()
            .map(|&i| {
                i32::try_from(i).map_err(|_| FbxError::IndexOutOfRange {
                    element,
                    array: "index",
                    index: i,
                    len,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        _ => Ok(None),
    }
}
