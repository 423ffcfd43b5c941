//! Collection of extensions to the fbxcel_dom types, for the lookups its
//! public API does not offer yet.

use fbxcel_dom::{
    fbxcel::{low::v7400::AttributeValue, tree::v7400::NodeHandle},
    v7400::{
        object::{property::loaders::F64Arr3Loader, ObjectHandle, ObjectId},
        Document,
    },
};
use glam::DVec3;

use crate::{
    data::scene::GlobalSettings,
    error::{FbxError, Result},
};

/// Object id of the implicit scene root.
pub const ROOT_ID: i64 = 0;

/// Values of a `P` property node start after name, type, label and flags.
const PROPERTY_VALUE_OFFSET: usize = 4;

/// Integer value, widening smaller integer types.
pub fn attribute_i64(value: &AttributeValue) -> Option<i64> {
    match *value {
        AttributeValue::I16(v) => Some(v.into()),
        AttributeValue::I32(v) => Some(v.into()),
        AttributeValue::I64(v) => Some(v),
        _ => None,
    }
}

/// Numeric value of any scalar type, as `f64`.
pub fn attribute_f64(value: &AttributeValue) -> Option<f64> {
    match *value {
        AttributeValue::F32(v) => Some(v.into()),
        AttributeValue::F64(v) => Some(v),
        ref v => attribute_i64(v).map(|i| i as f64),
    }
}

pub trait NodeHandleExt<'a> {
    /// First attribute of the named child, a common FBX idiom
    /// (`MappingInformationType: "ByPolygonVertex"`).
    fn child_attribute(&self, name: &str) -> Option<&'a AttributeValue>;

    /// Value part of the `P` entry named `name` in this node's `Properties70`.
    fn property_values(&self, name: &str) -> Option<&'a [AttributeValue]>;
}

impl<'a> NodeHandleExt<'a> for NodeHandle<'a> {
    fn child_attribute(&self, name: &str) -> Option<&'a AttributeValue> {
        self.first_child_by_name(name)?.attributes().first()
    }

    fn property_values(&self, name: &str) -> Option<&'a [AttributeValue]> {
        self.first_child_by_name("Properties70")?
            .children_by_name("P")
            .find(|p| p.attributes().first().and_then(AttributeValue::get_string) == Some(name))
            .and_then(|p| p.attributes().get(PROPERTY_VALUE_OFFSET..))
    }
}

pub trait ObjectHandleExt<'a> {
    /// Object name. Falls back to the raw name attribute when it carries no
    /// `\0\x01Class` suffix.
    fn display_name(&self) -> &'a str;

    /// A three component `FbxNode` property, such as `Lcl Translation`.
    ///
    /// `Ok(None)` if neither the object nor its template defines it.
    fn get_dvec3(&self, name: &str) -> Result<Option<DVec3>>;
}

impl<'a> ObjectHandleExt<'a> for ObjectHandle<'a> {
    fn display_name(&self) -> &'a str {
        self.name()
            .or_else(|| self.node().attributes().get(1)?.get_string())
            .unwrap_or_default()
    }

    fn get_dvec3(&self, name: &str) -> Result<Option<DVec3>> {
        let props = self.properties_by_native_typename("FbxNode");
        let prop = match props.get_property(name) {
            Some(prop) => prop,
            None => return Ok(None),
        };
        prop.load_value(F64Arr3Loader::new())
            .map(|v| Some(DVec3::from(v)))
            .map_err(|err| FbxError::MalformedObject {
                object: self.object_id().raw(),
                reason: format!("`{name}`: {err}"),
            })
    }
}

pub trait DocumentExt {
    /// The object with the given raw id.
    fn object_by_id(&self, id: i64) -> Option<ObjectHandle<'_>>;

    /// Id of the object the top level models connect to.
    ///
    /// Read from the scene's `RootNode`, or found among the connections to
    /// [`ROOT_ID`] when the file has no usable `Document` entry.
    fn scene_root_id(&self) -> Option<ObjectId>;

    /// Axis and unit settings, with defaults for what the file leaves out.
    fn global_settings(&self) -> GlobalSettings;
}

impl DocumentExt for Document {
    fn object_by_id(&self, id: i64) -> Option<ObjectHandle<'_>> {
        self.objects().find(|obj| obj.object_id().raw() == id)
    }

    fn scene_root_id(&self) -> Option<ObjectId> {
        self.scenes()
            .find_map(|scene| scene.root_object_id().ok())
            .or_else(|| {
                self.objects()
                    .flat_map(|obj| obj.destination_objects())
                    .map(|dest| dest.object_id())
                    .find(|id| id.raw() == ROOT_ID)
            })
    }

    fn global_settings(&self) -> GlobalSettings {
        let defaults = GlobalSettings::default();
        let settings = match self.tree().root().first_child_by_name("GlobalSettings") {
            Some(node) => node,
            None => return defaults,
        };
        let value = |name: &str| settings.property_values(name)?.first();
        let int = |name: &str, default: i64| value(name).and_then(attribute_i64).unwrap_or(default);
        let float =
            |name: &str, default: f64| value(name).and_then(attribute_f64).unwrap_or(default);
        GlobalSettings {
            up_axis: int("UpAxis", defaults.up_axis),
            up_axis_sign: int("UpAxisSign", defaults.up_axis_sign),
            front_axis: int("FrontAxis", defaults.front_axis),
            front_axis_sign: int("FrontAxisSign", defaults.front_axis_sign),
            coord_axis: int("CoordAxis", defaults.coord_axis),
            coord_axis_sign: int("CoordAxisSign", defaults.coord_axis_sign),
            unit_scale_factor: float("UnitScaleFactor", defaults.unit_scale_factor),
            original_unit_scale_factor: float(
                "OriginalUnitScaleFactor",
                defaults.original_unit_scale_factor,
            ),
        }
    }
}
