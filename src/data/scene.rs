//! Scene.

use super::node::Node;

/// Axis conventions and units from the `GlobalSettings` section.
///
/// Axes are `0 = X`, `1 = Y`, `2 = Z`; signs are `1` or `-1`.
/// The converter does not apply any of these, they are handed through so the
/// consumer can.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSettings {
    pub up_axis: i64,
    pub up_axis_sign: i64,
    pub front_axis: i64,
    pub front_axis_sign: i64,
    pub coord_axis: i64,
    pub coord_axis_sign: i64,
    /// Centimeters per file unit.
    pub unit_scale_factor: f64,
    pub original_unit_scale_factor: f64,
}

impl Default for GlobalSettings {
    /// Y-up, right handed, centimeters.
    fn default() -> Self {
        Self {
            up_axis: 1,
            up_axis_sign: 1,
            front_axis: 2,
            front_axis_sign: 1,
            coord_axis: 0,
            coord_axis_sign: 1,
            unit_scale_factor: 1.0,
            original_unit_scale_factor: 1.0,
        }
    }
}

/// A converted FBX file.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxScene {
    /// Raw FBX version, e.g. `7400`.
    pub version: u32,
    pub settings: GlobalSettings,
    pub root: Node,
}
