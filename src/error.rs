//! Conversion errors.

use thiserror::Error;

use crate::layer::MappingMode;

pub type Result<T, E = FbxError> = std::result::Result<T, E>;

/// Failure while reading or converting an FBX scene.
#[derive(Debug, Error)]
pub enum FbxError {
    #[error("failed to read FBX file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid FBX file: {0}")]
    InvalidFile(String),
    #[error("unsupported FBX document version")]
    UnsupportedVersion,
    #[error("object {object} is malformed: {reason}")]
    MalformedObject { object: i64, reason: String },
    #[error("object {0} not found")]
    ObjectNotFound(i64),
    #[error("object {0} is connected to itself through its children")]
    ConnectionCycle(i64),
    #[error("scene expands to more than {limit} nodes")]
    TooManyNodes { limit: usize },

    #[error("mesh {mesh} is not triangulated: polygon {polygon} has {size} vertices")]
    NotTriangulated {
        mesh: i64,
        polygon: usize,
        size: usize,
    },
    #[error("mesh {mesh}: polygon {polygon} with {size} vertices cannot be triangulated: {reason}")]
    Triangulation {
        mesh: i64,
        polygon: usize,
        size: usize,
        reason: String,
    },
    #[error("mesh {mesh}: last polygon is not terminated by a negative index")]
    UnterminatedPolygon { mesh: i64 },
    #[error("mesh {mesh}: control point {index} out of range ({count} control points)")]
    MissingControlPoint {
        mesh: i64,
        index: usize,
        count: usize,
    },

    #[error("layer element `{element}`: mapping mode {mode:?} is not supported")]
    UnsupportedMapping {
        element: &'static str,
        mode: MappingMode,
    },
    #[error("layer element `{element}`: unknown {field} `{value}`")]
    UnknownMode {
        element: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("layer element `{element}`: {array} index {index} out of range (len {len})")]
    IndexOutOfRange {
        element: &'static str,
        array: &'static str,
        index: i64,
        len: usize,
    },
    #[error("layer element `{element}` is missing `{field}`")]
    MissingLayerData {
        element: &'static str,
        field: &'static str,
    },
}
