//! Bounding box.

use glam::Vec3;
use std::iter::FromIterator;

/// 3D bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3d {
    /// Minimum.
    min: Vec3,
    /// Maximum.
    max: Vec3,
}

impl BoundingBox3d {
    /// Returns minimum xyz.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns maximum xyz.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Returns the size of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extends the bounding box to contain the given point.
    pub fn insert(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Merges the bounding boxes.
    pub fn union(&self, o: &BoundingBox3d) -> Self {
        Self {
            min: self.min.min(o.min),
            max: self.max.max(o.max),
        }
    }
}

impl From<Vec3> for BoundingBox3d {
    fn from(p: Vec3) -> Self {
        Self { min: p, max: p }
    }
}

/// 3D bounding box, which can be empty.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OptionalBoundingBox3d {
    bbox: Option<BoundingBox3d>,
}

impl OptionalBoundingBox3d {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bounding box, `None` if nothing was inserted.
    pub fn bounding_box(&self) -> Option<BoundingBox3d> {
        self.bbox
    }

    pub fn is_empty(&self) -> bool {
        self.bbox.is_none()
    }

    /// Extends the bounding box to contain the given point.
    pub fn insert(&self, p: Vec3) -> Self {
        self.bbox
            .map_or_else(|| p.into(), |bbox| bbox.insert(p))
            .into()
    }

    /// Merges the bounding boxes.
    pub fn union(&self, o: &OptionalBoundingBox3d) -> Self {
        match (&self.bbox, &o.bbox) {
            (Some(b), Some(o)) => b.union(o).into(),
            (Some(v), None) | (None, Some(v)) => (*v).into(),
            (None, None) => Self::new(),
        }
    }
}

impl From<BoundingBox3d> for OptionalBoundingBox3d {
    fn from(bbox: BoundingBox3d) -> Self {
        Self { bbox: Some(bbox) }
    }
}

impl FromIterator<Vec3> for OptionalBoundingBox3d {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Vec3>,
    {
        iter.into_iter().fold(Self::new(), |bbox, p| bbox.insert(p))
    }
}

impl<'a> FromIterator<&'a Vec3> for OptionalBoundingBox3d {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = &'a Vec3>,
    {
        iter.into_iter().copied().collect()
    }
}

impl FromIterator<OptionalBoundingBox3d> for OptionalBoundingBox3d {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = OptionalBoundingBox3d>,
    {
        iter.into_iter().fold(Self::new(), |bbox, o| bbox.union(&o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_points() {
        let points = [Vec3::new(1.0, -2.0, 0.5), Vec3::new(-1.0, 4.0, 0.0)];
        let bbox = points.iter().collect::<OptionalBoundingBox3d>();
        let bbox = bbox.bounding_box().unwrap();
        assert_eq!(bbox.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max(), Vec3::new(1.0, 4.0, 0.5));
        assert_eq!(bbox.size(), Vec3::new(2.0, 6.0, 0.5));
        assert_eq!(bbox.center(), Vec3::new(0.0, 1.0, 0.25));
    }

    #[test]
    fn empty_is_identity_for_union() {
        let empty = OptionalBoundingBox3d::new();
        let unit: OptionalBoundingBox3d = [Vec3::ZERO, Vec3::ONE].into_iter().collect();
        assert!(empty.is_empty());
        assert_eq!(empty.union(&unit), unit);
        assert_eq!(unit.union(&empty), unit);
        assert_eq!(
            [empty, unit, empty].into_iter().collect::<OptionalBoundingBox3d>(),
            unit
        );
    }
}
