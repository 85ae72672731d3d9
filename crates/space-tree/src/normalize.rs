//! Mapping bounded models into the `[-1, 1]` cube.

use nalgebra::{Point3, Vector3};

use crate::{BoundedSolidTree, NormalField, SpaceTree, VectorExt};

/// A translate-then-scale transform that centers a bounding box on the
/// origin and fits its longest side to length 2.
///
/// Models and their normal fields must go through the same normalization so
/// hit points and normal lookups share a coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    scale: f64,
    translate: Vector3<f64>,
}

impl Normalization {
    /// Derives the normalization for the box `[min, max]`.
    ///
    /// Returns `None` when the box has no extent on any axis, or its extent
    /// is not finite.
    pub fn from_bounds(min: &Point3<f64>, max: &Point3<f64>) -> Option<Self> {
        let extent = (max - min).abs_max();
        if !extent.is_finite() || extent <= 0.0 {
            return None;
        }
        Some(Self {
            scale: 2.0 / extent,
            translate: -min.coords.mid(&max.coords),
        })
    }

    /// Derives the normalization for a bounded tree's box.
    pub fn for_tree(tree: &BoundedSolidTree) -> Option<Self> {
        Self::from_bounds(tree.min(), tree.max())
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn translate(&self) -> &Vector3<f64> {
        &self.translate
    }

    /// Maps a point from model space into normalized space.
    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from((point.coords + self.translate) * self.scale)
    }

    pub fn apply_tree<T>(&self, tree: &SpaceTree<T>) -> SpaceTree<T> {
        tree.translate(&self.translate).scale(self.scale)
    }

    pub fn apply_bounded(&self, tree: &BoundedSolidTree) -> BoundedSolidTree {
        tree.translate(&self.translate).scale(self.scale)
    }

    pub fn apply_field(&self, field: &NormalField) -> NormalField {
        field.translate(&self.translate).scale(self.scale)
    }
}
