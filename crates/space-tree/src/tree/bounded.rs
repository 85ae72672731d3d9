//! Boolean space trees clipped to an axis-aligned box.

use nalgebra::{Point3, Vector3};

use crate::Split;

use super::SpaceTree;

/// A solid described by a boolean [`SpaceTree`] and an axis-aligned box.
///
/// The inner tree is wrapped in six extra branches, one per box face, each
/// with an empty leaf on the outside. For every axis the minimum face is
/// wrapped first and the maximum face second, so the outermost branch is
/// the maximum-z face. Every point outside `[min, max]` on any axis
/// classifies as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSolidTree {
    min: Point3<f64>,
    max: Point3<f64>,
    inner: SpaceTree<bool>,
    tree: SpaceTree<bool>,
}

impl BoundedSolidTree {
    /// Wraps `inner` with the bounding branches for `[min, max]`.
    pub fn new(min: Point3<f64>, max: Point3<f64>, inner: SpaceTree<bool>) -> Self {
        let empty = SpaceTree::leaf(false);
        let mut tree = inner.clone();
        for axis in 0..3 {
            tree = SpaceTree::branch(Split::axis_aligned(axis, min[axis]), empty.clone(), tree);
            tree = SpaceTree::branch(Split::axis_aligned(axis, max[axis]), tree, empty.clone());
        }
        Self {
            min,
            max,
            inner,
            tree,
        }
    }

    /// Returns the lower corner of the box.
    #[inline]
    pub fn min(&self) -> &Point3<f64> {
        &self.min
    }

    /// Returns the upper corner of the box.
    #[inline]
    pub fn max(&self) -> &Point3<f64> {
        &self.max
    }

    /// Returns the tree without its bounding branches.
    #[inline]
    pub fn inner(&self) -> &SpaceTree<bool> {
        &self.inner
    }

    /// Returns the full tree including the bounding branches.
    #[inline]
    pub fn tree(&self) -> &SpaceTree<bool> {
        &self.tree
    }

    /// Returns the box extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Classifies a point against the bounded solid.
    #[inline]
    pub fn predict(&self, point: &Point3<f64>) -> bool {
        *self.tree.predict(point)
    }

    /// Scales the solid and its box by `s` (positive) about the origin.
    pub fn scale(&self, s: f64) -> Self {
        Self::new(
            Point3::from(self.min.coords * s),
            Point3::from(self.max.coords * s),
            self.inner.scale(s),
        )
    }

    /// Moves the solid and its box by `offset`.
    pub fn translate(&self, offset: &Vector3<f64>) -> Self {
        Self::new(self.min + *offset, self.max + *offset, self.inner.translate(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Side, SpaceNode};

    fn unit_box(inner: SpaceTree<bool>) -> BoundedSolidTree {
        BoundedSolidTree::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0), inner)
    }

    #[test]
    fn wrapping_order_puts_max_z_outermost() {
        let bounded = unit_box(SpaceTree::leaf(true));
        let root = bounded.tree().root();
        let split = root.split().unwrap();
        assert_eq!(split.axis(), &Vector3::z());
        assert_eq!(split.threshold(), 1.0);
        assert!(matches!(root.child(Side::Right).unwrap().as_ref(), SpaceNode::Leaf(false)));

        let next = root.child(Side::Left).unwrap();
        let split = next.split().unwrap();
        assert_eq!(split.axis(), &Vector3::z());
        assert_eq!(split.threshold(), -1.0);
        assert!(matches!(next.child(Side::Left).unwrap().as_ref(), SpaceNode::Leaf(false)));

        assert_eq!(bounded.tree().depth(), 7);
        assert_eq!(bounded.inner().depth(), 1);
    }

    #[test]
    fn inside_and_outside() {
        let bounded = unit_box(SpaceTree::leaf(true));
        assert!(bounded.predict(&Point3::new(0.0, 0.0, 0.0)));
        assert!(bounded.predict(&Point3::new(-1.0, -1.0, -1.0)));
        assert!(bounded.predict(&Point3::new(0.99, -0.99, 0.5)));
        // The maximum faces are exclusive.
        assert!(!bounded.predict(&Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn outside_on_any_single_axis_is_empty() {
        let bounded = BoundedSolidTree::new(
            Point3::new(-0.5, 0.0, 2.0),
            Point3::new(1.5, 0.25, 3.0),
            SpaceTree::leaf(true),
        );
        let inside = Point3::new(0.5, 0.125, 2.5);
        assert!(bounded.predict(&inside));
        for axis in 0..3 {
            for delta in [-10.0, -1.01, 1.01, 10.0] {
                let mut p = inside;
                p[axis] = if delta < 0.0 {
                    bounded.min()[axis] + delta * 0.01
                } else {
                    bounded.max()[axis] + delta * 0.01
                };
                assert!(!bounded.predict(&p), "axis {axis}, point {p}");
            }
        }
    }

    #[test]
    fn transforms_move_the_box() {
        let bounded = unit_box(SpaceTree::leaf(true));
        let moved = bounded.translate(&Vector3::new(2.0, 0.0, 0.0)).scale(0.5);
        assert_eq!(moved.min(), &Point3::new(0.5, -0.5, -0.5));
        assert_eq!(moved.max(), &Point3::new(1.5, 0.5, 0.5));
        assert!(moved.predict(&Point3::new(1.0, 0.0, 0.0)));
        assert!(!moved.predict(&Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(moved.size(), Vector3::new(1.0, 1.0, 1.0));
    }
}
