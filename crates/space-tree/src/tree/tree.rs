//! Space tree handle and persistent transforms.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use crate::Split;

use super::node::{SpaceNode, map_splits};

/// A space tree classifying every point of 3D space.
///
/// The tree is an immutable, cheaply clonable handle to a root
/// [`SpaceNode`]. [`scale`](Self::scale) and [`translate`](Self::translate)
/// build new branch nodes but share all leaves with the original, since
/// leaf payloads carry no spatial information.
///
/// # Construction
///
/// Trees are normally decoded with the [`codec`](crate::codec) module, but
/// can be assembled directly:
///
/// ```
/// use nalgebra::Vector3;
/// use space_tree::{SpaceTree, Split};
///
/// let tree = SpaceTree::branch(
///     Split::new(Vector3::x(), 0.0),
///     SpaceTree::leaf(false),
///     SpaceTree::leaf(true),
/// );
/// assert_eq!(tree.num_leaves(), 2);
/// ```
#[derive(Debug, PartialEq)]
pub struct SpaceTree<T> {
    root: Arc<SpaceNode<T>>,
}

impl<T> Clone for SpaceTree<T> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
        }
    }
}

impl<T> From<Arc<SpaceNode<T>>> for SpaceTree<T> {
    fn from(root: Arc<SpaceNode<T>>) -> Self {
        Self { root }
    }
}

impl<T> SpaceTree<T> {
    /// Creates a single-leaf tree.
    pub fn leaf(value: T) -> Self {
        Self {
            root: Arc::new(SpaceNode::Leaf(value)),
        }
    }

    /// Creates a tree whose root splits space between two subtrees.
    pub fn branch(split: Split, left: SpaceTree<T>, right: SpaceTree<T>) -> Self {
        Self {
            root: Arc::new(SpaceNode::Branch {
                split,
                left: left.root,
                right: right.root,
            }),
        }
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> &SpaceNode<T> {
        &self.root
    }

    /// Returns the shared root handle.
    #[inline]
    pub fn root_arc(&self) -> &Arc<SpaceNode<T>> {
        &self.root
    }

    /// Classifies a point.
    #[inline]
    pub fn predict(&self, point: &Point3<f64>) -> &T {
        self.root.predict(point)
    }

    /// Returns the number of leaves in the tree.
    pub fn num_leaves(&self) -> usize {
        self.root.num_leaves()
    }

    /// Returns the maximum depth of the tree (1 for a single leaf).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Returns the tree describing the same shape with space scaled by `s`
    /// about the origin.
    ///
    /// `scaled.predict(p) == original.predict(p / s)`. `s` must be positive.
    pub fn scale(&self, s: f64) -> Self {
        Self {
            root: map_splits(&self.root, &|split: &Split| split.scaled(s)),
        }
    }

    /// Returns the tree describing the same shape moved by `offset`.
    ///
    /// `moved.predict(p) == original.predict(p - offset)`.
    pub fn translate(&self, offset: &Vector3<f64>) -> Self {
        Self {
            root: map_splits(&self.root, &|split: &Split| split.translated(offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit-ish wedge: true where x < 0.25 and x + y >= -0.5.
    fn sample_tree() -> SpaceTree<bool> {
        SpaceTree::branch(
            Split::new(Vector3::x(), 0.25),
            SpaceTree::branch(
                Split::new(Vector3::new(1.0, 1.0, 0.0), -0.5),
                SpaceTree::leaf(false),
                SpaceTree::leaf(true),
            ),
            SpaceTree::leaf(false),
        )
    }

    fn sample_points() -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        let steps = [-2.0, -1.1, -0.5, -0.25, 0.0, 0.125, 0.25, 0.3, 1.0, 2.5];
        for &x in &steps {
            for &y in &steps {
                for &z in &[-1.0, 0.0, 0.75] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points
    }

    #[test]
    fn single_leaf() {
        let tree = SpaceTree::leaf(3u8);
        assert_eq!(*tree.predict(&Point3::new(1.0, 2.0, 3.0)), 3);
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.depth(), 1);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn branch_structure() {
        let tree = sample_tree();
        assert_eq!(tree.num_leaves(), 3);
        assert_eq!(tree.depth(), 3);
        assert!(*tree.predict(&Point3::new(0.0, 0.0, 0.0)));
        assert!(!tree.predict(&Point3::new(0.25, 0.0, 0.0)));
        assert!(!tree.predict(&Point3::new(-1.0, -1.0, 0.0)));
    }

    #[test]
    fn clone_shares_root() {
        let tree = sample_tree();
        let copy = tree.clone();
        assert!(Arc::ptr_eq(tree.root_arc(), copy.root_arc()));
    }

    #[test]
    fn scale_matches_inverse_transform() {
        let tree = sample_tree();
        for s in [0.5, 2.0, 3.7] {
            let scaled = tree.scale(s);
            for p in sample_points() {
                let original = Point3::from(p.coords / s);
                assert_eq!(scaled.predict(&p), tree.predict(&original), "s={s}, p={p}");
            }
        }
    }

    #[test]
    fn translate_matches_inverse_transform() {
        let tree = sample_tree();
        let offset = Vector3::new(0.5, -0.75, 2.0);
        let moved = tree.translate(&offset);
        for p in sample_points() {
            assert_eq!(moved.predict(&p), tree.predict(&(p - offset)), "p={p}");
        }
    }

    #[test]
    fn translate_then_scale_composition() {
        let tree = sample_tree();
        let offset = Vector3::new(-0.25, 0.5, 0.0);
        let s = 2.0;
        let transformed = tree.translate(&offset).scale(s);
        for p in sample_points() {
            let original = Point3::from(p.coords / s) - offset;
            assert_eq!(transformed.predict(&p), tree.predict(&original), "p={p}");
        }
    }

    #[test]
    fn scale_then_translate_composition() {
        let tree = sample_tree();
        let offset = Vector3::new(0.75, -0.5, 0.25);
        let s = 0.5;
        let transformed = tree.scale(s).translate(&offset);
        for p in sample_points() {
            let original = Point3::from((p - offset).coords / s);
            assert_eq!(transformed.predict(&p), tree.predict(&original), "p={p}");
        }
    }

    #[test]
    fn transforms_leave_original_untouched() {
        let tree = sample_tree();
        let before: Vec<bool> = sample_points().iter().map(|p| *tree.predict(p)).collect();
        let _ = tree.scale(5.0).translate(&Vector3::new(1.0, 1.0, 1.0));
        let after: Vec<bool> = sample_points().iter().map(|p| *tree.predict(p)).collect();
        assert_eq!(before, after);
    }
}
