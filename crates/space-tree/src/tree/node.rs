//! Space tree node implementation.

use std::sync::Arc;

use nalgebra::Point3;

use crate::{Side, Split};

/// A node in a space tree.
///
/// A node is either a leaf carrying a classification value, or a branch
/// that sends points with `axis · p < threshold` to `left` and everything
/// else to `right`. The two shapes are separate variants, so a node can
/// never carry both a split and a value.
#[derive(Debug, PartialEq)]
pub enum SpaceNode<T> {
    /// Terminal node holding a classification value.
    Leaf(T),
    /// Internal node splitting space in two.
    Branch {
        /// The cutting plane.
        split: Split,
        /// Subtree for points on the left (`<`) side.
        left: Arc<SpaceNode<T>>,
        /// Subtree for points on the right (`>=`) side.
        right: Arc<SpaceNode<T>>,
    },
}

impl<T> SpaceNode<T> {
    /// Returns `true` for leaf nodes.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, SpaceNode::Leaf(_))
    }

    /// Returns the leaf value, if this is a leaf.
    #[inline]
    pub fn leaf(&self) -> Option<&T> {
        match self {
            SpaceNode::Leaf(value) => Some(value),
            SpaceNode::Branch { .. } => None,
        }
    }

    /// Returns the split, if this is a branch.
    #[inline]
    pub fn split(&self) -> Option<&Split> {
        match self {
            SpaceNode::Leaf(_) => None,
            SpaceNode::Branch { split, .. } => Some(split),
        }
    }

    /// Returns the child on `side`, if this is a branch.
    #[inline]
    pub fn child(&self, side: Side) -> Option<&Arc<SpaceNode<T>>> {
        match self {
            SpaceNode::Leaf(_) => None,
            SpaceNode::Branch { left, right, .. } => Some(match side {
                Side::Left => left,
                Side::Right => right,
            }),
        }
    }

    /// Classifies a point, walking from this node down to a leaf.
    pub fn predict(&self, point: &Point3<f64>) -> &T {
        let mut node = self;
        loop {
            match node {
                SpaceNode::Leaf(value) => return value,
                SpaceNode::Branch { split, left, right } => {
                    node = match split.side(point) {
                        Side::Left => left.as_ref(),
                        Side::Right => right.as_ref(),
                    };
                }
            }
        }
    }

    /// Returns the number of leaves in this subtree.
    pub fn num_leaves(&self) -> usize {
        match self {
            SpaceNode::Leaf(_) => 1,
            SpaceNode::Branch { left, right, .. } => left.num_leaves() + right.num_leaves(),
        }
    }

    /// Returns the depth of this subtree (1 for a leaf).
    pub fn depth(&self) -> usize {
        match self {
            SpaceNode::Leaf(_) => 1,
            SpaceNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Rebuilds every branch with `f` applied to its split; leaves are shared.
pub(crate) fn map_splits<T, F>(node: &Arc<SpaceNode<T>>, f: &F) -> Arc<SpaceNode<T>>
where
    F: Fn(&Split) -> Split,
{
    match node.as_ref() {
        SpaceNode::Leaf(_) => Arc::clone(node),
        SpaceNode::Branch { split, left, right } => Arc::new(SpaceNode::Branch {
            split: f(split),
            left: map_splits(left, f),
            right: map_splits(right, f),
        }),
    }
}
