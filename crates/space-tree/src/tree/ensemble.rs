//! Normal-field ensembles.

use nalgebra::{Point3, Vector3};

use super::SpaceTree;

/// An ensemble of trees whose leaves hold approximate surface normals.
///
/// The ensemble prediction is the plain sum of its members' predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalField {
    trees: Vec<SpaceTree<Vector3<f64>>>,
}

impl NormalField {
    /// Creates an ensemble from its member trees.
    ///
    /// Returns `None` if `trees` is empty.
    pub fn new(trees: Vec<SpaceTree<Vector3<f64>>>) -> Option<Self> {
        if trees.is_empty() {
            None
        } else {
            Some(Self { trees })
        }
    }

    /// Returns the member trees.
    pub fn trees(&self) -> &[SpaceTree<Vector3<f64>>] {
        &self.trees
    }

    /// Returns the sum of every member's prediction, without renormalizing.
    pub fn predict(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.trees
            .iter()
            .fold(Vector3::zeros(), |acc, tree| acc + tree.predict(point))
    }

    /// Like [`predict`](Self::predict), scaled to unit length.
    ///
    /// A zero sum is returned unchanged.
    pub fn predict_normalized(&self, point: &Point3<f64>) -> Vector3<f64> {
        let sum = self.predict(point);
        let norm = sum.norm();
        if norm != 0.0 { sum / norm } else { sum }
    }

    /// Scales every member tree by `s`.
    pub fn scale(&self, s: f64) -> Self {
        Self {
            trees: self.trees.iter().map(|t| t.scale(s)).collect(),
        }
    }

    /// Translates every member tree by `offset`.
    pub fn translate(&self, offset: &Vector3<f64>) -> Self {
        Self {
            trees: self.trees.iter().map(|t| t.translate(offset)).collect(),
        }
    }

    /// Total number of leaves across the ensemble.
    pub fn num_leaves(&self) -> usize {
        self.trees.iter().map(SpaceTree::num_leaves).sum()
    }
}

impl From<SpaceTree<Vector3<f64>>> for NormalField {
    fn from(tree: SpaceTree<Vector3<f64>>) -> Self {
        Self { trees: vec![tree] }
    }
}
