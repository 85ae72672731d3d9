//! Oriented cutting planes for space trees.

use nalgebra::{Point3, Vector3};

/// Relative tolerance below which a direction counts as parallel to a split.
///
/// Scaled by the norms of both the axis and the direction.
pub const PARALLEL_EPSILON: f64 = 1e-8;

/// Which side of a split a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `axis · point < threshold`
    Left,
    /// `axis · point >= threshold`
    Right,
}

impl Side {
    /// Returns the other side.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An oriented plane `axis · point = threshold` that splits space in two.
///
/// Unlike a geometric plane the axis is not normalized: the stored
/// threshold is exactly what the tree format carries, so classification
/// stays bit-for-bit faithful to the serialized tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    axis: Vector3<f64>,
    threshold: f64,
}

impl Split {
    /// Creates a new split from an axis and threshold.
    ///
    /// # Panics
    /// Panics if the axis is the zero vector (the tree format reserves it
    /// as the leaf marker).
    pub fn new(axis: Vector3<f64>, threshold: f64) -> Self {
        assert!(axis != Vector3::zeros(), "Split axis cannot be zero");
        Self { axis, threshold }
    }

    /// Creates an axis-aligned split on coordinate `idx` (0, 1, 2 = x, y, z).
    ///
    /// # Panics
    /// Panics if `idx > 2`.
    pub fn axis_aligned(idx: usize, threshold: f64) -> Self {
        assert!(idx < 3, "axis index out of range: {idx}");
        let mut axis = Vector3::zeros();
        axis[idx] = 1.0;
        Self { axis, threshold }
    }

    /// Returns the (unnormalized) axis.
    #[inline]
    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }

    /// Returns the threshold.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Projects a point onto the axis.
    #[inline]
    pub fn dot(&self, point: &Point3<f64>) -> f64 {
        self.axis.dot(&point.coords)
    }

    /// Classifies which side of the split a point lies on.
    #[inline]
    pub fn side(&self, point: &Point3<f64>) -> Side {
        side_of(self.dot(point), self.threshold)
    }

    /// Returns `true` if `direction` runs parallel to the plane, within
    /// [`PARALLEL_EPSILON`] relative to both norms.
    #[inline]
    pub fn is_parallel(&self, direction: &Vector3<f64>) -> bool {
        let dir_dot = self.axis.dot(direction);
        dir_dot.abs() < self.axis.norm() * direction.norm() * PARALLEL_EPSILON
    }

    /// Unit normal pointing into `side`.
    pub fn normal_toward(&self, side: Side) -> Vector3<f64> {
        let n = self.axis.normalize();
        match side {
            Side::Left => -n,
            Side::Right => n,
        }
    }

    /// Returns the split after scaling space by `s` about the origin.
    ///
    /// `s` must be positive; a negative factor would mirror space and swap
    /// the meaning of the two sides.
    pub fn scaled(&self, s: f64) -> Self {
        debug_assert!(s > 0.0, "scale factor must be positive, got {s}");
        Self {
            axis: self.axis,
            threshold: self.threshold * s,
        }
    }

    /// Returns the split after translating space by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            axis: self.axis,
            threshold: self.threshold + self.axis.dot(offset),
        }
    }
}

/// Side for a precomputed projection `dot` against `threshold`.
#[inline]
pub(crate) fn side_of(dot: f64, threshold: f64) -> Side {
    if dot < threshold {
        Side::Left
    } else {
        Side::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn classify_sides() {
        let split = Split::new(Vector3::new(0.0, 0.0, 2.0), 1.0);
        assert_eq!(split.side(&Point3::new(0.0, 0.0, 0.0)), Side::Left);
        assert_eq!(split.side(&Point3::new(9.0, 9.0, 0.4999)), Side::Left);
        // On the plane counts as right.
        assert_eq!(split.side(&Point3::new(0.0, 0.0, 0.5)), Side::Right);
        assert_eq!(split.side(&Point3::new(0.0, 0.0, 3.0)), Side::Right);
    }

    #[test]
    #[should_panic(expected = "Split axis cannot be zero")]
    fn zero_axis_panics() {
        Split::new(Vector3::zeros(), 1.0);
    }

    #[test]
    fn axis_aligned_split() {
        let split = Split::axis_aligned(1, -2.0);
        assert_eq!(split.axis(), &Vector3::y());
        assert_eq!(split.threshold(), -2.0);
    }

    #[test]
    fn parallel_detection_is_relative() {
        let split = Split::new(Vector3::new(0.0, 0.0, 1000.0), 0.0);
        assert!(split.is_parallel(&Vector3::new(1.0, 0.0, 0.0)));
        assert!(split.is_parallel(&Vector3::new(1.0, 0.0, 1e-10)));
        assert!(!split.is_parallel(&Vector3::new(1.0, 0.0, 1e-6)));
    }

    #[test]
    fn normal_toward_side() {
        let split = Split::new(Vector3::new(0.0, 3.0, 4.0), 0.0);
        assert_relative_eq!(split.normal_toward(Side::Right), Vector3::new(0.0, 0.6, 0.8));
        assert_relative_eq!(split.normal_toward(Side::Left), Vector3::new(0.0, -0.6, -0.8));
    }

    #[test]
    fn scaled_and_translated() {
        let split = Split::new(Vector3::new(1.0, 2.0, 0.0), 3.0);
        let scaled = split.scaled(2.0);
        assert_eq!(scaled.axis(), split.axis());
        assert_eq!(scaled.threshold(), 6.0);

        let moved = split.translated(&Vector3::new(1.0, 1.0, 5.0));
        assert_eq!(moved.threshold(), 6.0);

        // A point moved along with space keeps its side.
        let p = Point3::new(0.9, 1.0, 0.0);
        let q = p + Vector3::new(1.0, 1.0, 5.0);
        assert_eq!(split.side(&p), moved.side(&q));
    }

    #[test]
    fn opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
