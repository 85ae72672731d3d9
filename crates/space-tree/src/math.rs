//! Vector and matrix helpers on top of nalgebra.
//!
//! nalgebra already provides dot products, norms and matrix algebra. This
//! module adds the handful of operations space trees and cameras need that
//! it does not: indexed axis access, orthonormal bases and the
//! basis-change rotation used to orient cameras.

use nalgebra::{Matrix3, Vector3};

/// Extra vector operations used throughout the crate.
pub trait VectorExt: Sized {
    /// Returns the unit vector along axis `idx` (0, 1, 2 = x, y, z).
    ///
    /// Any other index yields the zero vector.
    fn unit_axis(idx: usize) -> Self;

    /// Returns coordinate `idx` (0, 1, 2 = x, y, z), or 0 for any other index.
    fn component(&self, idx: usize) -> f64;

    /// Returns the largest absolute coordinate.
    fn abs_max(&self) -> f64;

    /// Returns the midpoint between `self` and `other`.
    fn mid(&self, other: &Self) -> Self;

    /// Reflects `v` through the line spanned by `self`.
    fn reflect(&self, v: &Self) -> Self;

    /// Returns a right-handed orthonormal basis whose first vector is
    /// `self` normalized.
    ///
    /// `self` must be nonzero.
    fn ortho_basis(&self) -> [Self; 3];
}

impl VectorExt for Vector3<f64> {
    fn unit_axis(idx: usize) -> Self {
        match idx {
            0 => Vector3::x(),
            1 => Vector3::y(),
            2 => Vector3::z(),
            _ => Vector3::zeros(),
        }
    }

    #[inline]
    fn component(&self, idx: usize) -> f64 {
        if idx < 3 { self[idx] } else { 0.0 }
    }

    #[inline]
    fn abs_max(&self) -> f64 {
        self.amax()
    }

    #[inline]
    fn mid(&self, other: &Self) -> Self {
        (self + other) / 2.0
    }

    #[inline]
    fn reflect(&self, v: &Self) -> Self {
        v - self * (2.0 * self.dot(v))
    }

    fn ortho_basis(&self) -> [Self; 3] {
        let first = self.normalize();

        // Build the perpendicular from the two largest-magnitude coordinates
        // so it never collapses toward zero.
        let smallest = first.iamin();
        let (i, j) = match smallest {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let mut second = Vector3::zeros();
        second[i] = -first[j];
        second[j] = first[i];
        let second = second.normalize();

        let third = first.cross(&second);
        [first, second, third]
    }
}

/// Rotation by `theta` radians about `axis` (right-hand rule).
///
/// Changes basis into `axis.ortho_basis()`, rotates about that basis'
/// first vector, then changes back.
pub fn rotation(axis: &Vector3<f64>, theta: f64) -> Matrix3<f64> {
    let [b0, b1, b2] = axis.ortho_basis();
    let to_basis = Matrix3::from_rows(&[b0.transpose(), b1.transpose(), b2.transpose()]);
    let (sin, cos) = theta.sin_cos();
    #[rustfmt::skip]
    let rotate = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cos, -sin,
        0.0, sin, cos,
    );
    to_basis.transpose() * rotate * to_basis
}
