//! Rays and the boundary crossings found along them.

use nalgebra::{Point3, Vector3};

/// A ray in 3D space defined by origin and direction.
///
/// The direction does not need unit length; parametric distances are
/// measured in multiples of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3<f64>,
    /// Direction of travel.
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Evaluates the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Returns the same ray started from `origin`.
    #[inline]
    pub fn with_origin(&self, origin: Point3<f64>) -> Self {
        Self {
            origin,
            direction: self.direction,
        }
    }
}

/// A point where a tree's classification changes along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangePoint {
    /// The crossing point.
    pub point: Point3<f64>,
    /// Unit surface normal at the crossing.
    pub normal: Vector3<f64>,
    /// Parametric distance from the original ray origin.
    pub t: f64,
}

impl ChangePoint {
    /// Returns the same change point with `t` shifted by `dt`.
    #[inline]
    pub fn add_t(self, dt: f64) -> Self {
        Self {
            t: self.t + dt,
            ..self
        }
    }
}
