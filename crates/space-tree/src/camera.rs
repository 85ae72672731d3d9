//! Pinhole camera and per-pixel primary rays.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::Ray;

/// A pinhole camera.
///
/// `x`, `y` and `z` are the right, up and forward axes and are expected to
/// be orthonormal. `fov` is the full vertical field of view in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub origin: Point3<f64>,
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
    pub fov: f64,
}

impl Default for Camera {
    /// Looks down the negative y axis at the origin from three units away.
    fn default() -> Self {
        Self {
            origin: Point3::new(0.0, 3.0, 0.0),
            x: Vector3::new(1.0, 0.0, 0.0),
            y: Vector3::new(0.0, 0.0, -1.0),
            z: Vector3::new(0.0, -1.0, 0.0),
            fov: 0.69,
        }
    }
}

impl Camera {
    /// Creates a camera from its origin, basis and field of view.
    pub fn new(
        origin: Point3<f64>,
        x: Vector3<f64>,
        y: Vector3<f64>,
        z: Vector3<f64>,
        fov: f64,
    ) -> Self {
        Self { origin, x, y, z, fov }
    }

    /// Returns the camera rotated about the world origin.
    ///
    /// Both the position and the basis are rotated, so a camera looking at
    /// the origin keeps looking at it.
    pub fn rotated(&self, rotation: &Matrix3<f64>) -> Self {
        Self {
            origin: Point3::from(rotation * self.origin.coords),
            x: rotation * self.x,
            y: rotation * self.y,
            z: rotation * self.z,
            fov: self.fov,
        }
    }

    /// Generates one normalized ray per pixel of a `size`×`size` image.
    ///
    /// Rays come out in row-major order. The iterator is lazy and holds no
    /// state beyond its position, so calling this again starts over.
    pub fn pixel_rays(&self, size: usize) -> PixelRays {
        PixelRays {
            origin: self.origin,
            x: self.x,
            y: self.y,
            forward: self.z / (self.fov / 2.0).tan(),
            size,
            index: 0,
        }
    }
}

/// Iterator over a camera's per-pixel rays, see [`Camera::pixel_rays`].
#[derive(Debug, Clone)]
pub struct PixelRays {
    origin: Point3<f64>,
    x: Vector3<f64>,
    y: Vector3<f64>,
    forward: Vector3<f64>,
    size: usize,
    index: usize,
}

impl Iterator for PixelRays {
    type Item = Ray;

    fn next(&mut self) -> Option<Ray> {
        let total = self.size * self.size;
        if self.index >= total {
            return None;
        }
        let row = self.index / self.size;
        let col = self.index % self.size;
        self.index += 1;

        let size = self.size as f64;
        let x_frac = 2.0 * col as f64 / size - 1.0;
        let y_frac = 2.0 * row as f64 / size - 1.0;
        let direction = (self.x * x_frac + self.y * y_frac + self.forward).normalize();
        Some(Ray::new(self.origin, direction))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size * self.size - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelRays {}
