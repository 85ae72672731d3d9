//! Brightness from a hit and its surface normal.

use nalgebra::{Point3, Vector3};

use crate::{ChangePoint, NormalField, VectorExt};

/// Brightness every lit pixel receives.
pub const AMBIENT: f64 = 0.4;
/// Weight of the diffuse term.
pub const DIFFUSE: f64 = 0.5;
/// Weight of the specular term.
pub const SPECULAR: f64 = 0.1;
/// Specular highlight sharpness.
pub const SPECULAR_EXPONENT: i32 = 10;
/// Display gamma applied to brightness before quantizing.
pub const GAMMA: f64 = 2.2;

/// Phong-style shading with a single directional light.
///
/// Both the diffuse and the specular term use absolute dot products, so
/// surfaces are lit the same from either side and the orientation of a
/// normal does not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongShader {
    light: Vector3<f64>,
}

impl PhongShader {
    /// Creates a shader for light travelling along `light`.
    pub fn new(light: Vector3<f64>) -> Self {
        Self {
            light: light.normalize(),
        }
    }

    /// Lights the scene from the camera position toward the world origin.
    pub fn for_camera(origin: &Point3<f64>) -> Self {
        Self::new(-origin.coords)
    }

    /// Returns the light direction.
    #[inline]
    pub fn light(&self) -> &Vector3<f64> {
        &self.light
    }

    /// Linear brightness for a ray with `direction` hitting a surface with
    /// `normal`.
    pub fn brightness(&self, direction: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
        let diffuse = self.light.dot(normal).abs();
        let specular = normal
            .reflect(direction)
            .dot(&self.light)
            .abs()
            .powi(SPECULAR_EXPONENT);
        AMBIENT + DIFFUSE * diffuse + SPECULAR * specular
    }

    /// Gamma-corrected 8-bit intensity.
    pub fn intensity(&self, direction: &Vector3<f64>, normal: &Vector3<f64>) -> u8 {
        let value = (self.brightness(direction, normal).powf(GAMMA) * 255.0).round();
        value.clamp(0.0, 255.0) as u8
    }
}

/// Maps the number of plane crossings a ray visited to an intensity.
///
/// Used to visualize how much work each pixel costs, so it applies to misses
/// as well as hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatMapShader {
    max_changes: usize,
}

impl HeatMapShader {
    /// Creates a heat map saturating at `max_changes` crossings (at least one).
    pub fn new(max_changes: usize) -> Self {
        Self {
            max_changes: max_changes.max(1),
        }
    }

    #[inline]
    pub fn max_changes(&self) -> usize {
        self.max_changes
    }

    pub fn intensity(&self, changes: usize) -> u8 {
        let frac = changes.min(self.max_changes) as f64 / self.max_changes as f64;
        (frac * 255.0).round() as u8
    }
}

/// Where the normal used for shading comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum NormalSource<'a> {
    /// The normal of the plane the ray crossed.
    #[default]
    Plane,
    /// A normal field evaluated at the hit point.
    Field(&'a NormalField),
}

impl NormalSource<'_> {
    /// Returns the shading normal for `hit`.
    ///
    /// Field normals are the raw ensemble sum and are not renormalized.
    pub fn normal_at(&self, hit: &ChangePoint) -> Vector3<f64> {
        match self {
            NormalSource::Plane => hit.normal,
            NormalSource::Field(field) => field.predict(&hit.point),
        }
    }
}
