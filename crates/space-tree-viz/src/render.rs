//! Per-pixel rendering of a scene into an RGBA frame.

use std::path::Path;
use std::time::Instant;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use space_tree::Camera;
use space_tree::shading::{HeatMapShader, NormalSource, PhongShader};

use crate::error::{RenderError, Result};
use crate::protocol::{MAX_FRAME_SIZE, RenderOptions};
use crate::scene::Scene;

/// A square RGBA8 image, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    size: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Creates an opaque black frame.
    pub fn new(size: usize) -> Self {
        let mut pixels = vec![0; size * size * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self { size, pixels }
    }

    /// Edge length in pixels.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA value at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.size + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Sets pixel `index` (row-major) to an opaque gray.
    fn set_gray(&mut self, index: usize, value: u8) {
        let i = index * 4;
        self.pixels[i..i + 3].fill(value);
    }

    /// Encodes the frame as a PNG file in memory.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let side = u32::try_from(self.size).map_err(|_| RenderError::FrameTooLarge(self.size))?;
        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            &self.pixels,
            side,
            side,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(png)
    }

    /// Writes the frame to `path` as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

/// Renders `scene` as seen by `camera`.
///
/// With `max_changes` set, every pixel shows how many plane crossings its
/// ray visited. Otherwise hits are Phong-shaded and misses stay black.
/// Any cast error fails the whole frame. Sizes above [`MAX_FRAME_SIZE`] are
/// rejected before anything is allocated.
pub fn render_frame(scene: &Scene<'_>, camera: &Camera, options: &RenderOptions) -> Result<Frame> {
    if options.size > MAX_FRAME_SIZE {
        return Err(RenderError::FrameTooLarge(options.size));
    }
    let start = Instant::now();
    let mut frame = Frame::new(options.size);

    match options.max_changes {
        Some(max_changes) => {
            let heat = HeatMapShader::new(max_changes);
            for (i, ray) in camera.pixel_rays(options.size).enumerate() {
                let outcome = scene.model.cast_ray_changes(&ray)?;
                frame.set_gray(i, heat.intensity(outcome.changes));
            }
        }
        None => {
            let shader = PhongShader::for_camera(&camera.origin);
            let normals = match scene.normals {
                Some(field) if options.use_normals => NormalSource::Field(field),
                _ => NormalSource::Plane,
            };
            for (i, ray) in camera.pixel_rays(options.size).enumerate() {
                if let Some(hit) = scene.model.cast_ray(&ray)? {
                    let normal = normals.normal_at(&hit);
                    frame.set_gray(i, shader.intensity(&ray.direction, &normal));
                }
            }
        }
    }

    log::info!(
        "rendered {0}x{0} frame in {1:.1?}",
        options.size,
        start.elapsed()
    );
    Ok(frame)
}
