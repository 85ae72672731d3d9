//! Render-request protocol between the viewer and the render worker.
//!
//! Every type here serializes to JSON with camel-case field names, and the
//! camera travels as plain numeric fields.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use space_tree::Camera;

/// Default edge length of a rendered frame, in pixels.
pub const DEFAULT_FRAME_SIZE: usize = 256;

/// Largest frame edge length a request may ask for.
pub const MAX_FRAME_SIZE: usize = 8192;

/// How a frame should be rendered and delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Shade with the normal field instead of the crossing plane's normal,
    /// when one is loaded.
    pub use_normals: bool,
    /// Shade by plane crossings per pixel, saturating at this count.
    pub max_changes: Option<usize>,
    /// Return the frame as PNG bytes instead of updating the live canvas.
    pub export_image: bool,
    /// Frame edge length in pixels, at most [`MAX_FRAME_SIZE`].
    pub size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            use_normals: true,
            max_changes: None,
            export_image: false,
            size: DEFAULT_FRAME_SIZE,
        }
    }
}

/// A [`Camera`] as plain numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFields {
    pub origin: [f64; 3],
    pub x: [f64; 3],
    pub y: [f64; 3],
    pub z: [f64; 3],
    pub fov: f64,
}

impl From<&Camera> for CameraFields {
    fn from(camera: &Camera) -> Self {
        Self {
            origin: camera.origin.coords.into(),
            x: camera.x.into(),
            y: camera.y.into(),
            z: camera.z.into(),
            fov: camera.fov,
        }
    }
}

impl From<CameraFields> for Camera {
    fn from(fields: CameraFields) -> Self {
        Camera::new(
            Point3::from(fields.origin),
            Vector3::from(fields.x),
            Vector3::from(fields.y),
            Vector3::from(fields.z),
            fields.fov,
        )
    }
}

/// A request to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub model_path: String,
    #[serde(default)]
    pub normals_path: Option<String>,
    pub camera: CameraFields,
    #[serde(default)]
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(model_path: impl Into<String>, camera: &Camera) -> Self {
        Self {
            model_path: model_path.into(),
            normals_path: None,
            camera: camera.into(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_normals(mut self, normals_path: impl Into<String>) -> Self {
        self.normals_path = Some(normals_path.into());
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// The worker's answer to a [`RenderRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderResponse {
    /// The frame was rendered. `image` holds PNG bytes for export requests.
    #[serde(rename_all = "camelCase")]
    Rendered {
        model_path: String,
        normals_path: Option<String>,
        camera: CameraFields,
        options: RenderOptions,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<Vec<u8>>,
    },
    /// The request failed; the previous frame stays on the canvas.
    Failed { error: String },
}

impl RenderResponse {
    /// Builds the success response echoing `request`.
    pub fn rendered(request: &RenderRequest, image: Option<Vec<u8>>) -> Self {
        RenderResponse::Rendered {
            model_path: request.model_path.clone(),
            normals_path: request.normals_path.clone(),
            camera: request.camera,
            options: request.options,
            image,
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, RenderResponse::Rendered { .. })
    }
}
