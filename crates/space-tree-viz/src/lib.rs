//! Rendering, asset handling and interactive viewing for space trees.
//!
//! Everything around the core library lives here: asset sources, the
//! decoded-tree cache, the render-request protocol, the background render
//! worker, frame compositing and PNG export, the model catalog, and the
//! orbit camera driving the viewer.

use macroquad::input::{
    KeyCode, MouseButton, is_key_down, is_mouse_button_down, mouse_delta_position, mouse_wheel,
};
use nalgebra::{Matrix3, Point3, Vector3};
use space_tree::{Camera, rotation};

pub mod catalog;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod scene;
pub mod source;
pub mod worker;

pub use catalog::{Catalog, Metadata, ModelEntry, TreeInfo};
pub use error::{RenderError, Result};
pub use protocol::{
    CameraFields, MAX_FRAME_SIZE, RenderOptions, RenderRequest, RenderResponse,
};
pub use render::{Frame, render_frame};
pub use scene::{Scene, SceneCache};
pub use source::{AssetSource, FsSource, MemorySource};
pub use worker::{CanvasFrame, RenderWorker};

/// Distance of the default camera from the origin.
pub const DEFAULT_DISTANCE: f32 = 3.0;

/// Orbit camera circling the normalized model at the origin.
///
/// Yaw turns about the world z axis and pitch tilts the camera up or down,
/// starting from the default [`Camera`] pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from the origin
    pub min_distance: f32,
    /// Maximum distance from the origin
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE, 0.0, 0.0)
    }
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            zoom_speed: 0.25,
            min_distance: 1.8,
            max_distance: 10.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    ///
    /// Returns `true` if the pose changed.
    pub fn update(&mut self) -> bool {
        let before = *self;

        // Mouse drag for rotation
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Mouse wheel for zoom
        let scroll = mouse_wheel().1;
        if scroll != 0.0 {
            self.distance -= scroll.signum() * self.zoom_speed;
        }

        // Arrow keys for rotation
        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        self.clamp();
        *self != before
    }

    /// Keeps pitch away from the poles and distance within the zoom limits.
    pub fn clamp(&mut self) {
        self.pitch = self.pitch.clamp(-1.5, 1.5);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Rotation taking the default camera pose to this one.
    pub fn orientation(&self) -> Matrix3<f64> {
        rotation(&Vector3::z(), f64::from(self.yaw)) * rotation(&Vector3::x(), f64::from(self.pitch))
    }

    /// Returns the camera looking at the origin.
    pub fn to_camera(&self) -> Camera {
        self.to_camera_with(&Matrix3::identity())
    }

    /// Returns the camera for a model shown with rotation `model`.
    ///
    /// Rotating the model is the same as rotating the camera the other way.
    pub fn to_camera_with(&self, model: &Matrix3<f64>) -> Camera {
        let mut camera = Camera::default().rotated(&(model.transpose() * self.orientation()));
        let scale = f64::from(self.distance / DEFAULT_DISTANCE);
        camera.origin = Point3::from(camera.origin.coords * scale);
        camera
    }
}
