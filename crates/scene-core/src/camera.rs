//! Perspective camera used by the scene.
//!
//! Platform-free; the web backend reads the matrices each frame.

use crate::config::SceneConfig;
use glam::{Mat4, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_config(config: &SceneConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: Vec3::new(0.0, 0.0, config.camera_z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: config.fov_y_degrees.to_radians(),
            znear: config.near,
            zfar: config.far,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Match the aspect ratio to a `width` x `height` viewport.
    ///
    /// Returns `true` when the aspect actually changed, so callers can skip
    /// redundant work on repeated identical sizes.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        if aspect == self.aspect {
            return false;
        }
        self.aspect = aspect;
        true
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
