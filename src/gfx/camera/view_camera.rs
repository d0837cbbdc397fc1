use super::camera_utils::{Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::ViewportConfig;
use cgmath::*;

/// Perspective camera parked on the +Z view axis, looking at the origin.
///
/// Only the aspect ratio changes after construction; the mesh spins, the
/// camera never moves.
#[derive(Debug, Clone, Copy)]
pub struct ViewCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for ViewCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl ViewCamera {
    pub fn new(config: &ViewportConfig, aspect: f32) -> Self {
        let mut camera = Self {
            eye: Point3::new(0.0, 0.0, config.camera_distance),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(config.fov_degrees).into(),
            znear: config.near,
            zfar: config.far,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    /// Sets the projection aspect ratio from pixel dimensions
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.update_view_proj();
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = self.eye.to_homogeneous().into();
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}
