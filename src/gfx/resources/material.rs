//! The one surface material every installed mesh is drawn with.

use crate::gfx::scene::lighting::rgb;

/// Phong-style material parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub base_color: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            base_color: rgb(0xE1EBFF),
            specular: rgb(0x8CB4FF),
            shininess: 40.0,
        }
    }
}

/// Background clear colour; zero alpha lets the page show through
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0x0d as f64 / 255.0,
    g: 0x0e as f64 / 255.0,
    b: 0x14 as f64 / 255.0,
    a: 0.0,
};
