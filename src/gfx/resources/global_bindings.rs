//! Global uniform bindings for camera, lights and material
//!
//! Everything the shader needs that does not change per object lives in one
//! uniform buffer bound to group 0.

use crate::{
    gfx::{camera::CameraUniform, resources::material::SurfaceMaterial, scene::Lighting},
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in `viewer.wgsl` exactly. Every light and
/// colour is padded to a `vec4` to satisfy uniform alignment rules.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// rgb premultiplied by intensity
    ambient: [f32; 4],
    key_direction: [f32; 4],
    key_color: [f32; 4],
    fill_direction: [f32; 4],
    fill_color: [f32; 4],
    base_color: [f32; 4],
    /// rgb specular colour, w = shininess
    specular: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: CameraUniform, lighting: &Lighting, material: &SurfaceMaterial) -> Self {
        let scaled = |color: [f32; 3], intensity: f32| {
            [
                color[0] * intensity,
                color[1] * intensity,
                color[2] * intensity,
                1.0,
            ]
        };
        let direction = |p: [f32; 3]| [p[0], p[1], p[2], 0.0];

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: scaled(lighting.ambient.color, lighting.ambient.intensity),
            key_direction: direction(lighting.key.position),
            key_color: scaled(lighting.key.color, lighting.key.intensity),
            fill_direction: direction(lighting.fill.position),
            fill_color: scaled(lighting.fill.color, lighting.fill.intensity),
            base_color: scaled(material.base_color, 1.0),
            specular: [
                material.specular[0],
                material.specular[1],
                material.specular[2],
                material.shininess,
            ],
        }
    }
}

/// Per-object uniform: the model matrix of the active mesh group
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
}

/// A uniform buffer together with the layout and bind group exposing it
pub struct UniformBinding<Content> {
    pub buffer: UniformBuffer<Content>,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl<Content: bytemuck::Pod> UniformBinding<Content> {
    /// Creates the buffer, a single-entry layout visible to both shader
    /// stages, and the bind group
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = UniformBuffer::<Content>::new(device);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Bind Group Layout")),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Bind Group")),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.binding_resource(),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 16 + 64 + 7 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64);
    }

    #[test]
    fn test_light_intensity_is_premultiplied() {
        let uniform = GlobalUniform::new(
            CameraUniform::default(),
            &Lighting::default(),
            &SurfaceMaterial::default(),
        );
        assert_eq!(uniform.key_color, [0.9, 0.9, 0.9, 1.0]);
        assert_eq!(uniform.key_direction, [3.0, 3.0, 5.0, 0.0]);
        assert_eq!(uniform.specular[3], 40.0);
    }
}
