// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Uniform buffers, bind groups, the surface material and the depth buffer.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalUniform, ObjectUniform, UniformBinding};
pub use material::{SurfaceMaterial, CLEAR_COLOR};
pub use texture_resource::TextureResource;
