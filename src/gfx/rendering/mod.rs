// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The [`RenderSurface`] trait every viewport draws through, its wgpu
//! implementation and a GPU-less implementation for offscreen use and tests.

pub mod render_engine;
pub mod surface;

// Re-export main types
pub use render_engine::RenderEngine;
pub use surface::{
    check_buffer_sizes, HeadlessSurface, RenderError, RenderSurface, ResidentMesh, SurfaceSize,
};
