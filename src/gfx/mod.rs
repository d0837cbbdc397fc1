//! # Graphics Module
//!
//! Everything a viewport needs to put a lit, spinning mesh on screen.
//!
//! - **Camera** ([`camera`]) - Fixed perspective camera on the view axis
//! - **Geometry** ([`geometry`]) - Deterministic procedural shapes
//! - **Scene** ([`scene`]) - Meshes, bounds, framing, lights, the active-mesh slot
//! - **Rendering** ([`rendering`]) - The [`RenderSurface`] seam and its wgpu engine
//! - **Resources** ([`resources`]) - Uniform buffers, material, depth buffer

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::ViewCamera;
pub use rendering::{HeadlessSurface, RenderEngine, RenderSurface, SurfaceSize};
pub use scene::{MeshGroup, Scene};
