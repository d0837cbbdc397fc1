// src/lib.rs
//! Showcase viewer
//!
//! Small rotating 3D model viewports built on wgpu and winit. Each viewport
//! loads its configured models (OBJ, binary FBX or procedural shapes), frames
//! them to a fixed size, and spins them until the window closes. A model that
//! fails to load is replaced by a procedural solid, so a viewport never stays
//! empty.

pub mod app;
pub mod assets;
pub mod config;
pub mod gfx;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ShowcaseApp;
pub use assets::{AssetError, AssetLoader, LoadResult};
pub use config::{ModelDescriptor, ProceduralShape, ShowcaseConfig, ViewportConfig};
pub use viewport::{Container, ViewportController, ViewportState};

/// Opens one window per configured viewport and runs until they are closed
pub fn run(config: ShowcaseConfig) -> anyhow::Result<()> {
    ShowcaseApp::new(config)?.run()
}
