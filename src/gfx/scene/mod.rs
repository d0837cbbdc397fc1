//! # Scene Management Module
//!
//! CPU-side scene state for one viewport: mesh data, the framing transform,
//! the light rig and the single active-mesh slot.
//!
//! ## Key Components
//!
//! - [`Scene`] - Camera, lights and the active [`MeshGroup`]
//! - [`MeshGroup`] - Child meshes sharing one [`Transform`]
//! - [`Aabb`] / [`normalize`] - Bounding boxes and the center-and-scale framing
//! - [`Vertex3D`] - GPU vertex format
//!
//! ## Usage
//!
//! ```rust
//! use showcase::gfx::geometry::generate_cube;
//! use showcase::gfx::scene::{normalize, MeshGroup};
//!
//! let mut group = MeshGroup::new("cube", vec![generate_cube(4.0).into_mesh("cube")]);
//! normalize(&mut group, 2.2);
//! assert!((group.world_bounds().max_dimension() - 2.2).abs() < 1e-5);
//! ```

pub mod bounds;
pub mod lighting;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use bounds::{normalize, Aabb, Normalization};
pub use lighting::{AmbientLight, DirectionalLight, Lighting};
pub use object::{Mesh, MeshGroup, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
