//! # Procedural Geometry Generation
//!
//! Deterministic primitive shapes that need no model file. Procedural model
//! descriptors and the load-failure fallback are both synthesized here.
//!
//! ## Supported Primitives
//!
//! - **Icosahedron**: geodesic solid with configurable subdivision detail (the fallback)
//! - **Cube**: axis-aligned cube of a given edge length
//! - **Sphere**: UV sphere with configurable resolution
//! - **Plane**: flat plane facing +Z with configurable subdivisions
//! - **Cylinder**: capped cylinder along the Z axis
//!
//! ## Usage
//!
//! ```rust
//! use showcase::config::ProceduralShape;
//! use showcase::gfx::geometry::{generate, generate_icosahedron};
//!
//! let fallback = generate(&ProceduralShape::FALLBACK);
//! assert_eq!(fallback.triangle_count(), 20 * 9);
//!
//! let coarse = generate_icosahedron(1.0, 0);
//! assert_eq!(coarse.triangle_count(), 20);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::{config::ProceduralShape, gfx::scene::object::Mesh};

/// Represents generated geometry data ready to become a [`Mesh`]
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts into a CPU-side mesh
    pub fn into_mesh(self, name: &str) -> Mesh {
        Mesh::from_arrays(name, &self.vertices, &self.normals, self.indices)
    }
}

/// Synthesizes the geometry for a procedural shape
pub fn generate(shape: &ProceduralShape) -> GeometryData {
    match *shape {
        ProceduralShape::Icosahedron { radius, detail } => generate_icosahedron(radius, detail),
        ProceduralShape::Cube { size } => generate_cube(size),
        ProceduralShape::Sphere {
            radius,
            longitude_segments,
            latitude_segments,
        } => generate_sphere(radius, longitude_segments, latitude_segments),
        ProceduralShape::Plane {
            width,
            height,
            width_segments,
            height_segments,
        } => generate_plane(width, height, width_segments, height_segments),
        ProceduralShape::Cylinder {
            radius,
            height,
            segments,
        } => generate_cylinder(radius, height, segments),
    }
}
