//! The seam between a viewport's lifecycle and whatever draws its pixels.
//!
//! [`RenderEngine`](super::RenderEngine) implements [`RenderSurface`] on top of
//! wgpu; [`HeadlessSurface`] implements it without a GPU, recording what it
//! was asked to do.

use cgmath::Matrix4;
use thiserror::Error;

use crate::gfx::scene::{MeshGroup, Scene, Vertex3D};

/// Output buffer dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Frame-level failures. None of these are fatal to a viewport.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("surface lost or outdated; reconfigured")]
    SurfaceLost,
    #[error("timed out acquiring the next surface texture")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Other(String),
    #[error("mesh {name} needs a {bytes} byte buffer; the device allows {limit}")]
    MeshTooLarge { name: String, bytes: u64, limit: u64 },
}

/// Checks every vertex and index buffer of `group` against `limit` bytes
pub fn check_buffer_sizes(group: &MeshGroup, limit: u64) -> Result<(), RenderError> {
    for mesh in &group.children {
        let vertex_bytes = (mesh.vertices().len() * std::mem::size_of::<Vertex3D>()) as u64;
        let index_bytes = (mesh.indices().len() * std::mem::size_of::<u32>()) as u64;
        let bytes = vertex_bytes.max(index_bytes);
        if bytes > limit {
            return Err(RenderError::MeshTooLarge {
                name: mesh.name.clone(),
                bytes,
                limit,
            });
        }
    }
    Ok(())
}

/// A drawable output owned by exactly one viewport
pub trait RenderSurface {
    /// Current output buffer size
    fn size(&self) -> SurfaceSize;

    /// Resizes the output buffer. Resizing to the current size is a no-op.
    fn resize(&mut self, size: SurfaceSize);

    /// Uploads `group` as the surface's resident mesh, releasing any previous one.
    ///
    /// A group the device cannot hold is rejected and the previous mesh stays.
    fn upload_mesh(&mut self, group: &MeshGroup) -> Result<(), RenderError>;

    /// Releases the resident mesh's GPU-side resources
    fn release_mesh(&mut self);

    /// Draws one frame of `scene`; an empty scene still clears and presents
    fn render(&mut self, scene: &Scene) -> Result<(), RenderError>;
}

/// Description of the mesh a [`HeadlessSurface`] holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentMesh {
    pub name: String,
    pub vertices: usize,
    pub triangles: usize,
}

/// GPU-less surface that records uploads, releases, resizes and frames
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    size: SurfaceSize,
    pub resident: Option<ResidentMesh>,
    pub uploads: usize,
    pub releases: usize,
    /// Number of resizes that actually changed the buffer
    pub reconfigurations: usize,
    pub frames_rendered: u64,
    /// Model matrix of the active mesh in the last frame, if one was drawn
    pub last_model_matrix: Option<Matrix4<f32>>,
    pub last_aspect: Option<f32>,
    /// Largest buffer an upload may need, unlimited when `None`
    pub buffer_limit: Option<u64>,
}

impl HeadlessSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_buffer_limit(mut self, limit: u64) -> Self {
        self.buffer_limit = Some(limit);
        self
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() || size == self.size {
            return;
        }
        self.size = size;
        self.reconfigurations += 1;
    }

    fn upload_mesh(&mut self, group: &MeshGroup) -> Result<(), RenderError> {
        if let Some(limit) = self.buffer_limit {
            check_buffer_sizes(group, limit)?;
        }
        if self.resident.is_some() {
            self.release_mesh();
        }
        self.resident = Some(ResidentMesh {
            name: group.name.clone(),
            vertices: group.vertex_count(),
            triangles: group.triangle_count(),
        });
        self.uploads += 1;
        Ok(())
    }

    fn release_mesh(&mut self) {
        if self.resident.take().is_some() {
            self.releases += 1;
        }
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.last_model_matrix = scene.active().map(|group| group.transform.matrix());
        self.last_aspect = Some(scene.camera.aspect);
        self.frames_rendered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_headless_resize_is_idempotent() {
        let mut surface = HeadlessSurface::new(SurfaceSize::new(400, 300));
        surface.resize(SurfaceSize::new(400, 300));
        assert_eq!(surface.reconfigurations, 0);
        surface.resize(SurfaceSize::new(800, 600));
        surface.resize(SurfaceSize::new(800, 600));
        assert_eq!(surface.reconfigurations, 1);
        surface.resize(SurfaceSize::new(0, 600));
        assert_eq!(surface.size(), SurfaceSize::new(800, 600));
    }

    #[test]
    fn test_headless_upload_releases_previous() {
        let mut surface = HeadlessSurface::new(SurfaceSize::new(1, 1));
        let cube = MeshGroup::new("cube", vec![generate_cube(1.0).into_mesh("cube")]);
        surface.upload_mesh(&cube).unwrap();
        surface.upload_mesh(&cube).unwrap();
        assert_eq!(surface.uploads, 2);
        assert_eq!(surface.releases, 1);
        assert_eq!(surface.resident.as_ref().map(|m| m.triangles), Some(12));
    }

    #[test]
    fn test_oversized_upload_keeps_previous_mesh() {
        // 24 cube vertices of 24 bytes each
        let mut surface = HeadlessSurface::new(SurfaceSize::new(1, 1)).with_buffer_limit(600);
        let small = MeshGroup::new("small", vec![generate_cube(1.0).into_mesh("small")]);
        surface.upload_mesh(&small).unwrap();

        let big = MeshGroup::new(
            "big",
            vec![
                generate_cube(1.0).into_mesh("a"),
                crate::gfx::geometry::generate_sphere(1.0, 32, 16).into_mesh("b"),
            ],
        );
        let err = surface.upload_mesh(&big).unwrap_err();
        assert!(matches!(err, RenderError::MeshTooLarge { ref name, .. } if name == "b"));
        assert_eq!(surface.resident.as_ref().map(|m| m.name.as_str()), Some("small"));
        assert_eq!(surface.uploads, 1);
    }
}
