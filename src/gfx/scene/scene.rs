use crate::gfx::camera::ViewCamera;

use super::{lighting::Lighting, object::MeshGroup};

/// Everything one viewport draws: camera, lights and a single active-mesh slot.
///
/// At most one mesh group is active at a time. Installing a new one hands the
/// previous group back to the caller so its GPU-side resources can be released.
pub struct Scene {
    pub camera: ViewCamera,
    pub lighting: Lighting,
    active: Option<MeshGroup>,
}

impl Scene {
    pub fn new(camera: ViewCamera) -> Self {
        Self {
            camera,
            lighting: Lighting::default(),
            active: None,
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera.update_view_proj();
    }

    /// Makes `group` the active mesh, returning the one it replaced
    pub fn install(&mut self, group: MeshGroup) -> Option<MeshGroup> {
        self.active.replace(group)
    }

    pub fn active(&self) -> Option<&MeshGroup> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut MeshGroup> {
        self.active.as_mut()
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn statistics(&self) -> SceneStatistics {
        self.active
            .as_ref()
            .map(|group| SceneStatistics {
                mesh_count: group.children.len(),
                total_vertices: group.vertex_count(),
                total_triangles: group.triangle_count(),
            })
            .unwrap_or_default()
    }
}

/// Scene statistics for logging
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub mesh_count: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ViewportConfig, gfx::geometry::generate_cube};

    #[test]
    fn test_install_replaces_previous() {
        let mut scene = Scene::new(ViewCamera::new(&ViewportConfig::default(), 1.0));
        assert!(!scene.has_active());
        assert_eq!(scene.statistics(), SceneStatistics::default());

        let first = MeshGroup::new("first", vec![generate_cube(1.0).into_mesh("cube")]);
        assert!(scene.install(first).is_none());

        let second = MeshGroup::new("second", Vec::new());
        let previous = scene.install(second).map(|g| g.name);
        assert_eq!(previous.as_deref(), Some("first"));
        assert_eq!(scene.active().map(|g| g.name.as_str()), Some("second"));
    }

    #[test]
    fn test_statistics() {
        let mut scene = Scene::new(ViewCamera::new(&ViewportConfig::default(), 1.0));
        scene.install(MeshGroup::new("cube", vec![generate_cube(1.0).into_mesh("cube")]));
        let stats = scene.statistics();
        assert_eq!(stats.mesh_count, 1);
        assert_eq!(stats.total_vertices, 24);
        assert_eq!(stats.total_triangles, 12);
    }
}
