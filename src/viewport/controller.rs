//! Lifecycle of one on-screen viewport: construction, the single asset load,
//! mesh installation, per-frame ticks and resizes.

use std::time::{Duration, Instant};

use cgmath::Vector3;
use futures::{future::BoxFuture, FutureExt};

use crate::{
    assets::{AssetError, AssetLoader, LoadResult},
    config::{ModelDescriptor, ViewportConfig},
    gfx::{
        camera::ViewCamera,
        rendering::{RenderError, RenderSurface, SurfaceSize},
        scene::{normalize, MeshGroup, Normalization, Scene},
    },
};

use super::container::{Container, FAILED_TEXT};

/// Where a viewport is in its lifecycle.
///
/// `AnimatingWithMesh` and `AnimatingWithFallback` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Initializing,
    AnimatingEmpty,
    AnimatingWithMesh,
    AnimatingWithFallback,
}

impl ViewportState {
    pub fn has_mesh(self) -> bool {
        matches!(
            self,
            ViewportState::AnimatingWithMesh | ViewportState::AnimatingWithFallback
        )
    }
}

/// Container dimensions after fallbacks, plus the capped pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportLayout {
    /// Logical width
    pub width: u32,
    /// Logical height, never below the configured minimum
    pub height: u32,
    pub pixel_ratio: f64,
}

impl ViewportLayout {
    pub fn measure(container: &impl Container, config: &ViewportConfig) -> Self {
        let width = match container.client_width() {
            0 => config.fallback_width,
            w => w,
        };
        let height = match container.client_height() {
            0 => config.fallback_height,
            h => h,
        }
        .max(config.min_height);

        let ratio = container.device_pixel_ratio();
        let pixel_ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio.min(config.max_pixel_ratio)
        } else {
            1.0
        };

        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Output buffer size in physical pixels
    pub fn surface_size(&self) -> SurfaceSize {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        SurfaceSize::new(scale(self.width), scale(self.height))
    }
}

/// A configured viewport waiting for its container to be laid out.
///
/// Hosts keep it around and call [`ready_layout`] again on every frame and
/// layout change; once it returns a layout they create a surface of that size
/// and [`construct`] the controller.
///
/// [`ready_layout`]: DeferredViewport::ready_layout
/// [`construct`]: DeferredViewport::construct
#[derive(Debug)]
pub struct DeferredViewport<C: Container> {
    config: ViewportConfig,
    container: C,
}

impl<C: Container> DeferredViewport<C> {
    pub fn new(config: ViewportConfig, container: C) -> Self {
        Self { config, container }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Layout to size the surface with, or `None` while the container is
    /// still zero-sized
    pub fn ready_layout(&self) -> Option<ViewportLayout> {
        self.container
            .is_laid_out()
            .then(|| ViewportLayout::measure(&self.container, &self.config))
    }

    pub fn construct<S: RenderSurface>(self, surface: S) -> ViewportController<S, C> {
        ViewportController::construct(self.config, self.container, surface)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadPhase {
    NotRequested,
    Pending { since: Instant },
    Resolved,
}

/// Owns one viewport: its container handle, render surface and scene.
///
/// The controller is driven from outside. The host calls [`tick`] once per
/// display refresh and [`on_resize`] on layout changes, and drives the future
/// returned by [`request_assets`] to completion, feeding its output to
/// [`resolve`]. Everything runs on the host's thread.
///
/// [`tick`]: ViewportController::tick
/// [`on_resize`]: ViewportController::on_resize
/// [`request_assets`]: ViewportController::request_assets
/// [`resolve`]: ViewportController::resolve
pub struct ViewportController<S: RenderSurface, C: Container> {
    config: ViewportConfig,
    container: C,
    surface: S,
    scene: Scene,
    layout: ViewportLayout,
    state: ViewportState,
    load: LoadPhase,
    frames_rendered: u64,
}

impl<S: RenderSurface, C: Container> ViewportController<S, C> {
    /// Builds the viewport and renders its first frame.
    ///
    /// The surface is sized to the container, the camera and light rig are
    /// set up, and the viewport starts animating without a mesh. When every
    /// configured model is procedural the mesh is installed right here, with
    /// no I/O and before the first frame.
    pub fn construct(config: ViewportConfig, container: C, mut surface: S) -> Self {
        let layout = ViewportLayout::measure(&container, &config);
        surface.resize(layout.surface_size());

        let camera = ViewCamera::new(&config, layout.aspect());
        let mut controller = Self {
            config,
            container,
            surface,
            scene: Scene::new(camera),
            layout,
            state: ViewportState::Initializing,
            load: LoadPhase::NotRequested,
            frames_rendered: 0,
        };

        log::debug!(
            "viewport {} constructed at {}x{} (pixel ratio {})",
            controller.config.container,
            layout.width,
            layout.height,
            layout.pixel_ratio
        );
        controller.state = ViewportState::AnimatingEmpty;

        if controller.config.models.iter().all(|m| m.is_procedural()) {
            controller.install_procedural();
        }

        controller.tick();
        controller
    }

    fn install_procedural(&mut self) {
        let parts: Vec<MeshGroup> = self
            .config
            .models
            .iter()
            .filter_map(|descriptor| match descriptor {
                ModelDescriptor::Procedural(shape) => Some(AssetLoader::synthesize(shape)),
                _ => None,
            })
            .collect();

        self.load = LoadPhase::Resolved;
        if parts.is_empty() {
            self.install_fallback();
            return;
        }
        let group = self.combine(parts);
        self.install_loaded(group);
    }

    /// Starts the viewport's one and only asset load.
    ///
    /// Returns `None` when a load was already requested or the mesh is
    /// already installed. Loads for all configured models run concurrently
    /// and resolve together.
    pub fn request_assets(
        &mut self,
        loader: &AssetLoader,
    ) -> Option<BoxFuture<'static, Vec<LoadResult>>> {
        if self.load != LoadPhase::NotRequested {
            return None;
        }
        self.load = LoadPhase::Pending {
            since: Instant::now(),
        };

        log::debug!(
            "viewport {} loading {} model(s)",
            self.config.container,
            self.config.models.len()
        );
        let loads: Vec<_> = self.config.models.iter().map(|m| loader.load(m)).collect();
        Some(futures::future::join_all(loads).boxed())
    }

    /// Applies the outcome of the pending load.
    ///
    /// Successful parts are merged into one group, normalized and installed.
    /// If nothing loaded, the fallback shape is installed instead. Returns
    /// `false` and changes nothing when no load is pending, which is the case
    /// for late results after a timeout.
    pub fn resolve(&mut self, results: Vec<LoadResult>) -> bool {
        if !matches!(self.load, LoadPhase::Pending { .. }) {
            log::debug!(
                "viewport {} ignoring load results; no load pending",
                self.config.container
            );
            return false;
        }
        self.load = LoadPhase::Resolved;

        let mut parts = Vec::with_capacity(results.len());
        for result in results {
            match result {
                LoadResult::Loaded(group) => parts.push(group),
                LoadResult::Failed(err) => self.report_failure(&err),
            }
        }

        if parts.is_empty() {
            self.install_fallback();
            return true;
        }

        let group = self.combine(parts);
        self.install_loaded(group);
        true
    }

    /// Fails a pending load whose timeout has elapsed at `now`.
    ///
    /// Does nothing without a configured timeout. Returns `true` if the
    /// fallback was installed.
    pub fn expire_load(&mut self, now: Instant) -> bool {
        let (LoadPhase::Pending { since }, Some(timeout_ms)) =
            (self.load, self.config.load_timeout_ms)
        else {
            return false;
        };
        if now.saturating_duration_since(since) < Duration::from_millis(timeout_ms) {
            return false;
        }

        let failures = self
            .config
            .models
            .iter()
            .map(|m| LoadResult::Failed(AssetError::TimedOut(m.to_string())))
            .collect();
        self.resolve(failures)
    }

    fn report_failure(&self, err: &AssetError) {
        log::warn!(
            "viewport {}: {} ({:?} failure)",
            self.config.container,
            err,
            err.kind()
        );
    }

    fn combine(&self, mut parts: Vec<MeshGroup>) -> MeshGroup {
        if parts.len() == 1 {
            if let Some(group) = parts.pop() {
                return group;
            }
        }
        MeshGroup::merge(self.config.container.clone(), parts)
    }

    /// Installs a successfully loaded or synthesized group
    fn install_loaded(&mut self, group: MeshGroup) {
        match self.try_install(group) {
            Ok(_) => {
                self.state = ViewportState::AnimatingWithMesh;
                self.container.remove_loading_indicator();
            }
            Err(err) => {
                self.report_upload_failure(&err);
                self.install_fallback();
            }
        }
    }

    fn report_upload_failure(&self, err: &RenderError) {
        log::warn!("viewport {}: {}", self.config.container, err);
    }

    fn install_fallback(&mut self) -> Normalization {
        log::info!(
            "viewport {}: installing fallback shape",
            self.config.container
        );
        let mut group = AssetLoader::fallback();
        let normalization = normalize(&mut group, self.config.target_size);
        if let Err(err) = self.surface.upload_mesh(&group) {
            log::error!(
                "viewport {}: fallback upload failed: {}",
                self.config.container,
                err
            );
        }
        self.place(group);
        self.state = ViewportState::AnimatingWithFallback;
        self.container.set_loading_text(FAILED_TEXT);
        normalization
    }

    /// Normalizes `group` and makes it the sole active mesh, releasing the
    /// previous one.
    ///
    /// A group the surface cannot hold is replaced by the fallback shape.
    pub fn install_mesh(&mut self, group: MeshGroup) -> Normalization {
        match self.try_install(group) {
            Ok(normalization) => normalization,
            Err(err) => {
                self.report_upload_failure(&err);
                self.install_fallback()
            }
        }
    }

    fn try_install(&mut self, mut group: MeshGroup) -> Result<Normalization, RenderError> {
        let normalization = normalize(&mut group, self.config.target_size);
        if let Normalization::Degenerate { .. } = normalization {
            log::debug!(
                "viewport {}: {} has no extent; installed at native scale",
                self.config.container,
                group.name
            );
        }

        self.surface.upload_mesh(&group)?;
        self.place(group);
        Ok(normalization)
    }

    fn place(&mut self, group: MeshGroup) {
        if let Some(previous) = self.scene.install(group) {
            log::debug!("released {}", previous.name);
        }

        let stats = self.scene.statistics();
        log::info!(
            "viewport {}: installed {} meshes, {} vertices, {} triangles",
            self.config.container,
            stats.mesh_count,
            stats.total_vertices,
            stats.total_triangles
        );
    }

    /// Advances the active mesh's rotation and renders one frame.
    ///
    /// Renders even without a mesh so the background stays alive. Surface
    /// errors are logged and never escalated.
    pub fn tick(&mut self) {
        if let Some(group) = self.scene.active_mut() {
            let speed = self.config.rotation_speed;
            group
                .transform
                .rotate_by(Vector3::new(speed.x, speed.y, speed.z));
        }
        self.scene.update();

        match self.surface.render(&self.scene) {
            Ok(()) => self.frames_rendered += 1,
            Err(RenderError::SurfaceLost) => {
                log::debug!("viewport {}: surface reconfigured", self.config.container)
            }
            Err(err) => log::warn!("viewport {}: {}", self.config.container, err),
        }
    }

    /// Re-measures the container and updates camera aspect and surface size.
    ///
    /// Returns `false` when the layout did not change.
    pub fn on_resize(&mut self) -> bool {
        let layout = ViewportLayout::measure(&self.container, &self.config);
        if layout == self.layout {
            return false;
        }

        self.layout = layout;
        self.scene
            .camera
            .resize_projection(layout.width, layout.height);
        self.surface.resize(layout.surface_size());
        log::debug!(
            "viewport {} resized to {}x{}",
            self.config.container,
            layout.width,
            layout.height
        );
        true
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn is_load_pending(&self) -> bool {
        matches!(self.load, LoadPhase::Pending { .. })
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn layout(&self) -> ViewportLayout {
        self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn active_mesh(&self) -> Option<&MeshGroup> {
        self.scene.active()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}
