//! Native host: one transparent window per configured viewport.
//!
//! Windows play the part of page containers. Each window's title doubles as
//! its loading indicator. Asset loads run on a single-threaded
//! [`LocalPool`] that is advanced between frames, so load completions resume
//! on the event-loop thread like everything else.

use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::Arc, time::Instant};

use anyhow::Context;
use futures::{
    executor::{LocalPool, LocalSpawner},
    task::LocalSpawnExt,
};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    assets::{AssetLoader, LoadResult},
    config::{ShowcaseConfig, ViewportConfig},
    gfx::rendering::RenderEngine,
    viewport::{Container, DeferredViewport, ViewportController, LOADING_TEXT},
};

/// A window standing in for a page container
pub struct WindowContainer {
    id: String,
    window: Arc<Window>,
    indicator: Option<String>,
}

impl WindowContainer {
    fn new(id: String, window: Arc<Window>) -> Self {
        let mut container = Self {
            id,
            window,
            indicator: None,
        };
        container.show_indicator(LOADING_TEXT);
        container
    }

    fn show_indicator(&mut self, text: &str) {
        self.window.set_title(&format!("{} - {}", self.id, text));
        self.indicator = Some(text.to_string());
    }

    fn logical_size(&self) -> LogicalSize<u32> {
        self.window
            .inner_size()
            .to_logical(self.window.scale_factor())
    }
}

impl Container for WindowContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn client_width(&self) -> u32 {
        self.logical_size().width
    }

    fn client_height(&self) -> u32 {
        self.logical_size().height
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn remove_loading_indicator(&mut self) {
        if self.indicator.take().is_some() {
            self.window.set_title(&self.id);
        }
    }

    fn set_loading_text(&mut self, text: &str) {
        if self.indicator.is_some() {
            self.show_indicator(text);
        }
    }
}

type WindowViewport = ViewportController<RenderEngine, WindowContainer>;

enum Slot {
    /// Window exists but has not been laid out yet
    Waiting(DeferredViewport<WindowContainer>),
    Live(Box<WindowViewport>),
}

type Completions = Rc<RefCell<Vec<(WindowId, Vec<LoadResult>)>>>;

pub struct ShowcaseApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    configs: Vec<ViewportConfig>,
    loader: AssetLoader,
    windows: HashMap<WindowId, Arc<Window>>,
    slots: HashMap<WindowId, Slot>,
    pool: LocalPool,
    spawner: LocalSpawner,
    completions: Completions,
    fatal: Option<anyhow::Error>,
}

impl ShowcaseApp {
    /// Creates the application for `config`, loading assets from its asset root
    pub fn new(config: ShowcaseConfig) -> anyhow::Result<Self> {
        let loader = AssetLoader::from_dir(&config.asset_root);
        Self::with_loader(config, loader)
    }

    /// Creates the application with a custom asset loader
    pub fn with_loader(config: ShowcaseConfig, loader: AssetLoader) -> anyhow::Result<Self> {
        config.validate()?;
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let pool = LocalPool::new();
        let spawner = pool.spawner();

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                configs: config.viewports,
                loader,
                windows: HashMap::new(),
                slots: HashMap::new(),
                pool,
                spawner,
                completions: Rc::new(RefCell::new(Vec::new())),
                fatal: None,
            },
        })
    }

    /// Runs the event loop until every window is closed or Escape is pressed
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn open_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: ViewportConfig,
    ) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(config.container.as_str())
            .with_inner_size(LogicalSize::new(
                config.fallback_width,
                config.fallback_height.max(config.min_height),
            ))
            .with_transparent(true);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .with_context(|| format!("failed to open window for {}", config.container))?,
        );

        let id = window.id();
        let container = WindowContainer::new(config.container.clone(), window.clone());
        self.windows.insert(id, window);
        self.slots
            .insert(id, Slot::Waiting(DeferredViewport::new(config, container)));
        Ok(())
    }

    /// Constructs the viewport in `id` once its window has a size
    fn try_construct(&mut self, id: WindowId) -> anyhow::Result<()> {
        let Some(Slot::Waiting(deferred)) = self.slots.get(&id) else {
            return Ok(());
        };
        let Some(layout) = deferred.ready_layout() else {
            return Ok(());
        };

        let window = deferred.container().window.clone();
        let engine = pollster::block_on(RenderEngine::new(window, layout.surface_size()))
            .with_context(|| {
                format!("failed to set up rendering for {}", deferred.config().container)
            })?;

        let Some(Slot::Waiting(deferred)) = self.slots.remove(&id) else {
            return Ok(());
        };
        let mut viewport: WindowViewport = deferred.construct(engine);
        if let Some(pending) = viewport.request_assets(&self.loader) {
            let completions = Rc::clone(&self.completions);
            self.spawner
                .spawn_local(async move {
                    let results = pending.await;
                    completions.borrow_mut().push((id, results));
                })
                .context("failed to schedule asset load")?;
        }

        self.slots.insert(id, Slot::Live(Box::new(viewport)));
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn close(&mut self, event_loop: &ActiveEventLoop, id: WindowId) {
        self.slots.remove(&id);
        self.windows.remove(&id);
        if self.windows.is_empty() {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }

        for config in std::mem::take(&mut self.configs) {
            if let Err(err) = self.open_window(event_loop, config) {
                self.fail(event_loop, err);
                return;
            }
        }

        let ids: Vec<WindowId> = self.slots.keys().copied().collect();
        for id in ids {
            if let Err(err) = self.try_construct(id) {
                self.fail(event_loop, err);
                return;
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::CloseRequested => self.close(event_loop, id),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(Slot::Live(viewport)) = self.slots.get_mut(&id) {
                    viewport.on_resize();
                } else if let Err(err) = self.try_construct(id) {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(Slot::Live(viewport)) = self.slots.get_mut(&id) {
                    viewport.tick();
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.pool.run_until_stalled();

        let finished: Vec<_> = self.completions.borrow_mut().drain(..).collect();
        for (id, results) in finished {
            if let Some(Slot::Live(viewport)) = self.slots.get_mut(&id) {
                viewport.resolve(results);
            }
        }

        let now = Instant::now();
        for slot in self.slots.values_mut() {
            if let Slot::Live(viewport) = slot {
                viewport.expire_load(now);
            }
        }

        // Containers that were not laid out yet are re-checked every frame
        let waiting: Vec<WindowId> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Waiting(_)))
            .map(|(id, _)| *id)
            .collect();
        for id in waiting {
            if let Err(err) = self.try_construct(id) {
                self.fail(event_loop, err);
                return;
            }
        }

        for window in self.windows.values() {
            window.request_redraw();
        }
    }
}
