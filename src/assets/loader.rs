use std::sync::Arc;

use futures::{future, future::BoxFuture, FutureExt};

use crate::{
    config::{ModelDescriptor, ProceduralShape},
    gfx::{geometry, scene::MeshGroup},
};

use super::{fbx::parse_fbx, obj::parse_obj, offload, AssetError, AssetSource, FileSource, LoadResult};

/// Payload formats that need fetching and parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Obj,
    Fbx,
}

impl AssetFormat {
    pub fn name(self) -> &'static str {
        match self {
            AssetFormat::Obj => "obj",
            AssetFormat::Fbx => "fbx",
        }
    }

    pub fn parse(self, bytes: &[u8], location: &str) -> Result<MeshGroup, AssetError> {
        match self {
            AssetFormat::Obj => parse_obj(bytes, location),
            AssetFormat::Fbx => parse_fbx(bytes, location),
        }
    }
}

/// Turns model descriptors into mesh groups or definitive failures.
///
/// Cloning is cheap; clones share the same source.
#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
}

impl AssetLoader {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Loader reading files under `root`
    pub fn from_dir(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FileSource::new(root))
    }

    /// Loads one descriptor.
    ///
    /// Loaded formats are fetched from the source and parsed off the calling
    /// thread. Procedural shapes resolve immediately. The returned future never
    /// panics on bad input; every failure path resolves to
    /// [`LoadResult::Failed`].
    pub fn load(&self, descriptor: &ModelDescriptor) -> BoxFuture<'static, LoadResult> {
        let (location, format) = match descriptor {
            ModelDescriptor::Procedural(shape) => {
                return future::ready(LoadResult::Loaded(Self::synthesize(shape))).boxed();
            }
            ModelDescriptor::Obj { path } => (path.clone(), AssetFormat::Obj),
            ModelDescriptor::Fbx { path } => (path.clone(), AssetFormat::Fbx),
        };

        let source = Arc::clone(&self.source);
        fetch_and_parse(source, location, format)
            .map(LoadResult::from)
            .boxed()
    }

    /// Builds a procedural shape. Cannot fail and performs no I/O.
    ///
    /// Shapes with out-of-range parameters are replaced by the fallback solid.
    pub fn synthesize(shape: &ProceduralShape) -> MeshGroup {
        let shape = match shape.validate() {
            Ok(()) => shape,
            Err(err) => {
                log::warn!("{err}; using the fallback shape");
                &ProceduralShape::FALLBACK
            }
        };
        let name = shape.name();
        MeshGroup::new(name, vec![geometry::generate(shape).into_mesh(name)])
    }

    /// The solid substituted for failed loads
    pub fn fallback() -> MeshGroup {
        Self::synthesize(&ProceduralShape::FALLBACK)
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader").finish_non_exhaustive()
    }
}

async fn fetch_and_parse(
    source: Arc<dyn AssetSource>,
    location: String,
    format: AssetFormat,
) -> Result<MeshGroup, AssetError> {
    let bytes = source.fetch(&location).await?;
    log::debug!(
        "fetched {} ({} bytes, {})",
        location,
        bytes.len(),
        format.name()
    );

    let parse_location = location.clone();
    offload(move || format.parse(&bytes, &parse_location))
        .await
        .unwrap_or(Err(AssetError::Cancelled(location)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{FailureKind, MemorySource};
    use futures::executor::block_on;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn loader() -> AssetLoader {
        AssetLoader::new(
            MemorySource::new()
                .with("tri.obj", TRIANGLE)
                .with("broken.fbx", "not an fbx at all"),
        )
    }

    #[test]
    fn test_load_obj() {
        let result = block_on(loader().load(&ModelDescriptor::obj("tri.obj")));
        let group = result.into_result().unwrap();
        assert_eq!(group.triangle_count(), 1);
    }

    #[test]
    fn test_missing_asset_fails() {
        let result = block_on(loader().load(&ModelDescriptor::obj("missing.obj")));
        match result {
            LoadResult::Failed(err) => assert_eq!(err.kind(), FailureKind::Fetch),
            LoadResult::Loaded(_) => panic!("missing asset loaded"),
        }
    }

    #[test]
    fn test_malformed_payload_fails() {
        let result = block_on(loader().load(&ModelDescriptor::fbx("broken.fbx")));
        match result {
            LoadResult::Failed(err) => assert_eq!(err.kind(), FailureKind::Parse),
            LoadResult::Loaded(_) => panic!("malformed asset loaded"),
        }
    }

    #[test]
    fn test_procedural_resolves_without_source() {
        let empty = AssetLoader::new(MemorySource::new());
        let mut pending = empty.load(&ModelDescriptor::Procedural(ProceduralShape::Cube { size: 2.0 }));
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        match pending.poll_unpin(&mut cx) {
            std::task::Poll::Ready(LoadResult::Loaded(group)) => {
                assert_eq!(group.name, "cube");
                assert_eq!(group.triangle_count(), 12);
            }
            _ => panic!("procedural load did not resolve on first poll"),
        }
    }

    #[test]
    fn test_out_of_range_shape_synthesizes_fallback() {
        let runaway = ProceduralShape::Icosahedron {
            radius: 1.0,
            detail: u32::MAX,
        };
        assert_eq!(AssetLoader::synthesize(&runaway), AssetLoader::fallback());

        let nan = ProceduralShape::Cube { size: f32::NAN };
        assert_eq!(AssetLoader::synthesize(&nan).name, ProceduralShape::FALLBACK.name());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        assert_eq!(AssetLoader::fallback(), AssetLoader::fallback());
        assert_eq!(AssetLoader::fallback().triangle_count(), 180);
    }
}
