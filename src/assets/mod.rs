//! Model acquisition: fetching bytes, parsing OBJ and FBX payloads, and
//! synthesizing procedural shapes.
//!
//! Every load resolves to a [`LoadResult`]; failures are values, never panics,
//! so a viewport can always fall back to a procedural shape.

pub mod fbx;
pub mod loader;
pub mod obj;
pub mod source;

use std::future::Future;

use futures::channel::oneshot;
use thiserror::Error;

use crate::gfx::scene::MeshGroup;

pub use loader::{AssetFormat, AssetLoader};
pub use source::{AssetSource, FileSource, HttpSource, MemorySource};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to fetch {location}")]
    Fetch {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {location}: {message}")]
    Parse { location: String, message: String },

    #[error("unsupported asset: {0}")]
    Unsupported(String),

    #[error("{0} contains no geometry")]
    EmptyGeometry(String),

    #[error("loading {0} timed out")]
    TimedOut(String),

    #[error("loader worker for {0} stopped before finishing")]
    Cancelled(String),
}

/// Coarse failure class, for logging and the loading indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    Parse,
    Timeout,
}

impl AssetError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AssetError::NotFound(_)
            | AssetError::Fetch { .. }
            | AssetError::Unsupported(_)
            | AssetError::Cancelled(_) => FailureKind::Fetch,
            AssetError::Parse { .. } | AssetError::EmptyGeometry(_) => FailureKind::Parse,
            AssetError::TimedOut(_) => FailureKind::Timeout,
        }
    }
}

/// Outcome of one asset load
#[derive(Debug)]
pub enum LoadResult {
    Loaded(MeshGroup),
    Failed(AssetError),
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResult::Loaded(_))
    }

    pub fn into_result(self) -> Result<MeshGroup, AssetError> {
        match self {
            LoadResult::Loaded(group) => Ok(group),
            LoadResult::Failed(err) => Err(err),
        }
    }
}

impl From<Result<MeshGroup, AssetError>> for LoadResult {
    fn from(result: Result<MeshGroup, AssetError>) -> Self {
        match result {
            Ok(group) => LoadResult::Loaded(group),
            Err(err) => LoadResult::Failed(err),
        }
    }
}

/// Runs `job` on a dedicated worker thread and resolves with its output.
///
/// Resolves to `None` if the worker could not be started or died before
/// finishing.
pub(crate) fn offload<T, F>(job: F) -> impl Future<Output = Option<T>> + Send + 'static
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (sender, receiver) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("asset-worker".to_string())
        .spawn(move || {
            // Receiver gone means nobody cares about the result anymore
            let _ = sender.send(job());
        });
    if let Err(err) = spawned {
        log::error!("failed to start asset worker: {err}");
    }

    async move { receiver.await.ok() }
}
