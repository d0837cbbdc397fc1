//! Where asset bytes come from.

use std::{collections::HashMap, io, path::PathBuf, time::Duration};

use reqwest::StatusCode;

use futures::{future, future::BoxFuture, FutureExt};

use super::{offload, AssetError};

/// Asynchronous byte fetcher for asset locations
pub trait AssetSource: Send + Sync {
    /// Fetches the whole payload at `location`.
    ///
    /// The returned future owns everything it needs, so it can outlive the
    /// borrow of `self`.
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>>;
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads assets from the local filesystem, relative to a root directory.
///
/// Reads happen on a worker thread so the caller's executor never blocks.
/// `http://` and `https://` locations are handed to an [`HttpSource`].
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    http: HttpSource,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            http: HttpSource::new(),
        }
    }

    pub fn with_http(mut self, http: HttpSource) -> Self {
        self.http = http;
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let relative = location.strip_prefix("file://").unwrap_or(location);
        self.root.join(relative)
    }
}

impl AssetSource for FileSource {
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
        if is_remote(location) {
            return self.http.fetch(location);
        }
        let path = self.resolve(location);
        let location = location.to_string();

        async move {
            log::debug!("reading {}", path.display());
            let read = offload(move || std::fs::read(path)).await;
            match read {
                Some(Ok(bytes)) => Ok(bytes),
                Some(Err(err)) if err.kind() == io::ErrorKind::NotFound => {
                    Err(AssetError::NotFound(location))
                }
                Some(Err(source)) => Err(AssetError::Fetch { location, source }),
                None => Err(AssetError::Cancelled(location)),
            }
        }
        .boxed()
    }
}

/// Fetches assets over HTTP(S).
///
/// Requests use reqwest's blocking client on a worker thread, so no async
/// runtime is needed on the caller's side.
#[derive(Debug, Clone)]
pub struct HttpSource {
    timeout: Duration,
}

impl Default for HttpSource {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get(url: &str, timeout: Duration) -> Result<Vec<u8>, AssetError> {
        let fetch_error = |source: reqwest::Error| AssetError::Fetch {
            location: url.to_string(),
            source: io::Error::other(source),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(fetch_error)?;
        let resp = client.get(url).send().map_err(fetch_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(status_error(url, status));
        }
        let bytes = resp.bytes().map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}

/// Maps a non-success HTTP status to the asset error it stands for
fn status_error(url: &str, status: StatusCode) -> AssetError {
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return AssetError::NotFound(url.to_string());
    }
    AssetError::Fetch {
        location: url.to_string(),
        source: io::Error::other(format!("HTTP error: {status}")),
    }
}

impl AssetSource for HttpSource {
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
        if !is_remote(location) {
            return future::ready(Err(AssetError::Unsupported(format!(
                "not an http(s) location: {location}"
            ))))
            .boxed();
        }
        let url = location.to_string();
        let timeout = self.timeout;

        async move {
            log::debug!("requesting {url}");
            let job_url = url.clone();
            offload(move || Self::get(&job_url, timeout))
                .await
                .unwrap_or(Err(AssetError::Cancelled(url)))
        }
        .boxed()
    }
}

/// In-memory asset table, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(location.into(), bytes.into());
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, location: &str) -> BoxFuture<'static, Result<Vec<u8>, AssetError>> {
        let result = self
            .assets
            .get(location)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(location.to_string()));
        future::ready(result).boxed()
    }
}
