//! Source fetching: the seam to whatever holds original image bytes.
//!
//! A fetcher resolves an image id to bytes, or to nothing. Absence is a
//! normal outcome (`Ok(None)`) — the orchestrator turns a missing primary
//! source into a null-image result and a missing overlay into a skipped
//! composite. Errors are reserved for infrastructure failures (I/O other
//! than not-found, an unreachable upstream) and propagate to the caller.
//!
//! Retry, timeout, and any fetch-side caching live inside fetcher
//! implementations; the orchestrator issues one call and takes the answer.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// Which backing store an id refers to.
///
/// The tag participates in cache keys, so the same logical id fetched
/// through different adapters never collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    /// Assets owned by the application's backing store.
    Storage,
    /// Assets pulled from an external origin.
    External,
}

impl SourceOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceOrigin::Storage => "storage",
            SourceOrigin::External => "external",
        }
    }
}

/// Async `fetch(id, origin) -> bytes | absent`.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, id: &str, origin: SourceOrigin) -> Result<Option<Bytes>, FetchError>;
}

/// Fetcher that resolves ids as paths under a root directory.
///
/// Serves both origins identically; it is the adapter for deployments where
/// the backing store is a local filesystem.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceFetcher for FsFetcher {
    async fn fetch(&self, id: &str, _origin: SourceOrigin) -> Result<Option<Bytes>, FetchError> {
        let path = self.root.join(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}
