//! Result cache: the seam to the key-value store plus a bounded in-memory
//! implementation.
//!
//! The orchestrator only ever issues `get` and `set` — eviction, TTLs, and
//! persistence belong to the backend. Keys are the strings produced by
//! [`cache_key`](crate::fingerprint::cache_key); values are complete
//! [`TransformResult`]s, so a hit bypasses fetching and processing entirely.
//!
//! Concurrent misses for the same key are not deduplicated: both callers
//! recompute and the second `set` wins. Writes are idempotent (same key,
//! same value), so the race is harmless.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;

use crate::options::TransformResult;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Async get/set keyed by string.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<TransformResult>, CacheError>;

    async fn set(&self, key: &str, value: TransformResult) -> Result<(), CacheError>;
}

/// Default number of results a [`MemoryCache`] retains.
const DEFAULT_CAPACITY: usize = 1024;

/// Bounded in-process result cache with LRU eviction.
///
/// Image payloads are [`bytes::Bytes`], so a hit clones a reference count,
/// not the pixel data.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, TransformResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Snapshot of lookup counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<TransformResult>, CacheError> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(value.clone()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: TransformResult) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.put(key.to_owned(), value);
        Ok(())
    }
}

/// Summary of cache performance since construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} computed ({} lookups)",
                self.hits,
                self.misses,
                self.lookups()
            )
        } else {
            write!(f, "{} computed", self.misses)
        }
    }
}
