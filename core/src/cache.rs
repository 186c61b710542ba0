//! In-memory response cache for GET requests.
//!
//! # Design
//! `CachingClient` sits between the pipeline and a real client. Only GET
//! requests are looked up or stored, keyed by the rendered URL. Only 2xx
//! responses are stored. Storage is a `moka` cache bounded by entry count,
//! optionally with a time-to-live; moka's policy picks what to evict.
//! Callers invalidate entries explicitly after writes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;

use crate::client::HttpClient;
use crate::error::Result;
use crate::http::{Method, RawRequest, RawResponse};
use crate::structured_url::StructuredUrl;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub capacity: u64,
    /// Entries older than this are dropped. `None` keeps them until evicted.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            ttl: None,
        }
    }
}

/// Hit and miss counters plus the settled entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

/// Wraps a client and serves repeated GETs from memory.
pub struct CachingClient<C> {
    inner: C,
    responses: Cache<String, RawResponse>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<C: HttpClient> CachingClient<C> {
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: C, config: CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.capacity);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner,
            responses: builder.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of cached responses once pending evictions have run.
    pub fn len(&self) -> u64 {
        self.responses.run_pending_tasks();
        self.responses.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop the cached response for `url`, if any.
    pub fn invalidate(&self, url: &StructuredUrl) -> Result<()> {
        let key = url.render()?;
        self.responses.invalidate(&key);
        tracing::debug!(url = %key, "invalidated cached response");
        Ok(())
    }

    pub fn clear(&self) {
        self.responses.invalidate_all();
        self.responses.run_pending_tasks();
    }
}

impl<C> fmt::Debug for CachingClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingClient")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .field("entries", &self.responses.entry_count())
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> HttpClient for CachingClient<C> {
    fn execute(&self, request: &RawRequest) -> Result<RawResponse> {
        if request.method != Method::Get {
            return self.inner.execute(request);
        }

        let key = request.url.render()?;
        if let Some(hit) = self.responses.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(url = %key, "cache hit");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(url = %key, "cache miss");
        let response = self.inner.execute(request)?;
        if response.status.is_success() {
            self.responses.insert(key, response.clone());
        }
        Ok(response)
    }

    fn upload(&self, request: &RawRequest) -> Result<RawResponse> {
        self.inner.upload(request)
    }

    fn download(&self, request: &RawRequest) -> Result<RawResponse> {
        self.inner.download(request)
    }
}
