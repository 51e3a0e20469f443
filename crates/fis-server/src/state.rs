//! Shared server state.

use crate::config::Settings;
use anyhow::Result;
use fis_core::{Aggregator, FileStore, ResponseCache, UpstreamClient};
use std::sync::Arc;

/// State shared by all request handlers.
///
/// Cheap to clone; the cache and the collaborators live behind one `Arc`
/// created at process start and dropped at process stop.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    settings: Settings,
    cache: ResponseCache,
    aggregator: Aggregator,
    store: FileStore,
}

impl AppState {
    /// Build the process-wide state from resolved settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let upstream = UpstreamClient::new(settings.fetch_timeout)?;
        let aggregator = Aggregator::new(upstream, settings.upstream_url.clone());
        let store = FileStore::new(&settings.store_path);
        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                cache: ResponseCache::new(),
                aggregator,
                store,
            }),
        })
    }

    /// Resolved settings.
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// The process-wide response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// The index aggregator.
    pub fn aggregator(&self) -> &Aggregator {
        &self.inner.aggregator
    }

    /// The branch/version store.
    pub fn store(&self) -> &FileStore {
        &self.inner.store
    }
}
