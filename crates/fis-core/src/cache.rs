//! Time-bounded response cache.
//!
//! One process-wide instance memoizes response snapshots keyed by request
//! path. Entries expire after their TTL and are evicted lazily on the next
//! lookup of their key; there is no background sweep and no single-flight
//! protection - concurrent misses on one key may each compute
//! independently, and the last writer wins.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-wide response cache keyed by request path.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or await `compute`, store its
    /// result for `ttl`, and return it.
    ///
    /// # Errors
    ///
    /// Propagates the error from `compute`; errors are never cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.lookup_at(key, Instant::now()) {
            tracing::trace!(key, "cache hit");
            return Ok(value);
        }
        let value = compute().await?;
        self.insert_at(key, value.clone(), ttl, Instant::now());
        Ok(value)
    }

    /// Fresh-entry lookup at an explicit instant. An expired entry is
    /// removed here, on the next access of its key.
    fn lookup_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert_at(&self, key: &str, value: Value, ttl: Duration, now: Instant) {
        let entry = CacheEntry {
            value,
            expires_at: now + ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    // Entries are complete snapshots, so a poisoned lock holds nothing
    // worth discarding.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
