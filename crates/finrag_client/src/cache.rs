//! Query cache keyed by resource name.
//!
//! Holds the last successful fetch per resource. Mutations call
//! [`QueryCache::invalidate`]; the next read re-fetches while the stale value
//! stays visible. A failed fetch keeps the previous value and records the error.
//!
//! Fetches are numbered as they start. A result is applied only when it is
//! newer than the last applied one, so overlapping fetches that finish out of
//! order never roll the entry back. A fetch future dropped before completion
//! still releases its in-flight mark.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::client::ApiError;
use crate::messages::{Document, MetricsSnapshot};

/// Logical resources the client caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Documents,
    Metrics,
}

impl ResourceKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKey::Documents => "documents",
            ResourceKey::Metrics => "metrics",
        }
    }
}

/// A value that lives under a fixed cache key.
pub trait Resource: Send + Sync + 'static {
    const KEY: ResourceKey;
}

impl Resource for Vec<Document> {
    const KEY: ResourceKey = ResourceKey::Documents;
}

impl Resource for MetricsSnapshot {
    const KEY: ResourceKey = ResourceKey::Metrics;
}

#[derive(Default)]
struct Entry {
    data: Option<Arc<dyn Any + Send + Sync>>,
    fetched_at: Option<Instant>,
    stale: bool,
    in_flight: usize,
    started: u64,
    applied: u64,
    error: Option<String>,
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub data: Option<Arc<T>>,
    pub fetched_at: Option<Instant>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl<T> QuerySnapshot<T> {
    /// Nothing has been fetched yet and no failure is recorded.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

/// Shared cache store. Pass it around as `Arc<QueryCache>`.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<ResourceKey, Entry>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<_> = self.lock().keys().copied().collect();
        f.debug_struct("QueryCache").field("keys", &keys).finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKey, Entry>> {
        // A panic mid-update leaves only flags behind; the map itself stays usable.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn snapshot<T: Resource>(&self) -> QuerySnapshot<T> {
        let entries = self.lock();
        match entries.get(&T::KEY) {
            Some(e) => QuerySnapshot {
                data: e.data.clone().and_then(|d| d.downcast::<T>().ok()),
                fetched_at: e.fetched_at,
                is_stale: e.stale,
                is_fetching: e.in_flight > 0,
                error: e.error.clone(),
            },
            None => QuerySnapshot {
                data: None,
                fetched_at: None,
                is_stale: false,
                is_fetching: false,
                error: None,
            },
        }
    }

    /// Cached value, fresh or stale.
    pub fn get<T: Resource>(&self) -> Option<Arc<T>> {
        self.snapshot::<T>().data
    }

    /// True when a read of `key` must hit the backend.
    pub fn needs_fetch(&self, key: ResourceKey) -> bool {
        match self.lock().get(&key) {
            Some(e) => e.data.is_none() || e.stale,
            None => true,
        }
    }

    /// Mark `key` stale so the next read re-fetches. The old value stays readable.
    pub fn invalidate(&self, key: ResourceKey) {
        let mut entries = self.lock();
        entries.entry(key).or_default().stale = true;
        tracing::info!(resource = key.as_str(), "cache entry invalidated");
    }

    /// Replace the entry with a fresh value.
    pub fn store<T: Resource>(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.lock();
        let entry = entries.entry(T::KEY).or_default();
        entry.data = Some(value.clone() as Arc<dyn Any + Send + Sync>);
        entry.fetched_at = Some(Instant::now());
        entry.stale = false;
        entry.error = None;
        entry.applied = entry.started;
        value
    }

    fn begin_fetch(&self, key: ResourceKey) -> InFlight<'_> {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.in_flight += 1;
        entry.started += 1;
        InFlight {
            cache: self,
            key,
            generation: entry.started,
        }
    }

    fn fetch_succeeded<T: Resource>(&self, generation: u64, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.lock();
        let entry = entries.entry(T::KEY).or_default();
        if generation > entry.applied {
            entry.data = Some(value.clone() as Arc<dyn Any + Send + Sync>);
            entry.fetched_at = Some(Instant::now());
            entry.stale = false;
            entry.error = None;
            entry.applied = generation;
        } else {
            tracing::debug!(resource = T::KEY.as_str(), generation, "discarding superseded fetch");
        }
        value
    }

    fn fetch_failed(&self, key: ResourceKey, generation: u64, error: &ApiError) {
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        if generation > entry.applied {
            entry.error = Some(error.to_string());
            entry.applied = generation;
        }
    }

    /// Run `fetch` unconditionally and store its result unless a newer fetch
    /// already landed. The caller always gets its own result back.
    pub async fn refetch<T, F, Fut>(&self, fetch: F) -> Result<Arc<T>, ApiError>
    where
        T: Resource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let in_flight = self.begin_fetch(T::KEY);
        let result = fetch().await;
        let generation = in_flight.generation;
        drop(in_flight);
        match result {
            Ok(value) => Ok(self.fetch_succeeded(generation, value)),
            Err(e) => {
                self.fetch_failed(T::KEY, generation, &e);
                Err(e)
            }
        }
    }

    /// Return the cached value if fresh, otherwise fetch and store.
    pub async fn get_or_fetch<T, F, Fut>(&self, fetch: F) -> Result<Arc<T>, ApiError>
    where
        T: Resource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if !self.needs_fetch(T::KEY) {
            if let Some(value) = self.get::<T>() {
                return Ok(value);
            }
        }
        self.refetch(fetch).await
    }
}

/// Marks one fetch as in flight until dropped, completed or not.
struct InFlight<'a> {
    cache: &'a QueryCache,
    key: ResourceKey,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut entries = self.cache.lock();
        let entry = entries.entry(self.key).or_default();
        entry.in_flight = entry.in_flight.saturating_sub(1);
    }
}
