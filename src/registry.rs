//! Cache Registry
//!
//! The application-level context that owns every named cache instance.
//! Handlers, timers and fetch wrappers reach caches through a registry handle
//! instead of process-wide globals.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheParams, CacheStore, PersistentCache, ResponseCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::storage::{DurableStorage, FileStorage, MemoryStorage};

// == Well-known caches ==
pub const DASHBOARD_METRICS: &str = "dashboard_metrics";
pub const SYSTEM_STATUS: &str = "system_status";
pub const TECHNICIAN_RANKING: &str = "technician_ranking";

/// Prefix of every durable storage key written by the registry's caches.
pub const STORAGE_KEY_PREFIX: &str = "dash_cache:";

/// System status changes quickly, so it keeps entries for 30 seconds.
const SYSTEM_STATUS_TTL_MS: u64 = 30 * 1000;
const TECHNICIAN_RANKING_MAX_SIZE: usize = 50;

pub type DynCache = Box<dyn ResponseCache<Value>>;
pub type SharedCache = Arc<RwLock<DynCache>>;

/// Named, independently owned caches. Clones share the same instances.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<BTreeMap<String, SharedCache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the dashboard's caches from server configuration.
    ///
    /// Persistent caches write under `config.storage_dir` when `persist` is
    /// set, and to process memory otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.persist {
            let storage = FileStorage::open(&config.storage_dir)?;
            info!("persisting caches to {}", storage.dir().display());
            Ok(Self::with_storage(config, storage))
        } else {
            info!("cache persistence disabled, using process memory");
            Ok(Self::with_storage(config, MemoryStorage::new()))
        }
    }

    /// Builds the dashboard's caches with persistent ones backed by `storage`.
    pub fn with_storage<S>(config: &Config, storage: S) -> Self
    where
        S: DurableStorage + Clone + 'static,
    {
        let base = config.cache_config();

        let metrics = PersistentCache::<Value, S>::new(
            DASHBOARD_METRICS,
            base.clone(),
            storage.clone(),
            storage_key(DASHBOARD_METRICS),
        );
        let status = CacheStore::<Value>::new(
            SYSTEM_STATUS,
            base.clone()
                .with_ttl_ms(SYSTEM_STATUS_TTL_MS)
                .with_auto_activate(
                    crate::config::DEFAULT_PERFORMANCE_THRESHOLD_MS,
                    crate::config::DEFAULT_USAGE_THRESHOLD,
                ),
        );
        let ranking = PersistentCache::<Value, S>::new(
            TECHNICIAN_RANKING,
            base.with_max_size(TECHNICIAN_RANKING_MAX_SIZE),
            storage,
            storage_key(TECHNICIAN_RANKING),
        );

        Self::new().with_cache(metrics).with_cache(status).with_cache(ranking)
    }

    /// Adds `cache` under its own name, replacing any cache of that name.
    pub fn with_cache(mut self, cache: impl ResponseCache<Value> + 'static) -> Self {
        let name = cache.name().to_string();
        let boxed: DynCache = Box::new(cache);
        Arc::make_mut(&mut self.caches).insert(name, Arc::new(RwLock::new(boxed)));
        self
    }

    pub fn get(&self, name: &str) -> Option<SharedCache> {
        self.caches.get(name).cloned()
    }

    /// Like `get`, but an unknown name is a `NotFound` error.
    pub fn require(&self, name: &str) -> Result<SharedCache> {
        self.get(name)
            .ok_or_else(|| CacheError::NotFound(format!("Cache '{}' not found", name)))
    }

    pub fn names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    // == Fetch Wrapper ==
    /// Returns the cached value for `params`, or runs `fetch` and caches its
    /// result.
    ///
    /// The fetch's round-trip time is reported to the cache's activation
    /// heuristic. No lock is held while the fetch runs, so concurrent misses
    /// for the same params may each fetch. A failed fetch is returned as is
    /// and nothing is stored.
    pub async fn get_or_fetch<F, Fut>(&self, name: &str, params: &CacheParams, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let cache = self.require(name)?;

        if let Some(value) = cache.write().await.get(params)? {
            return Ok(value);
        }

        let started = Instant::now();
        let value = fetch().await?;
        let latency_ms = started.elapsed().as_millis() as u64;
        debug!(cache = %name, latency_ms, "fetched on miss");

        let mut guard = cache.write().await;
        guard.observe_latency(params, latency_ms)?;
        guard.set(params, value.clone())?;
        Ok(value)
    }

    // == Maintenance ==
    /// Runs the expiration sweep on every cache. Returns the total removed.
    pub async fn sweep_all(&self) -> usize {
        let mut removed = 0;
        for (name, cache) in self.caches.iter() {
            let count = cache.write().await.force_cleanup();
            if count > 0 {
                debug!(cache = %name, removed = count, "expired entries swept");
            }
            removed += count;
        }
        removed
    }

    /// Purges aged log records and alerts on every cache.
    pub async fn decay_all(&self) -> usize {
        let mut removed = 0;
        for cache in self.caches.values() {
            removed += cache.write().await.decay();
        }
        removed
    }

    /// Reloads every persistent cache from durable storage.
    pub async fn reload_all(&self) -> usize {
        let mut reloaded = 0;
        for (name, cache) in self.caches.iter() {
            if cache.write().await.reload_from_storage() {
                reloaded += 1;
            } else {
                warn!(cache = %name, "reload skipped: cache is not persistent");
            }
        }
        reloaded
    }
}

fn storage_key(name: &str) -> String {
    format!("{}{}", STORAGE_KEY_PREFIX, name)
}
