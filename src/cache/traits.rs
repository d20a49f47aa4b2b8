//! Response cache trait.
//!
//! The operations shared by the plain in-memory store and the durable-backed
//! store, so callers and the registry can hold either behind one type.

use crate::cache::{CacheAlert, CacheLog, CacheMetrics, CacheParams, CacheStats, CacheStore};
use crate::error::Result;

pub trait ResponseCache<T>: Send + Sync {
    fn name(&self) -> &str;

    /// Lookup reporting the caller's last observed latency for `params`.
    fn get_observed(&mut self, params: &CacheParams, latency_ms: Option<u64>) -> Result<Option<T>>;

    fn get(&mut self, params: &CacheParams) -> Result<Option<T>> {
        self.get_observed(params, None)
    }

    fn observe_latency(&mut self, params: &CacheParams, latency_ms: u64) -> Result<()>;

    /// Returns false when the value was dropped by an inert cache.
    fn set(&mut self, params: &CacheParams, value: T) -> Result<bool>;

    fn delete(&mut self, params: &CacheParams) -> Result<bool>;

    fn refresh(&mut self, params: &CacheParams) -> Result<bool>;

    fn clear(&mut self);

    /// Runs the expiration sweep now. Returns the number of entries removed.
    fn force_cleanup(&mut self) -> usize;

    /// Purges aged log records and alerts.
    fn decay(&mut self) -> usize;

    fn stats(&self) -> CacheStats;

    fn metrics(&mut self) -> CacheMetrics;

    fn logs(&self, limit: usize) -> Vec<CacheLog>;

    fn alerts(&self) -> Vec<CacheAlert>;

    fn force_activate(&mut self) -> bool;

    fn force_deactivate(&mut self) -> bool;

    fn is_persistent(&self) -> bool {
        false
    }

    /// Rebuilds the in-memory entries from durable storage.
    ///
    /// Returns false for caches without durable storage.
    fn reload_from_storage(&mut self) -> bool {
        false
    }
}

impl<T> ResponseCache<T> for CacheStore<T>
where
    T: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        CacheStore::name(self)
    }

    fn get_observed(&mut self, params: &CacheParams, latency_ms: Option<u64>) -> Result<Option<T>> {
        CacheStore::get_observed(self, params, latency_ms)
    }

    fn observe_latency(&mut self, params: &CacheParams, latency_ms: u64) -> Result<()> {
        CacheStore::observe_latency(self, params, latency_ms)
    }

    fn set(&mut self, params: &CacheParams, value: T) -> Result<bool> {
        CacheStore::set(self, params, value)
    }

    fn delete(&mut self, params: &CacheParams) -> Result<bool> {
        CacheStore::delete(self, params)
    }

    fn refresh(&mut self, params: &CacheParams) -> Result<bool> {
        CacheStore::refresh(self, params)
    }

    fn clear(&mut self) {
        CacheStore::clear(self)
    }

    fn force_cleanup(&mut self) -> usize {
        self.cleanup_expired()
    }

    fn decay(&mut self) -> usize {
        CacheStore::decay(self)
    }

    fn stats(&self) -> CacheStats {
        CacheStore::stats(self)
    }

    fn metrics(&mut self) -> CacheMetrics {
        CacheStore::metrics(self)
    }

    fn logs(&self, limit: usize) -> Vec<CacheLog> {
        CacheStore::logs(self, limit)
    }

    fn alerts(&self) -> Vec<CacheAlert> {
        CacheStore::alerts(self)
    }

    fn force_activate(&mut self) -> bool {
        CacheStore::force_activate(self)
    }

    fn force_deactivate(&mut self) -> bool {
        CacheStore::force_deactivate(self)
    }
}
